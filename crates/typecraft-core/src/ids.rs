//! Identifier types for engines and templates.
//!
//! An [`EngineToken`] is the opaque capability that marks a template as
//! belonging to one engine. Tokens are compared by identity: two engines never
//! share a token, so a template from one engine is never mistaken for a
//! template of another.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ENGINE: AtomicU64 = AtomicU64::new(1);

/// Capability token unique to one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineToken(u64);

impl EngineToken {
    /// Mint a token that no other engine holds.
    pub fn mint() -> Self {
        Self(NEXT_ENGINE.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EngineToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine_{}", self.0)
    }
}

/// Identifies a template within its engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(u32);

impl TemplateId {
    /// Create a new template ID with the given index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the underlying index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "template_{}", self.0)
    }
}

impl From<u32> for TemplateId {
    fn from(index: u32) -> Self {
        Self::new(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minted_tokens_are_distinct() {
        let a = EngineToken::mint();
        let b = EngineToken::mint();
        assert_ne!(a, b);
        assert_eq!(a, a);
    }

    #[test]
    fn template_id_display() {
        assert_eq!(TemplateId::new(5).to_string(), "template_5");
        assert_eq!(TemplateId::from(3).index(), 3);
    }
}
