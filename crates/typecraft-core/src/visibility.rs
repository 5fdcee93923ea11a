//! Visibility modifiers for type members.

use std::fmt;

/// Visibility modifier for type members.
///
/// Ordered from most to least permissive, so `Public < Protected < Private`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    /// Check if the member is reachable from the public interface.
    #[inline]
    pub fn is_public(self) -> bool {
        self == Visibility::Public
    }

    /// Check if the member stays on its declaring level.
    #[inline]
    pub fn is_private(self) -> bool {
        self == Visibility::Private
    }

    /// Check if `self` grants more access than `other`.
    #[inline]
    pub fn is_wider_than(self, other: Visibility) -> bool {
        self < other
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Protected => write!(f, "protected"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_runs_public_to_private() {
        assert!(Visibility::Public < Visibility::Protected);
        assert!(Visibility::Protected < Visibility::Private);
        assert!(Visibility::Public.is_wider_than(Visibility::Private));
        assert!(!Visibility::Private.is_wider_than(Visibility::Protected));
    }

    #[test]
    fn display() {
        assert_eq!(Visibility::Protected.to_string(), "protected");
    }
}
