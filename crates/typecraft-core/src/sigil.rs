//! Member name sigils.
//!
//! A declared member name may start with a sigil that encodes its visibility
//! and whether it can be overridden. Two-character sigils are matched before
//! one-character sigils:
//!
//! | Prefix | Visibility  | Virtual |
//! |--------|-------------|---------|
//! | `__`   | private     | no      |
//! | `_$`   | protected   | yes     |
//! | `_`    | protected   | no      |
//! | `$`    | public      | yes     |
//! | (none) | public      | no      |
//!
//! The reserved constructor name [`CTOR`] is always private and never virtual,
//! whatever sigil it carries.
//!
//! # Example
//!
//! ```
//! use typecraft_core::{MemberName, Visibility};
//!
//! let name = MemberName::parse("_$draw");
//! assert_eq!(name.name, "draw");
//! assert_eq!(name.visibility, Visibility::Protected);
//! assert!(name.is_virtual());
//! ```

use crate::{MemberFlags, Visibility};

/// Reserved name of the constructor member.
pub const CTOR: &str = "ctor";

/// Sigil table, longest prefixes first.
const SIGILS: &[(&str, Visibility, bool)] = &[
    ("__", Visibility::Private, false),
    ("_$", Visibility::Protected, true),
    ("_", Visibility::Protected, false),
    ("$", Visibility::Public, true),
];

/// A declared member name split into its bare name and modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberName {
    /// Name with the sigil stripped.
    pub name: String,
    /// Visibility encoded by the sigil.
    pub visibility: Visibility,
    /// Modifier flags encoded by the sigil (only `VIRTUAL` is ever set here).
    pub flags: MemberFlags,
    /// The sigil that was stripped, empty if none.
    pub sigil: &'static str,
}

impl MemberName {
    /// Parse a declared name.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (sigil, visibility, is_virtual) = SIGILS
            .iter()
            .find(|(prefix, _, _)| raw.starts_with(prefix))
            .copied()
            .unwrap_or(("", Visibility::Public, false));

        let name = raw[sigil.len()..].to_string();
        if name == CTOR {
            return Self {
                name,
                visibility: Visibility::Private,
                flags: MemberFlags::empty(),
                sigil,
            };
        }

        let flags = if is_virtual {
            MemberFlags::VIRTUAL
        } else {
            MemberFlags::empty()
        };
        Self {
            name,
            visibility,
            flags,
            sigil,
        }
    }

    /// Parse an accessor key such as `get` or `__set`.
    ///
    /// The visibility defaults to `inherited` (the property's own visibility)
    /// when the key carries no visibility sigil.
    pub fn parse_accessor(raw: &str, inherited: Visibility) -> Self {
        let mut parsed = Self::parse(&raw.to_ascii_lowercase());
        if parsed.sigil.is_empty() || parsed.sigil == "$" {
            parsed.visibility = inherited;
        }
        parsed
    }

    /// Check if the sigil marked the member as overridable.
    #[inline]
    pub fn is_virtual(&self) -> bool {
        self.flags.contains(MemberFlags::VIRTUAL)
    }

    /// Check if this is the reserved constructor name.
    #[inline]
    pub fn is_ctor(&self) -> bool {
        self.name == CTOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name_is_public() {
        let name = MemberName::parse("foo");
        assert_eq!(name.name, "foo");
        assert_eq!(name.visibility, Visibility::Public);
        assert!(!name.is_virtual());
    }

    #[test]
    fn two_char_sigils_win() {
        let private = MemberName::parse("__foo");
        assert_eq!(private.name, "foo");
        assert_eq!(private.visibility, Visibility::Private);

        let protected_virtual = MemberName::parse("_$foo");
        assert_eq!(protected_virtual.name, "foo");
        assert_eq!(protected_virtual.visibility, Visibility::Protected);
        assert!(protected_virtual.is_virtual());
    }

    #[test]
    fn one_char_sigils() {
        let protected = MemberName::parse("_foo");
        assert_eq!(protected.visibility, Visibility::Protected);
        assert!(!protected.is_virtual());

        let public_virtual = MemberName::parse("$foo");
        assert_eq!(public_virtual.visibility, Visibility::Public);
        assert!(public_virtual.is_virtual());
    }

    #[test]
    fn ctor_is_forced_private() {
        let ctor = MemberName::parse("$ctor");
        assert!(ctor.is_ctor());
        assert_eq!(ctor.visibility, Visibility::Private);
        assert!(!ctor.is_virtual());
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert!(MemberName::parse("  ctor ").is_ctor());
    }

    #[test]
    fn accessor_defaults_to_property_visibility() {
        let get = MemberName::parse_accessor("GET", Visibility::Protected);
        assert_eq!(get.name, "get");
        assert_eq!(get.visibility, Visibility::Protected);

        let set = MemberName::parse_accessor("__set", Visibility::Public);
        assert_eq!(set.name, "set");
        assert_eq!(set.visibility, Visibility::Private);
    }
}
