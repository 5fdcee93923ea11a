//! Member classification.

use std::fmt;

/// What a declared member is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// A callable member bound to its declaring scope.
    Method,
    /// A computed or stored value with optional get/set accessors.
    Property,
    /// An ordered handler list with add/remove/raise operations.
    Event,
    /// The reserved `ctor` member.
    Constructor,
}

impl MemberKind {
    /// Check if the member carries a callable body.
    #[inline]
    pub fn is_callable(self) -> bool {
        matches!(self, MemberKind::Method | MemberKind::Constructor)
    }

    /// Check if the member may be marked virtual.
    #[inline]
    pub fn can_be_virtual(self) -> bool {
        matches!(self, MemberKind::Method | MemberKind::Property)
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Method => write!(f, "method"),
            MemberKind::Property => write!(f, "property"),
            MemberKind::Event => write!(f, "event"),
            MemberKind::Constructor => write!(f, "constructor"),
        }
    }
}

/// Which half of a property an accessor implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorKind {
    Get,
    Set,
}

impl fmt::Display for AccessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessorKind::Get => write!(f, "get"),
            AccessorKind::Set => write!(f, "set"),
        }
    }
}
