//! Modifier flags attached to member descriptors.

use bitflags::bitflags;

bitflags! {
    /// Modifier flags for a declared member.
    ///
    /// # Usage
    ///
    /// ```rust
    /// use typecraft_core::MemberFlags;
    ///
    /// let flags = MemberFlags::VIRTUAL | MemberFlags::CALLS_SUPER;
    /// assert!(flags.contains(MemberFlags::VIRTUAL));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MemberFlags: u8 {
        /// The member may be overridden by a derived template.
        const VIRTUAL = 1 << 0;
        /// The body invokes the overridden implementation.
        const CALLS_SUPER = 1 << 1;
    }
}
