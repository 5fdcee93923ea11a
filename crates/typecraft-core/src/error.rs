//! Unified error types for typecraft.
//!
//! ## Error Hierarchy
//!
//! ```text
//! Error (top-level wrapper)
//! ├── DefinitionError  - Raised while declaring a type
//! ├── AccessError      - Raised while using a built instance
//! ├── ResolutionError  - Raised by the dependency injector
//! └── Raised           - Failures raised by user-supplied bodies
//! ```
//!
//! Every failure is fail-fast: nothing is retried and a construction that
//! fails in any pass never hands out a partially built instance.
//!
//! ## Usage
//!
//! ```
//! use typecraft_core::{AccessError, DefinitionError, Error, Result};
//!
//! fn width(raw: Option<i64>) -> Result<i64> {
//!     let width = raw.ok_or(AccessError::WriteOnly {
//!         name: "width".into(),
//!     })?; // AccessError -> Error
//!     Ok(width)
//! }
//!
//! assert_eq!(width(Some(3)), Ok(3));
//! let err = width(None).unwrap_err();
//! assert!(err.is_access());
//! assert_eq!(err.to_string(), "cannot read from write only property 'width'");
//!
//! let err: Error = DefinitionError::NoInheritedDependencies.into();
//! assert!(err.is_definition());
//! ```

use thiserror::Error;

use crate::{AccessorKind, MemberKind, Visibility};

/// Result alias used across the workspace.
pub type Result<T, E = Error> = std::result::Result<T, E>;

// ============================================================================
// Definition Errors
// ============================================================================

/// Errors raised synchronously while declaring a type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// `extend` was called after members were declared.
    #[error("cannot change the base type of '{template}' after members have been defined")]
    BaseAfterMembers { template: String },

    /// The inheritance chain would loop back on itself.
    #[error("'{template}' cannot inherit from {}", inherit_target(.from_self))]
    CircularInheritance { template: String, from_self: bool },

    /// A template from another engine (or something that is not a template).
    #[error("{role} must be a template of the same engine")]
    ForeignTemplate { role: &'static str },

    /// A template tried to include itself.
    #[error("'{template}' cannot include itself")]
    IncludeSelf { template: String },

    /// A mixin (transitively) includes the template that includes it.
    #[error("'{template}' cannot include '{mixin}' because it includes '{template}'")]
    CircularMixin { template: String, mixin: String },

    /// A mixin declares constructor parameters.
    #[error("mixin '{mixin}' cannot have dependencies")]
    MixinWithDependencies { mixin: String },

    /// The member name is already taken.
    #[error("member '{name}' is already defined")]
    DuplicateMember { name: String },

    /// The sigil stripped everything from the declared name.
    #[error("member name '{raw}' is empty once its modifiers are removed")]
    EmptyName { raw: String },

    /// A member redeclares an inherited member with another visibility.
    #[error("cannot change access modifier of member '{name}' from {from} to {to}")]
    VisibilityChange {
        name: String,
        from: Visibility,
        to: Visibility,
    },

    /// An accessor redeclares an inherited accessor with another visibility.
    #[error("cannot change access modifier of '{accessor}' accessor for property '{name}' from {from} to {to}")]
    AccessorVisibilityChange {
        name: String,
        accessor: AccessorKind,
        from: Visibility,
        to: Visibility,
    },

    /// An accessor is more visible than its property.
    #[error("the {accessor} accessor of property '{name}' cannot have a lower access modifier than the property itself")]
    AccessorWiderThanProperty { name: String, accessor: AccessorKind },

    /// Both accessors carry their own access modifier.
    #[error("cannot set access modifiers for both accessors of property '{name}'")]
    BothAccessorsModified { name: String },

    /// An accessor key carried a virtual sigil.
    #[error("property '{name}' cannot have virtual accessors")]
    VirtualAccessor { name: String },

    /// An override turned a read/write property read-only, or the reverse.
    #[error("cannot change read/write definition of property '{name}'")]
    ReadWriteChange { name: String },

    /// An override declares a different kind of member than it replaces.
    #[error("cannot redeclare {from} '{name}' as a {to}")]
    KindChange {
        name: String,
        from: MemberKind,
        to: MemberKind,
    },

    /// An accessor key was given the body of the other accessor.
    #[error("the {accessor} accessor of property '{name}' was given the wrong kind of body")]
    AccessorBodyMismatch { name: String, accessor: AccessorKind },

    /// Events are never overridable.
    #[error("event '{name}' cannot be virtual")]
    VirtualEvent { name: String },

    /// The constructor name is reserved for methods.
    #[error("{kind} cannot be named 'ctor'")]
    ReservedCtorName { kind: MemberKind },

    /// `...` was used without inherited dependencies to expand.
    #[error("the '...' syntax is invalid when a base type does not exist or has no dependencies")]
    NoInheritedDependencies,

    /// A parent constructor takes parameters but the derived one never calls it.
    #[error("parent constructor of '{template}' contains parameters and must be called explicitly")]
    ParentCtorNotCalled { template: String },

    /// The template has been instantiated and can no longer change shape.
    #[error("'{template}' can no longer be modified because it has been instantiated")]
    Sealed { template: String },
}

fn inherit_target(from_self: &bool) -> &'static str {
    if *from_self { "self" } else { "a derived type" }
}

// ============================================================================
// Access Errors
// ============================================================================

/// Errors raised while using an already-built instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// No member of that name is reachable from here.
    #[error("member '{name}' is not accessible")]
    UnknownMember { name: String },

    /// The property has no reachable get accessor.
    #[error("cannot read from write only property '{name}'")]
    WriteOnly { name: String },

    /// The property has no reachable set accessor.
    #[error("cannot assign to read only property '{name}'")]
    ReadOnly { name: String },

    /// The member exists but is not of the kind the operation needs.
    #[error("member '{name}' is a {found}, not a {expected}")]
    WrongKind {
        name: String,
        expected: MemberKind,
        found: MemberKind,
    },

    /// There is no overridden implementation to call.
    #[error("'{name}' has no overridden implementation to call")]
    NoSuper { name: String },

    /// A backing value was requested outside of a property accessor.
    #[error("no property backing value is in scope")]
    NoBackingValue,

    /// The constructor of a scope level ran already.
    #[error("the constructor of '{template}' has already run")]
    AlreadyConstructed { template: String },

    /// The value cannot be invoked.
    #[error("a {type_name} value is not callable")]
    NotCallable { type_name: &'static str },

    /// A positional argument was missing.
    #[error("argument {index} out of bounds (count: {count})")]
    ArgumentOutOfBounds { index: usize, count: usize },

    /// A value had another type than expected.
    #[error("expected {expected}, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

// ============================================================================
// Resolution Errors
// ============================================================================

/// Errors raised by the dependency injector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// The service key is not registered and cannot be derived.
    #[error("service \"{service}\" not found")]
    NotFound { service: String },

    /// The service key is already bound.
    #[error("the service \"{service}\" has already been registered")]
    AlreadyRegistered { service: String },

    /// The factory bound to a service cannot be invoked.
    #[error("the factory for service \"{service}\" must be callable")]
    NotCallable { service: String },

    /// Resolving the service requires itself.
    #[error("circular dependency: {}", .chain.join(" -> "))]
    Circular { chain: Vec<String> },
}

// ============================================================================
// Unified Error
// ============================================================================

/// Top-level error wrapping every phase.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// A failure raised by a method, accessor, handler or factory body.
    #[error("{0}")]
    Raised(String),
}

impl Error {
    /// Raise a failure from user code.
    pub fn raised(message: impl Into<String>) -> Self {
        Error::Raised(message.into())
    }

    /// Check if this is a declaration-time failure.
    pub fn is_definition(&self) -> bool {
        matches!(self, Error::Definition(_))
    }

    /// Check if this is a failure to use a built instance.
    pub fn is_access(&self) -> bool {
        matches!(self, Error::Access(_))
    }

    /// Check if this is an injector failure.
    pub fn is_resolution(&self) -> bool {
        matches!(self, Error::Resolution(_))
    }
}
