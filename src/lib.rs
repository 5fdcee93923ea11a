//! Classical object-oriented semantics synthesized at runtime, plus a
//! dependency injector.
//!
//! Types are declared as [`Template`]s on an [`Engine`]. Member names carry
//! their visibility and virtuality as sigils:
//!
//! | Prefix | Visibility  | Virtual |
//! |--------|-------------|---------|
//! | `__`   | private     | no      |
//! | `_$`   | protected   | yes     |
//! | `_`    | protected   | no      |
//! | `$`    | public      | yes     |
//! | (none) | public      | no      |
//!
//! Constructing a template builds one private scope per inheritance level,
//! propagates virtual overrides so every level dispatches to the most-derived
//! implementation, and returns the public [`Instance`].
//!
//! # Example
//!
//! ```
//! use typecraft::prelude::*;
//!
//! let engine = Engine::new();
//! let counter = engine
//!     .template()
//!     .def([
//!         ("__count", MemberSpec::from(Value::Int(0))),
//!         (
//!             "increment",
//!             Method::new(|this, _| {
//!                 let next = this.get("count")?.as_int()? + 1;
//!                 this.set("count", next)?;
//!                 Ok(Value::Int(next))
//!             })
//!             .into(),
//!         ),
//!     ])
//!     .unwrap();
//!
//! let instance = counter.construct(&[]).unwrap();
//! instance.call("increment", &[]).unwrap();
//! assert_eq!(instance.call("increment", &[]).unwrap(), Value::Int(2));
//! assert!(instance.get("count").is_err());
//! ```

pub use typecraft_core as core;
pub use typecraft_inject as inject;
pub use typecraft_runtime as runtime;

pub use typecraft_core::{
    AccessError, DefinitionError, Error, MemberKind, ResolutionError, Result, Visibility,
};
pub use typecraft_inject::{Injector, PROVIDER_PREFIX, Request};
pub use typecraft_runtime::{
    Accessor, Engine, Function, Handler, Instance, MemberSpec, Method, Property, Scope, Template,
    This, Value,
};

/// Everything needed to declare, build and inject types.
pub mod prelude {
    pub use typecraft_core::{AccessError, DefinitionError, Error, ResolutionError, Result};
    pub use typecraft_inject::{Injector, Request};
    pub use typecraft_runtime::{
        Accessor, Engine, Function, Handler, Instance, MemberSpec, Method, Property, Scope,
        Template, This, Value,
    };
}
