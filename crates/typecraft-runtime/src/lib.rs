//! Type composition runtime.
//!
//! This crate synthesizes class semantics at runtime: visibility, virtual
//! dispatch across an inheritance chain, single inheritance, stateless
//! mixins, properties with accessors, events and super calls.
//!
//! - [`Engine`] creates [`Template`]s and owns their capability token
//! - [`Template`] accumulates and validates member declarations
//! - [`Template::construct`] runs the Scope Builder and returns an [`Instance`]
//! - [`This`] and [`Scope`] give bodies access to an instance's private state
//!
//! # Example
//!
//! ```
//! use typecraft_runtime::{Engine, Method, Value};
//!
//! let engine = Engine::new();
//! let shape = engine
//!     .template()
//!     .def([
//!         ("$name", Method::new(|_, _| Ok("shape".into()))),
//!         (
//!             "describe",
//!             Method::new(|this, _| {
//!                 let name = this.call("name", &[])?;
//!                 Ok(format!("a {}", name.as_str()?).into())
//!             }),
//!         ),
//!     ])
//!     .unwrap();
//! let circle = engine
//!     .template()
//!     .extend(&shape)
//!     .unwrap()
//!     .member("$name", Method::new(|_, _| Ok("circle".into())))
//!     .unwrap();
//!
//! let instance = circle.construct(&[]).unwrap();
//! assert_eq!(instance.call("describe", &[]).unwrap(), Value::from("a circle"));
//! ```

mod arena;
mod builder;
mod dispatch;
mod engine;
mod instance;
mod member;
mod scope;
mod template;
mod value;

pub use engine::Engine;
pub use instance::Instance;
pub use member::{
    Accessor, GetterBody, MemberDescriptor, MemberSpec, Method, MethodBody, Property, SetterBody,
};
pub use scope::{Scope, This};
pub use template::Template;
pub use value::{Function, Handler, Value};
