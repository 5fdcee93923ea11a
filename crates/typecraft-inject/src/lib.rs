//! Dependency injection for typecraft.
//!
//! An [`Injector`] maps service keys to factories. Resolving a key resolves
//! the factory's declared dependencies first (depth-first, recursively),
//! then invokes the factory with them followed by any extra arguments.
//!
//! Factories are callable [`Value`](typecraft_runtime::Value)s: a
//! [`Function`](typecraft_runtime::Function) declares its dependencies with
//! `with_inject`, a [`Template`](typecraft_runtime::Template) through its
//! constructor's parameter list.
//!
//! # Example
//!
//! ```
//! use typecraft_inject::Injector;
//! use typecraft_runtime::{Function, Value};
//!
//! let injector = Injector::new();
//! injector.constant("base", 40).unwrap();
//! injector
//!     .register(
//!         "answer",
//!         Function::new(|args| Ok(Value::Int(args[0].as_int()? + 2))).with_inject(["base"]),
//!     )
//!     .unwrap();
//!
//! assert_eq!(injector.resolve("answer", &[]).unwrap(), Value::Int(42));
//! ```

mod injector;

pub use injector::{Injector, PROVIDER_PREFIX, Request};
