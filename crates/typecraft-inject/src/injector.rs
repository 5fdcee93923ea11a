//! The service registry and resolver.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use typecraft_core::{ResolutionError, Result};
use typecraft_runtime::{Engine, Function, Template, Value};

/// Key prefix requesting a lazy provider instead of the service itself.
pub const PROVIDER_PREFIX: &str = "provider`";

/// What [`Injector::resolve`] is asked to produce.
#[derive(Debug, Clone)]
pub enum Request {
    /// A registered (or engine-derivable) service key.
    Key(String),
    /// An unregistered factory, resolved through its declared dependencies.
    Factory(Value),
    /// A factory with an explicit dependency list taking precedence over
    /// the one it declares.
    Explicit { deps: Vec<String>, factory: Value },
}

impl Request {
    pub fn explicit<I, S>(deps: I, factory: impl Into<Value>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Request::Explicit {
            deps: deps.into_iter().map(Into::into).collect(),
            factory: factory.into(),
        }
    }
}

impl From<&str> for Request {
    fn from(key: &str) -> Self {
        Request::Key(key.to_string())
    }
}

impl From<String> for Request {
    fn from(key: String) -> Self {
        Request::Key(key)
    }
}

impl From<Value> for Request {
    fn from(factory: Value) -> Self {
        Request::Factory(factory)
    }
}

impl From<Function> for Request {
    fn from(factory: Function) -> Self {
        Request::Factory(Value::Function(factory))
    }
}

impl From<Template> for Request {
    fn from(factory: Template) -> Self {
        Request::Factory(Value::Type(factory))
    }
}

impl From<&Template> for Request {
    fn from(factory: &Template) -> Self {
        Request::Factory(Value::Type(factory.clone()))
    }
}

#[derive(Clone)]
struct Binding {
    factory: Value,
    inject: Vec<String>,
}

impl Binding {
    fn new(service: &str, factory: Value) -> Result<Self, ResolutionError> {
        let inject = factory.dependencies();
        Self::with_inject(service, inject, factory)
    }

    fn with_inject(
        service: &str,
        inject: Vec<String>,
        factory: Value,
    ) -> Result<Self, ResolutionError> {
        if !factory.is_callable() {
            return Err(ResolutionError::NotCallable {
                service: service.to_string(),
            });
        }
        Ok(Self { factory, inject })
    }
}

/// Keyed registry of factories with recursive dependency resolution.
///
/// Cloning the handle is cheap and every clone shares the same registry.
#[derive(Clone, Default)]
pub struct Injector(Rc<InjectorInner>);

#[derive(Default)]
struct InjectorInner {
    bindings: RefCell<FxHashMap<String, Binding>>,
    engine: RefCell<Option<Engine>>,
}

impl Injector {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Registry
    // ==========================================================================

    /// Bind `service` to a callable factory.
    ///
    /// The factory's declared dependencies (a function's inject list, a
    /// type's constructor parameters) are resolved before each invocation.
    pub fn register(&self, service: &str, factory: impl Into<Value>) -> Result<&Self> {
        let binding = Binding::new(service, factory.into())?;
        self.bind(service, binding)?;
        Ok(self)
    }

    /// Bind `service` with an explicit dependency list.
    pub fn register_with<I, S>(
        &self,
        service: &str,
        deps: I,
        factory: impl Into<Value>,
    ) -> Result<&Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let deps = deps.into_iter().map(Into::into).collect();
        let binding = Binding::with_inject(service, deps, factory.into())?;
        self.bind(service, binding)?;
        Ok(self)
    }

    /// Bind several services in order, stopping at the first failure.
    pub fn register_all<I, K, V>(&self, bindings: I) -> Result<&Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (service, factory) in bindings {
            self.register(service.as_ref(), factory)?;
        }
        Ok(self)
    }

    /// Remove a binding. Returns whether one existed.
    pub fn unregister(&self, service: &str) -> bool {
        let removed = self.0.bindings.borrow_mut().remove(service).is_some();
        if removed {
            tracing::debug!(service, "service unregistered");
        }
        removed
    }

    /// Bind `service` to a fixed value.
    pub fn constant(&self, service: &str, value: impl Into<Value>) -> Result<&Self> {
        let value = value.into();
        let factory = Function::new(move |_| Ok(value.clone()));
        self.register(service, factory)
    }

    /// Bind several constants in order, stopping at the first failure.
    pub fn constant_all<I, K, V>(&self, constants: I) -> Result<&Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (service, value) in constants {
            self.constant(service.as_ref(), value)?;
        }
        Ok(self)
    }

    pub fn is_registered(&self, service: &str) -> bool {
        self.0.bindings.borrow().contains_key(service)
    }

    /// Resolve unregistered keys against the named types of `engine`.
    pub fn use_engine(&self, engine: &Engine) -> &Self {
        tracing::debug!(token = %engine.token(), "automatic binding enabled");
        *self.0.engine.borrow_mut() = Some(engine.clone());
        self
    }

    /// Register every named type of `engine` under its name.
    ///
    /// Names that are already bound are left alone. Returns how many types
    /// were registered.
    pub fn auto_register(&self, engine: &Engine) -> usize {
        let mut registered = 0;
        for name in engine.names() {
            if self.is_registered(&name) {
                continue;
            }
            if let Some(template) = engine.lookup(&name) {
                let binding = Binding {
                    inject: template.dependencies(),
                    factory: Value::Type(template),
                };
                self.0.bindings.borrow_mut().insert(name, binding);
                registered += 1;
            }
        }
        tracing::debug!(registered, "named types registered");
        registered
    }

    // ==========================================================================
    // Resolution
    // ==========================================================================

    /// Produce a service.
    ///
    /// Dependencies are resolved depth-first before the factory runs; `args`
    /// are appended after them. A key starting with [`PROVIDER_PREFIX`]
    /// yields a function that resolves the rest of the key each time it is
    /// called.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn resolve(&self, request: impl Into<Request>, args: &[Value]) -> Result<Value> {
        let mut path = Vec::new();
        match request.into() {
            Request::Key(service) => self.resolve_key(&service, args, &mut path),
            Request::Factory(factory) => {
                let binding = Binding::new(factory.type_name(), factory)?;
                self.invoke(&binding, args, &mut path)
            }
            Request::Explicit { deps, factory } => {
                let binding = Binding::with_inject(factory.type_name(), deps, factory)?;
                self.invoke(&binding, args, &mut path)
            }
        }
    }

    /// A function that resolves `service` each time it is called.
    ///
    /// Arguments passed to the function are forwarded as extra arguments.
    pub fn provider_of(&self, service: &str) -> Function {
        let injector = self.clone();
        let service = service.to_string();
        Function::new(move |args| injector.resolve(service.as_str(), args))
    }

    fn resolve_key(&self, service: &str, args: &[Value], path: &mut Vec<String>) -> Result<Value> {
        if let Some(target) = service.strip_prefix(PROVIDER_PREFIX) {
            tracing::trace!(service = target, "provider requested");
            return Ok(Value::Function(self.provider_of(target)));
        }
        if path.iter().any(|visited| visited == service) {
            let mut chain = path.clone();
            chain.push(service.to_string());
            return Err(ResolutionError::Circular { chain }.into());
        }

        let binding = self.binding(service).ok_or_else(|| ResolutionError::NotFound {
            service: service.to_string(),
        })?;

        tracing::trace!(service, depth = path.len(), "resolving service");
        path.push(service.to_string());
        let result = self.invoke(&binding, args, path);
        path.pop();
        result
    }

    fn invoke(&self, binding: &Binding, args: &[Value], path: &mut Vec<String>) -> Result<Value> {
        let mut resolved = Vec::with_capacity(binding.inject.len() + args.len());
        for dependency in &binding.inject {
            resolved.push(self.resolve_key(dependency, &[], path)?);
        }
        resolved.extend_from_slice(args);
        binding.factory.call(&resolved)
    }

    fn binding(&self, service: &str) -> Option<Binding> {
        if let Some(binding) = self.0.bindings.borrow().get(service) {
            return Some(binding.clone());
        }
        let engine = self.0.engine.borrow();
        let template = engine.as_ref()?.lookup(service)?;
        tracing::trace!(service, "bound automatically from engine");
        Some(Binding {
            inject: template.dependencies(),
            factory: Value::Type(template),
        })
    }

    fn bind(&self, service: &str, binding: Binding) -> Result<(), ResolutionError> {
        let mut bindings = self.0.bindings.borrow_mut();
        if bindings.contains_key(service) {
            return Err(ResolutionError::AlreadyRegistered {
                service: service.to_string(),
            });
        }
        tracing::debug!(service, inject = ?binding.inject, "service registered");
        bindings.insert(service.to_string(), binding);
        Ok(())
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut services: Vec<String> = self.0.bindings.borrow().keys().cloned().collect();
        services.sort();
        f.debug_struct("Injector")
            .field("services", &services)
            .field("engine", &self.0.engine.borrow().is_some())
            .finish()
    }
}
