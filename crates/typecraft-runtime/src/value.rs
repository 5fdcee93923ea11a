//! Runtime values passed to and returned from member bodies.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use typecraft_core::{AccessError, Result};

use crate::{Instance, Scope, Template};

/// A dynamic value.
///
/// Primitive variants compare structurally. Objects, scopes, types, functions
/// and native values compare by identity, so two distinct instances with the
/// same state are never equal.
#[derive(Clone, Default)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    /// A public interface.
    Object(Instance),
    /// A private scope handle, only ever produced from inside a type body.
    Scope(Scope),
    /// A constructible type.
    Type(Template),
    Function(Function),
    /// Arbitrary host data.
    Native(Rc<dyn Any>),
}

impl Value {
    /// Wrap host data.
    pub fn native<T: Any>(value: T) -> Self {
        Value::Native(Rc::new(value))
    }

    /// Get a human-readable name for this value's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Object(_) => "object",
            Value::Scope(_) => "scope",
            Value::Type(_) => "type",
            Value::Function(_) => "function",
            Value::Native(_) => "native",
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value can be invoked with [`Value::call`].
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Type(_))
    }

    /// Invoke a callable value.
    ///
    /// Functions are called directly; types are constructed and the new
    /// public interface is returned.
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        match self {
            Value::Function(f) => f.call(args),
            Value::Type(t) => Ok(Value::Object(t.construct(args)?)),
            other => Err(AccessError::NotCallable {
                type_name: other.type_name(),
            }
            .into()),
        }
    }

    /// Declared dependencies of a callable value.
    ///
    /// For a type this is its constructor's declared parameter list.
    pub fn dependencies(&self) -> Vec<String> {
        match self {
            Value::Function(f) => f.inject().to_vec(),
            Value::Type(t) => t.dependencies(),
            _ => Vec::new(),
        }
    }

    pub fn as_bool(&self) -> Result<bool, AccessError> {
        match self {
            Value::Bool(v) => Ok(*v),
            other => Err(mismatch("bool", other)),
        }
    }

    pub fn as_int(&self) -> Result<i64, AccessError> {
        match self {
            Value::Int(v) => Ok(*v),
            other => Err(mismatch("int", other)),
        }
    }

    /// Get a float, widening integers.
    pub fn as_float(&self) -> Result<f64, AccessError> {
        match self {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            other => Err(mismatch("float", other)),
        }
    }

    pub fn as_str(&self) -> Result<&str, AccessError> {
        match self {
            Value::Str(v) => Ok(v),
            other => Err(mismatch("string", other)),
        }
    }

    pub fn as_list(&self) -> Result<&[Value], AccessError> {
        match self {
            Value::List(v) => Ok(v),
            other => Err(mismatch("list", other)),
        }
    }

    pub fn as_object(&self) -> Result<&Instance, AccessError> {
        match self {
            Value::Object(v) => Ok(v),
            other => Err(mismatch("object", other)),
        }
    }

    pub fn as_scope(&self) -> Result<&Scope, AccessError> {
        match self {
            Value::Scope(v) => Ok(v),
            other => Err(mismatch("scope", other)),
        }
    }

    pub fn as_type(&self) -> Result<&Template, AccessError> {
        match self {
            Value::Type(v) => Ok(v),
            other => Err(mismatch("type", other)),
        }
    }

    pub fn as_function(&self) -> Result<&Function, AccessError> {
        match self {
            Value::Function(v) => Ok(v),
            other => Err(mismatch("function", other)),
        }
    }

    /// Borrow host data of a known type.
    pub fn downcast_native<T: Any>(&self) -> Result<&T, AccessError> {
        match self {
            Value::Native(v) => v.downcast_ref::<T>().ok_or(AccessError::TypeMismatch {
                expected: std::any::type_name::<T>(),
                found: "native",
            }),
            other => Err(mismatch(std::any::type_name::<T>(), other)),
        }
    }
}

fn mismatch(expected: &'static str, found: &Value) -> AccessError {
    AccessError::TypeMismatch {
        expected,
        found: found.type_name(),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Scope(a), Value::Scope(b)) => a.ptr_eq(b),
            (Value::Type(a), Value::Type(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(v) => write!(f, "Bool({})", v),
            Value::Int(v) => write!(f, "Int({})", v),
            Value::Float(v) => write!(f, "Float({})", v),
            Value::Str(v) => write!(f, "Str({:?})", v),
            Value::List(v) => f.debug_tuple("List").field(v).finish(),
            Value::Object(v) => write!(f, "Object({:?})", v),
            Value::Scope(v) => write!(f, "Scope({:?})", v),
            Value::Type(v) => write!(f, "Type({})", v.display_name()),
            Value::Function(_) => write!(f, "Function(...)"),
            Value::Native(_) => write!(f, "Native(...)"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<Instance> for Value {
    fn from(v: Instance) -> Self {
        Value::Object(v)
    }
}

impl From<Scope> for Value {
    fn from(v: Scope) -> Self {
        Value::Scope(v)
    }
}

impl From<Template> for Value {
    fn from(v: Template) -> Self {
        Value::Type(v)
    }
}

impl From<Function> for Value {
    fn from(v: Function) -> Self {
        Value::Function(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

// ============================================================================
// Function
// ============================================================================

type FunctionBody = dyn Fn(&[Value]) -> Result<Value>;

/// A callable value with an explicit declared dependency list.
///
/// The dependency list is what the injector resolves before invoking the
/// function; it replaces reading parameter names from a signature.
#[derive(Clone)]
pub struct Function {
    body: Rc<FunctionBody>,
    inject: Rc<[String]>,
}

impl Function {
    /// Wrap a closure.
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        Self {
            body: Rc::new(body),
            inject: Rc::from(Vec::new()),
        }
    }

    /// Declare the services this function expects as leading arguments.
    pub fn with_inject<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inject = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Declared dependencies.
    pub fn inject(&self) -> &[String] {
        &self.inject
    }

    /// Invoke the function.
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        (self.body)(args)
    }

    /// Check if both handles point at the same closure.
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("inject", &self.inject)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Handler
// ============================================================================

type HandlerBody = dyn Fn(&Instance, &[Value]) -> Result<()>;

/// An event handler.
///
/// Handlers receive the public interface of the raising instance as sender.
/// Removal matches handlers by identity, so keep a clone of the handler you
/// intend to remove later.
#[derive(Clone)]
pub struct Handler(Rc<HandlerBody>);

impl Handler {
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> Result<()> + 'static,
    {
        Self(Rc::new(body))
    }

    pub fn call(&self, sender: &Instance, args: &[Value]) -> Result<()> {
        (self.0)(sender, args)
    }

    pub fn ptr_eq(&self, other: &Handler) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}
