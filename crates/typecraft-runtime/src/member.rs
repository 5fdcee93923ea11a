//! Member specifications and the descriptors they classify into.
//!
//! A [`MemberSpec`] is what a caller hands to [`Template::def`](crate::Template::def):
//! a method, a property, or a plain default value. Declaring it validates the
//! spec against the template and stores a [`MemberDescriptor`].

use std::fmt;
use std::rc::Rc;

use typecraft_core::{MemberFlags, MemberKind, Result, Visibility};

use crate::{This, Value};

/// Body of a method or constructor.
pub type MethodBody = Rc<dyn Fn(&This, &[Value]) -> Result<Value>>;
/// Body of a get accessor.
pub type GetterBody = Rc<dyn Fn(&This) -> Result<Value>>;
/// Body of a set accessor.
pub type SetterBody = Rc<dyn Fn(&This, Value) -> Result<()>>;

// ============================================================================
// Specs
// ============================================================================

/// A method declaration.
#[derive(Clone)]
pub struct Method {
    pub(crate) body: MethodBody,
    pub(crate) params: Vec<String>,
    pub(crate) calls_super: bool,
}

impl Method {
    /// Create a method from its body.
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&This, &[Value]) -> Result<Value> + 'static,
    {
        Self {
            body: Rc::new(body),
            params: Vec::new(),
            calls_super: false,
        }
    }

    /// Declare parameter names.
    ///
    /// On a constructor these are the dependencies the injector resolves. A
    /// leading `...` stands for the parent constructor's parameter list.
    pub fn params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    /// Mark the body as calling the overridden implementation.
    pub fn calls_super(mut self) -> Self {
        self.calls_super = true;
        self
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("params", &self.params)
            .field("calls_super", &self.calls_super)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub(crate) enum AccessorBody {
    Auto,
    Get(GetterBody),
    Set(SetterBody),
}

/// One half of a property declaration.
#[derive(Clone)]
pub struct Accessor {
    pub(crate) body: AccessorBody,
    pub(crate) calls_super: bool,
}

impl Accessor {
    /// The default implementation, reading or writing the backing value.
    pub fn auto() -> Self {
        Self {
            body: AccessorBody::Auto,
            calls_super: false,
        }
    }

    /// A custom get accessor.
    pub fn getter<F>(body: F) -> Self
    where
        F: Fn(&This) -> Result<Value> + 'static,
    {
        Self {
            body: AccessorBody::Get(Rc::new(body)),
            calls_super: false,
        }
    }

    /// A custom set accessor.
    pub fn setter<F>(body: F) -> Self
    where
        F: Fn(&This, Value) -> Result<()> + 'static,
    {
        Self {
            body: AccessorBody::Set(Rc::new(body)),
            calls_super: false,
        }
    }

    /// Mark the body as calling the overridden accessor.
    pub fn calls_super(mut self) -> Self {
        self.calls_super = true;
        self
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = match self.body {
            AccessorBody::Auto => "auto",
            AccessorBody::Get(_) => "get",
            AccessorBody::Set(_) => "set",
        };
        f.debug_struct("Accessor")
            .field("body", &body)
            .field("calls_super", &self.calls_super)
            .finish()
    }
}

/// A property declaration.
///
/// Accessor keys follow the member sigil grammar, so `__set` declares a
/// private set accessor on an otherwise public property.
#[derive(Clone, Debug, Default)]
pub struct Property {
    pub(crate) value: Option<Value>,
    pub(crate) accessors: Vec<(String, Accessor)>,
}

impl Property {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial backing value.
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Declare the get accessor with the property's own visibility.
    pub fn get(self, accessor: Accessor) -> Self {
        self.accessor("get", accessor)
    }

    /// Declare the set accessor with the property's own visibility.
    pub fn set(self, accessor: Accessor) -> Self {
        self.accessor("set", accessor)
    }

    /// Declare an accessor under a sigil-carrying key.
    pub fn accessor(mut self, key: impl Into<String>, accessor: Accessor) -> Self {
        self.accessors.push((key.into(), accessor));
        self
    }
}

/// Anything that can be declared as a member.
#[derive(Clone, Debug)]
pub enum MemberSpec {
    Method(Method),
    Property(Property),
    /// A read/write property with this initial value.
    Value(Value),
}

impl From<Method> for MemberSpec {
    fn from(method: Method) -> Self {
        MemberSpec::Method(method)
    }
}

impl From<Property> for MemberSpec {
    fn from(property: Property) -> Self {
        MemberSpec::Property(property)
    }
}

impl From<Value> for MemberSpec {
    fn from(value: Value) -> Self {
        MemberSpec::Value(value)
    }
}

// ============================================================================
// Descriptors
// ============================================================================

/// A classified member installed in a template.
#[derive(Clone)]
pub struct MemberDescriptor {
    /// Bare name, sigil stripped.
    pub name: String,
    pub visibility: Visibility,
    pub flags: MemberFlags,
    pub(crate) def: MemberDef,
}

#[derive(Clone)]
pub(crate) enum MemberDef {
    Method(MethodDef),
    Constructor(MethodDef),
    Property(PropertyDef),
    Event,
}

#[derive(Clone)]
pub(crate) struct MethodDef {
    pub(crate) body: MethodBody,
    pub(crate) params: Vec<String>,
}

#[derive(Clone)]
pub(crate) struct AccessorDef<B> {
    pub(crate) visibility: Visibility,
    /// `None` means the default backing-value implementation.
    pub(crate) body: Option<B>,
    pub(crate) calls_super: bool,
}

#[derive(Clone)]
pub(crate) struct PropertyDef {
    pub(crate) get: Option<AccessorDef<GetterBody>>,
    pub(crate) set: Option<AccessorDef<SetterBody>>,
    pub(crate) initial: Value,
}

impl MemberDescriptor {
    pub fn kind(&self) -> MemberKind {
        match self.def {
            MemberDef::Method(_) => MemberKind::Method,
            MemberDef::Constructor(_) => MemberKind::Constructor,
            MemberDef::Property(_) => MemberKind::Property,
            MemberDef::Event => MemberKind::Event,
        }
    }

    pub fn is_virtual(&self) -> bool {
        self.flags.contains(MemberFlags::VIRTUAL)
    }

    /// Check if the body (or any accessor body) calls the overridden implementation.
    pub fn calls_super(&self) -> bool {
        match &self.def {
            MemberDef::Property(p) => {
                p.get.as_ref().is_some_and(|a| a.calls_super)
                    || p.set.as_ref().is_some_and(|a| a.calls_super)
            }
            _ => self.flags.contains(MemberFlags::CALLS_SUPER),
        }
    }

    /// Declared parameter names of a method or constructor.
    pub fn params(&self) -> &[String] {
        match &self.def {
            MemberDef::Method(m) | MemberDef::Constructor(m) => &m.params,
            _ => &[],
        }
    }

    /// Visibility of the get accessor, if the property has one.
    pub fn getter_visibility(&self) -> Option<Visibility> {
        match &self.def {
            MemberDef::Property(p) => p.get.as_ref().map(|a| a.visibility),
            _ => None,
        }
    }

    /// Visibility of the set accessor, if the property has one.
    pub fn setter_visibility(&self) -> Option<Visibility> {
        match &self.def {
            MemberDef::Property(p) => p.set.as_ref().map(|a| a.visibility),
            _ => None,
        }
    }

    pub(crate) fn method(&self) -> Option<&MethodDef> {
        match &self.def {
            MemberDef::Method(m) | MemberDef::Constructor(m) => Some(m),
            _ => None,
        }
    }

    pub(crate) fn property(&self) -> Option<&PropertyDef> {
        match &self.def {
            MemberDef::Property(p) => Some(p),
            _ => None,
        }
    }
}

impl fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("visibility", &self.visibility)
            .field("flags", &self.flags)
            .finish()
    }
}
