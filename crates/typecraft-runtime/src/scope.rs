//! Private scopes.
//!
//! A [`Scope`] is a handle to one inheritance level of an instance. It sees
//! every member of its own level, private ones included, plus whatever the
//! level proxies from its parent and mixins. Scope handles only come from
//! inside type bodies: bodies receive a [`This`], and [`Scope::pry`] or
//! [`Scope::spawn`] return further handles.
//!
//! [`This`] is the scope a body runs on plus the state of that one
//! invocation: the running member, the overridden implementation reachable
//! through [`This::call_super`], and the property backing value.

use std::fmt;
use std::ops::Deref;

use typecraft_core::{AccessError, MemberKind, Result};

use crate::arena::{LevelId, Slot};
use crate::{Handler, Instance, Template, Value, dispatch};

/// Handle to one level of an instance's private state.
#[derive(Clone)]
pub struct Scope {
    instance: Instance,
    level: LevelId,
}

impl Scope {
    pub(crate) fn new(instance: Instance, level: LevelId) -> Self {
        Self { instance, level }
    }

    /// The template this level was built from.
    pub fn template(&self) -> Template {
        self.instance.arena().level(self.level).template.clone()
    }

    /// The public interface of the whole instance.
    pub fn public(&self) -> Instance {
        self.instance.clone()
    }

    /// Check if this level's template is `template` or derives from it.
    pub fn is_instance_of(&self, template: &Template) -> bool {
        self.template().is_a(template)
    }

    /// Check if a member of that name is reachable from this level.
    pub fn has_member(&self, name: &str) -> bool {
        self.slot(name).is_some()
    }

    /// Call a method.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        let slot = self.slot(name).ok_or_else(|| unknown(name))?;
        dispatch::call_slot(&self.instance, slot, name, args)
    }

    /// Read a property, or an ad-hoc field when no member has that name.
    ///
    /// Unset fields read as [`Value::Null`].
    pub fn get(&self, name: &str) -> Result<Value> {
        match self.slot(name) {
            Some(Slot::Property { get: Some(get), .. }) => {
                dispatch::invoke_getter(&self.instance, get.level, name)
            }
            Some(Slot::Property { get: None, .. }) => Err(AccessError::WriteOnly {
                name: name.to_string(),
            }
            .into()),
            Some(other) => Err(wrong_kind(name, MemberKind::Property, &other).into()),
            None => Ok(self
                .instance
                .arena()
                .level(self.level)
                .fields
                .get(name)
                .cloned()
                .unwrap_or_default()),
        }
    }

    /// Write a property, or an ad-hoc field when no member has that name.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        match self.slot(name) {
            Some(Slot::Property { set: Some(set), .. }) => {
                dispatch::invoke_setter(&self.instance, set.level, name, value)
            }
            Some(Slot::Property { set: None, .. }) => Err(AccessError::ReadOnly {
                name: name.to_string(),
            }
            .into()),
            Some(other) => Err(wrong_kind(name, MemberKind::Property, &other).into()),
            None => {
                self.instance
                    .arena_mut()
                    .level_mut(self.level)
                    .fields
                    .insert(name.to_string(), value);
                Ok(())
            }
        }
    }

    /// Invoke every handler of an event, passing the public interface as sender.
    pub fn raise(&self, event: &str, args: &[Value]) -> Result<()> {
        let holder = self.event(event)?;
        dispatch::raise(&self.instance, holder, event, args)
    }

    /// Register an event handler.
    pub fn on(&self, event: &str, handler: Handler) -> Result<()> {
        let holder = self.event(event)?;
        dispatch::add_handler(&self.instance, holder, event, handler);
        Ok(())
    }

    /// Remove an event handler. Returns whether it was registered.
    pub fn off(&self, event: &str, handler: &Handler) -> Result<bool> {
        let holder = self.event(event)?;
        Ok(dispatch::remove_handler(&self.instance, holder, event, handler))
    }

    /// Reach the private scope of another instance of this level's type.
    ///
    /// Returns `value` unchanged when it is not an instance built from this
    /// level's template.
    pub fn pry(&self, value: &Value) -> Value {
        let template = self.template();
        pry_level(value, &template)
    }

    /// Reach the private scope of `value` at the level built from `template`.
    ///
    /// Only this level's own template or one of its ancestors may be named,
    /// so a type can open levels it derives from but never unrelated ones.
    /// Anything else returns `value` unchanged.
    pub fn pry_as(&self, value: &Value, template: &Template) -> Value {
        if !self.template().is_a(template) {
            tracing::trace!(
                target_type = %template.display_name(),
                "pry refused for an unrelated template"
            );
            return value.clone();
        }
        pry_level(value, template)
    }

    /// Construct another instance of this level's type and return its
    /// private scope.
    pub fn spawn(&self, args: &[Value]) -> Result<Scope> {
        let template = self.template();
        let instance = template.construct(args)?;
        let leaf = instance.leaf();
        Ok(Scope::new(instance, leaf))
    }

    /// Check if both handles refer to the same level of the same instance.
    pub fn ptr_eq(&self, other: &Scope) -> bool {
        self.level == other.level && self.instance.ptr_eq(&other.instance)
    }

    fn slot(&self, name: &str) -> Option<Slot> {
        self.instance.arena().level(self.level).slot(name)
    }

    fn event(&self, name: &str) -> Result<LevelId, AccessError> {
        match self.slot(name) {
            Some(Slot::Event(holder)) => Ok(holder),
            Some(other) => Err(wrong_kind(name, MemberKind::Event, &other)),
            None => Err(unknown(name)),
        }
    }
}

fn pry_level(value: &Value, template: &Template) -> Value {
    let Value::Object(instance) = value else {
        return value.clone();
    };
    let found = instance.arena().find(instance.leaf(), template);
    match found {
        Some(level) => Value::Scope(Scope::new(instance.clone(), level)),
        None => value.clone(),
    }
}

fn unknown(name: &str) -> AccessError {
    AccessError::UnknownMember {
        name: name.to_string(),
    }
}

fn wrong_kind(name: &str, expected: MemberKind, found: &Slot) -> AccessError {
    AccessError::WrongKind {
        name: name.to_string(),
        expected,
        found: found.kind(),
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("template", &self.template().display_name())
            .field("level", &self.level)
            .finish()
    }
}

// ============================================================================
// Invocation context
// ============================================================================

/// The member a body is running for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Frame {
    Method(String),
    Getter(String),
    Setter(String),
    Ctor,
}

impl Frame {
    fn name(&self) -> &str {
        match self {
            Frame::Method(name) | Frame::Getter(name) | Frame::Setter(name) => name,
            Frame::Ctor => typecraft_core::CTOR,
        }
    }
}

/// What [`This::call_super`] reaches.
#[derive(Debug, Clone, Copy)]
pub(crate) enum SuperTarget {
    /// The overridden member's slot, captured at build time.
    Slot(Slot),
    /// A parent constructor that takes parameters.
    Ctor(LevelId),
}

/// The private scope a body runs on, plus the state of one invocation.
///
/// Dereferences to [`Scope`] for member access.
pub struct This {
    scope: Scope,
    frame: Frame,
    super_target: Option<SuperTarget>,
    args: Vec<Value>,
}

impl This {
    pub(crate) fn new(
        instance: Instance,
        level: LevelId,
        frame: Frame,
        super_target: Option<SuperTarget>,
        args: &[Value],
    ) -> Self {
        Self {
            scope: Scope::new(instance, level),
            frame,
            super_target,
            args: args.to_vec(),
        }
    }

    /// The scope as a value that can outlive this invocation.
    pub fn scope(&self) -> Scope {
        self.scope.clone()
    }

    /// Name of the running member, `ctor` for constructors.
    pub fn member(&self) -> &str {
        self.frame.name()
    }

    /// Positional argument of this invocation.
    pub fn arg(&self, index: usize) -> Result<&Value, AccessError> {
        self.args.get(index).ok_or(AccessError::ArgumentOutOfBounds {
            index,
            count: self.args.len(),
        })
    }

    /// Call the implementation the running member overrides.
    ///
    /// In a constructor this runs the parent constructor with `args`; in a
    /// set accessor the first argument is the value to assign. Fails with
    /// [`AccessError::NoSuper`] when nothing is overridden.
    pub fn call_super(&self, args: &[Value]) -> Result<Value> {
        let instance = &self.scope.instance;
        match (&self.frame, self.super_target) {
            (Frame::Method(name), Some(SuperTarget::Slot(Slot::Method(level)))) => {
                dispatch::invoke_method(instance, level, name, args)
            }
            (Frame::Getter(name), Some(SuperTarget::Slot(Slot::Property { get: Some(get), .. }))) => {
                dispatch::invoke_getter(instance, get.level, name)
            }
            (Frame::Setter(name), Some(SuperTarget::Slot(Slot::Property { set: Some(set), .. }))) => {
                let value = args.first().cloned().unwrap_or_default();
                dispatch::invoke_setter(instance, set.level, name, value)?;
                Ok(Value::Null)
            }
            (Frame::Ctor, Some(SuperTarget::Ctor(parent))) => {
                dispatch::construct_level(instance, parent, args)?;
                Ok(Value::Null)
            }
            (frame, _) => Err(AccessError::NoSuper {
                name: frame.name().to_string(),
            }
            .into()),
        }
    }

    /// The backing value of the property whose accessor is running.
    pub fn value(&self) -> Result<Value> {
        let name = self.property()?;
        Ok(dispatch::load(&self.scope.instance, self.scope.level, name))
    }

    /// Replace the backing value of the property whose accessor is running.
    pub fn set_value(&self, value: impl Into<Value>) -> Result<()> {
        let name = self.property()?;
        dispatch::store(&self.scope.instance, self.scope.level, name, value.into());
        Ok(())
    }

    fn property(&self) -> Result<&str, AccessError> {
        match &self.frame {
            Frame::Getter(name) | Frame::Setter(name) => Ok(name),
            _ => Err(AccessError::NoBackingValue),
        }
    }
}

impl Deref for This {
    type Target = Scope;

    fn deref(&self) -> &Scope {
        &self.scope
    }
}

impl fmt::Debug for This {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("This")
            .field("scope", &self.scope)
            .field("frame", &self.frame)
            .field("args", &self.args.len())
            .finish()
    }
}
