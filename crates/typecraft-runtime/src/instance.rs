//! Public interfaces.
//!
//! An [`Instance`] is the single externally visible face of a constructed
//! object. It reaches exactly the members whose declaring visibility is
//! public; protected and private members are absent, and properties whose
//! get or set accessor is not public cannot be read or written through it.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use typecraft_core::{AccessError, MemberKind, Result};

use crate::arena::{LevelId, ScopeArena, Slot};
use crate::builder::{PublicEntry, PublicTable};
use crate::{Handler, Template, Value, dispatch};

/// Public interface of a constructed object.
///
/// Cloning the handle is cheap and every clone refers to the same object.
#[derive(Clone)]
pub struct Instance(Rc<InstanceInner>);

struct InstanceInner {
    template: Template,
    leaf: LevelId,
    arena: RefCell<ScopeArena>,
    public: PublicTable,
}

impl Instance {
    pub(crate) fn new(
        template: Template,
        leaf: LevelId,
        arena: ScopeArena,
        public: PublicTable,
    ) -> Self {
        Self(Rc::new(InstanceInner {
            template,
            leaf,
            arena: RefCell::new(arena),
            public,
        }))
    }

    pub(crate) fn arena(&self) -> Ref<'_, ScopeArena> {
        self.0.arena.borrow()
    }

    pub(crate) fn arena_mut(&self) -> RefMut<'_, ScopeArena> {
        self.0.arena.borrow_mut()
    }

    pub(crate) fn leaf(&self) -> LevelId {
        self.0.leaf
    }

    /// The template this object was constructed from.
    pub fn template(&self) -> Template {
        self.0.template.clone()
    }

    /// Check if this object's template is `template` or derives from it.
    pub fn is_instance_of(&self, template: &Template) -> bool {
        self.0.template.is_a(template)
    }

    /// Check if a public member of that name exists.
    pub fn has_member(&self, name: &str) -> bool {
        self.0.public.get(name).is_some()
    }

    /// Public member names in exposure order.
    pub fn member_names(&self) -> Vec<String> {
        self.0.public.names().map(str::to_string).collect()
    }

    /// Call a public method.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        let (_, slot) = self.resolve(name, MemberKind::Method)?;
        dispatch::call_slot(self, slot, name, args)
    }

    /// Read a public property.
    pub fn get(&self, name: &str) -> Result<Value> {
        let (entry, slot) = self.resolve(name, MemberKind::Property)?;
        match slot {
            Slot::Property { get: Some(get), .. } if entry.readable => {
                dispatch::invoke_getter(self, get.level, name)
            }
            _ => Err(AccessError::WriteOnly {
                name: name.to_string(),
            }
            .into()),
        }
    }

    /// Write a public property.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let (entry, slot) = self.resolve(name, MemberKind::Property)?;
        match slot {
            Slot::Property { set: Some(set), .. } if entry.writable => {
                dispatch::invoke_setter(self, set.level, name, value.into())
            }
            _ => Err(AccessError::ReadOnly {
                name: name.to_string(),
            }
            .into()),
        }
    }

    /// Register a handler on a public event.
    pub fn on(&self, event: &str, handler: Handler) -> Result<()> {
        let holder = self.event(event)?;
        dispatch::add_handler(self, holder, event, handler);
        Ok(())
    }

    /// Remove a handler from a public event. Returns whether it was registered.
    pub fn off(&self, event: &str, handler: &Handler) -> Result<bool> {
        let holder = self.event(event)?;
        Ok(dispatch::remove_handler(self, holder, event, handler))
    }

    /// Check if both handles refer to the same object.
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn resolve(&self, name: &str, expected: MemberKind) -> Result<(PublicEntry, Slot), AccessError> {
        let unknown = || AccessError::UnknownMember {
            name: name.to_string(),
        };
        let entry = *self.0.public.get(name).ok_or_else(unknown)?;
        if entry.kind != expected {
            return Err(AccessError::WrongKind {
                name: name.to_string(),
                expected,
                found: entry.kind,
            });
        }
        let slot = self.arena().level(entry.level).slot(name).ok_or_else(unknown)?;
        Ok((entry, slot))
    }

    fn event(&self, name: &str) -> Result<LevelId, AccessError> {
        match self.resolve(name, MemberKind::Event)? {
            (_, Slot::Event(holder)) => Ok(holder),
            (_, other) => Err(AccessError::WrongKind {
                name: name.to_string(),
                expected: MemberKind::Event,
                found: other.kind(),
            }),
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("template", &self.0.template.display_name())
            .field("members", &self.member_names())
            .finish()
    }
}
