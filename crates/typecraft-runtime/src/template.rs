//! Templates - the definition-time representation of a type.
//!
//! A [`Template`] accumulates an ordered member table, at most one parent and
//! an ordered list of mixins. Every declaration is validated immediately, so
//! collisions and visibility violations surface at declaration time rather
//! than at first use.
//!
//! Templates seal themselves the first time an instance is built from them or
//! from any template derived from them. A sealed template rejects every
//! further change with [`DefinitionError::Sealed`].
//!
//! # Example
//!
//! ```
//! use typecraft_runtime::{Engine, Method, Value};
//!
//! let engine = Engine::new();
//! let car = engine
//!     .template()
//!     .member("$drive", Method::new(|_, _| Ok("vroom!".into())))
//!     .unwrap();
//! let autopia = engine
//!     .template()
//!     .extend(&car)
//!     .unwrap()
//!     .member(
//!         "$drive",
//!         Method::new(|this, _| {
//!             let base = this.call_super(&[])?;
//!             Ok(format!("I like to go {}", base.as_str()?).into())
//!         })
//!         .calls_super(),
//!     )
//!     .unwrap();
//!
//! let instance = autopia.construct(&[]).unwrap();
//! assert_eq!(
//!     instance.call("drive", &[]).unwrap(),
//!     Value::from("I like to go vroom!")
//! );
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use rustc_hash::{FxHashMap, FxHashSet};
use typecraft_core::{
    AccessorKind, DefinitionError, EngineToken, MemberFlags, MemberKind, MemberName, Result,
    TemplateId, Visibility,
};

use crate::engine::EngineInner;
use crate::member::{
    AccessorBody, AccessorDef, MemberDef, MemberDescriptor, MemberSpec, MethodDef, Property,
    PropertyDef,
};
use crate::{Engine, Instance, Value, builder};

/// Marker for a constructor parameter list that starts with the parent's.
const INHERIT_PARAMS: &str = "...";

/// Handle to a declared type.
///
/// Cloning the handle is cheap and every clone refers to the same template.
#[derive(Clone)]
pub struct Template(Rc<TemplateInner>);

struct TemplateInner {
    id: TemplateId,
    token: EngineToken,
    name: Option<String>,
    engine: Weak<EngineInner>,
    state: RefCell<TemplateState>,
}

#[derive(Default)]
struct TemplateState {
    members: Vec<MemberDescriptor>,
    index: FxHashMap<String, usize>,
    parent: Option<Template>,
    mixins: Vec<Template>,
    sealed: bool,
}

impl Template {
    pub(crate) fn new(
        id: TemplateId,
        token: EngineToken,
        name: Option<String>,
        engine: Weak<EngineInner>,
    ) -> Self {
        Self(Rc::new(TemplateInner {
            id,
            token,
            name,
            engine,
            state: RefCell::new(TemplateState::default()),
        }))
    }

    // ==========================================================================
    // Declaration
    // ==========================================================================

    /// Set the base template.
    ///
    /// The hierarchy must be fixed before any member is declared, because
    /// collision checks run against the ancestors at declaration time.
    pub fn extend(self, base: &Template) -> Result<Self, DefinitionError> {
        self.ensure_open()?;
        if !self.0.state.borrow().members.is_empty() {
            return Err(DefinitionError::BaseAfterMembers {
                template: self.display_name(),
            });
        }
        if base.0.token != self.0.token {
            return Err(DefinitionError::ForeignTemplate { role: "base type" });
        }

        if base.composes(&self) {
            return Err(DefinitionError::CircularInheritance {
                template: self.display_name(),
                from_self: base.ptr_eq(&self),
            });
        }

        tracing::debug!(
            template = %self.display_name(),
            base = %base.display_name(),
            "template extended"
        );
        self.0.state.borrow_mut().parent = Some(base.clone());
        Ok(self)
    }

    /// Set the base template by its registered name.
    pub fn extend_named(self, name: &str) -> Result<Self, DefinitionError> {
        let base = self.engine(name)?.named(name);
        self.extend(&base)
    }

    /// Declare members in order.
    pub fn def<I, K, M>(self, members: I) -> Result<Self, DefinitionError>
    where
        I: IntoIterator<Item = (K, M)>,
        K: AsRef<str>,
        M: Into<MemberSpec>,
    {
        for (name, spec) in members {
            self.declare(name.as_ref(), spec.into())?;
        }
        Ok(self)
    }

    /// Declare a single member.
    pub fn member(self, name: &str, spec: impl Into<MemberSpec>) -> Result<Self, DefinitionError> {
        self.declare(name, spec.into())?;
        Ok(self)
    }

    /// Declare events in order.
    pub fn events<I, K>(self, names: I) -> Result<Self, DefinitionError>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for raw in names {
            self.ensure_open()?;
            let parsed = parse_name(raw.as_ref())?;
            if parsed.is_ctor() {
                return Err(DefinitionError::ReservedCtorName {
                    kind: MemberKind::Event,
                });
            }
            self.validate(&parsed, MemberKind::Event)?;
            if parsed.is_virtual() {
                return Err(DefinitionError::VirtualEvent { name: parsed.name });
            }
            self.install(MemberDescriptor {
                name: parsed.name,
                visibility: parsed.visibility,
                flags: MemberFlags::empty(),
                def: MemberDef::Event,
            });
        }
        Ok(self)
    }

    /// Mix other templates in.
    ///
    /// Mixins are default-constructed during composition, so they may not
    /// declare constructor parameters.
    pub fn include<'a, I>(self, mixins: I) -> Result<Self, DefinitionError>
    where
        I: IntoIterator<Item = &'a Template>,
    {
        for mixin in mixins {
            self.ensure_open()?;
            if mixin.0.token != self.0.token {
                return Err(DefinitionError::ForeignTemplate { role: "mixin" });
            }
            if mixin.ptr_eq(&self) {
                return Err(DefinitionError::IncludeSelf {
                    template: self.display_name(),
                });
            }
            if !mixin.dependencies().is_empty() {
                return Err(DefinitionError::MixinWithDependencies {
                    mixin: mixin.display_name(),
                });
            }
            if mixin.composes(&self) {
                return Err(DefinitionError::CircularMixin {
                    template: self.display_name(),
                    mixin: mixin.display_name(),
                });
            }

            tracing::debug!(
                template = %self.display_name(),
                mixin = %mixin.display_name(),
                "mixin included"
            );
            self.0.state.borrow_mut().mixins.push(mixin.clone());
        }
        Ok(self)
    }

    /// Mix in templates by their registered names.
    pub fn include_named<I, K>(self, names: I) -> Result<Self, DefinitionError>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut mixins = Vec::new();
        for name in names {
            let name = name.as_ref();
            mixins.push(self.engine(name)?.named(name));
        }
        self.include(&mixins)
    }

    // ==========================================================================
    // Construction
    // ==========================================================================

    /// Build a new instance and run its constructor with `args`.
    pub fn construct(&self, args: &[Value]) -> Result<Instance> {
        builder::instantiate(self, args)
    }

    // ==========================================================================
    // Introspection
    // ==========================================================================

    pub fn id(&self) -> TemplateId {
        self.0.id
    }

    /// Registered name, if the template was created through [`Engine::named`].
    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    /// Name for messages: the registered name or the template id.
    pub fn display_name(&self) -> String {
        match &self.0.name {
            Some(name) => name.clone(),
            None => self.0.id.to_string(),
        }
    }

    pub fn parent(&self) -> Option<Template> {
        self.0.state.borrow().parent.clone()
    }

    pub fn mixins(&self) -> Vec<Template> {
        self.0.state.borrow().mixins.clone()
    }

    pub fn is_sealed(&self) -> bool {
        self.0.state.borrow().sealed
    }

    /// Look up a member declared on this template itself.
    pub fn descriptor(&self, name: &str) -> Option<MemberDescriptor> {
        let state = self.0.state.borrow();
        state.index.get(name).map(|&i| state.members[i].clone())
    }

    /// Check if this template itself declares `name`.
    pub fn declares(&self, name: &str) -> bool {
        self.0.state.borrow().index.contains_key(name)
    }

    /// Own member names in declaration order.
    pub fn member_names(&self) -> Vec<String> {
        self.0
            .state
            .borrow()
            .members
            .iter()
            .map(|m| m.name.clone())
            .collect()
    }

    /// The constructor's declared parameter list, with `...` expanded.
    pub fn dependencies(&self) -> Vec<String> {
        self.descriptor(typecraft_core::CTOR)
            .map(|ctor| ctor.params().to_vec())
            .unwrap_or_default()
    }

    /// Check if this template is `other` or derives from it.
    pub fn is_a(&self, other: &Template) -> bool {
        let mut current = Some(self.clone());
        while let Some(template) = current {
            if template.ptr_eq(other) {
                return true;
            }
            current = template.parent();
        }
        false
    }

    /// Check if both handles refer to the same template.
    pub fn ptr_eq(&self, other: &Template) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn engine_token(&self) -> EngineToken {
        self.0.token
    }

    pub(crate) fn descriptors(&self) -> Vec<MemberDescriptor> {
        self.0.state.borrow().members.clone()
    }

    /// Run `f` against an own member without cloning it.
    pub(crate) fn with_member<R>(
        &self,
        name: &str,
        f: impl FnOnce(&MemberDescriptor) -> R,
    ) -> Option<R> {
        let state = self.0.state.borrow();
        state.index.get(name).map(|&i| f(&state.members[i]))
    }

    /// Visibility of an own member.
    pub(crate) fn declared_visibility(&self, name: &str) -> Option<Visibility> {
        self.with_member(name, |member| member.visibility)
    }

    /// Freeze this template, its ancestors and its mixins.
    pub(crate) fn seal(&self) {
        {
            let mut state = self.0.state.borrow_mut();
            if state.sealed {
                return;
            }
            state.sealed = true;
        }
        tracing::trace!(template = %self.display_name(), "template sealed");
        if let Some(parent) = self.parent() {
            parent.seal();
        }
        for mixin in self.mixins() {
            mixin.seal();
        }
    }

    // ==========================================================================
    // Validation
    // ==========================================================================

    fn engine(&self, wanted: &str) -> Result<Engine, DefinitionError> {
        self.0.engine.upgrade().map(Engine::from_inner).ok_or_else(|| {
            tracing::warn!(name = wanted, "engine dropped before named lookup");
            DefinitionError::ForeignTemplate { role: "named type" }
        })
    }

    fn ensure_open(&self) -> Result<(), DefinitionError> {
        if self.is_sealed() {
            return Err(DefinitionError::Sealed {
                template: self.display_name(),
            });
        }
        Ok(())
    }

    /// Check if `target` is this template or appears anywhere in its
    /// composition graph, following parents and mixins transitively.
    fn composes(&self, target: &Template) -> bool {
        let mut visited = FxHashSet::default();
        let mut pending = vec![self.clone()];
        while let Some(current) = pending.pop() {
            if current.ptr_eq(target) {
                return true;
            }
            if !visited.insert(current.id()) {
                continue;
            }
            let state = current.0.state.borrow();
            pending.extend(state.parent.iter().cloned());
            pending.extend(state.mixins.iter().cloned());
        }
        false
    }

    /// Nearest non-private ancestor declaration of `name`.
    fn inherited(&self, name: &str) -> Option<MemberDescriptor> {
        let mut ancestor = self.parent();
        while let Some(template) = ancestor {
            if let Some(found) = template.descriptor(name)
                && !found.visibility.is_private()
            {
                return Some(found);
            }
            ancestor = template.parent();
        }
        None
    }

    /// Check if `name` is taken by this template or by a sealed-off ancestor member.
    ///
    /// Inherited members only block the name when they are neither private
    /// (not inherited at all) nor virtual (meant to be overridden).
    fn is_used(&self, name: &str) -> bool {
        if self.declares(name) {
            return true;
        }
        let mut ancestor = self.parent();
        while let Some(template) = ancestor {
            if let Some(found) = template.descriptor(name)
                && !found.visibility.is_private()
                && !found.is_virtual()
            {
                return true;
            }
            ancestor = template.parent();
        }
        false
    }

    fn validate(&self, parsed: &MemberName, kind: MemberKind) -> Result<(), DefinitionError> {
        if self.is_used(&parsed.name) {
            return Err(DefinitionError::DuplicateMember {
                name: parsed.name.clone(),
            });
        }
        if parsed.visibility.is_private() {
            return Ok(());
        }
        if let Some(inherited) = self.inherited(&parsed.name) {
            if inherited.visibility != parsed.visibility {
                return Err(DefinitionError::VisibilityChange {
                    name: parsed.name.clone(),
                    from: inherited.visibility,
                    to: parsed.visibility,
                });
            }
            if inherited.kind() != kind {
                return Err(DefinitionError::KindChange {
                    name: parsed.name.clone(),
                    from: inherited.kind(),
                    to: kind,
                });
            }
        }
        Ok(())
    }

    fn declare(&self, raw: &str, spec: MemberSpec) -> Result<(), DefinitionError> {
        self.ensure_open()?;
        let parsed = parse_name(raw)?;

        if parsed.is_ctor() {
            let MemberSpec::Method(method) = spec else {
                return Err(DefinitionError::ReservedCtorName {
                    kind: MemberKind::Property,
                });
            };
            self.validate(&parsed, MemberKind::Constructor)?;
            let params = self.expand_params(method.params)?;
            let flags = super_flag(method.calls_super);
            self.install(MemberDescriptor {
                name: parsed.name,
                visibility: parsed.visibility,
                flags,
                def: MemberDef::Constructor(MethodDef {
                    body: method.body,
                    params,
                }),
            });
            return Ok(());
        }

        let descriptor = match spec {
            MemberSpec::Method(method) => {
                self.validate(&parsed, MemberKind::Method)?;
                MemberDescriptor {
                    flags: parsed.flags | super_flag(method.calls_super),
                    visibility: parsed.visibility,
                    def: MemberDef::Method(MethodDef {
                        body: method.body,
                        params: method.params,
                    }),
                    name: parsed.name,
                }
            }
            MemberSpec::Property(property) => {
                self.validate(&parsed, MemberKind::Property)?;
                self.classify_property(parsed, property)?
            }
            MemberSpec::Value(value) => {
                self.validate(&parsed, MemberKind::Property)?;
                self.classify_property(parsed, Property::new().value(value))?
            }
        };
        self.install(descriptor);
        Ok(())
    }

    fn expand_params(&self, params: Vec<String>) -> Result<Vec<String>, DefinitionError> {
        if params.first().map(String::as_str) != Some(INHERIT_PARAMS) {
            return Ok(params);
        }
        let inherited = self
            .parent()
            .map(|parent| parent.dependencies())
            .unwrap_or_default();
        if inherited.is_empty() {
            return Err(DefinitionError::NoInheritedDependencies);
        }
        Ok(inherited.into_iter().chain(params.into_iter().skip(1)).collect())
    }

    fn classify_property(
        &self,
        parsed: MemberName,
        property: Property,
    ) -> Result<MemberDescriptor, DefinitionError> {
        let name = parsed.name;
        let visibility = parsed.visibility;
        let inherited = self.inherited(&name);

        let mut get: Option<AccessorDef<_>> = None;
        let mut set: Option<AccessorDef<_>> = None;
        for (key, accessor) in property.accessors {
            let key = MemberName::parse_accessor(&key, visibility);
            let kind = match key.name.as_str() {
                "get" => AccessorKind::Get,
                "set" => AccessorKind::Set,
                other => {
                    tracing::trace!(property = %name, key = other, "ignoring unknown accessor key");
                    continue;
                }
            };
            if key.is_virtual() {
                return Err(DefinitionError::VirtualAccessor { name });
            }
            if key.visibility.is_wider_than(visibility) {
                return Err(DefinitionError::AccessorWiderThanProperty {
                    name,
                    accessor: kind,
                });
            }
            let inherited_visibility = inherited.as_ref().and_then(|found| match kind {
                AccessorKind::Get => found.getter_visibility(),
                AccessorKind::Set => found.setter_visibility(),
            });
            if let Some(from) = inherited_visibility
                && from != key.visibility
            {
                return Err(DefinitionError::AccessorVisibilityChange {
                    name,
                    accessor: kind,
                    from,
                    to: key.visibility,
                });
            }

            match (kind, accessor.body) {
                (AccessorKind::Get, AccessorBody::Auto) => {
                    get = Some(accessor_def(key.visibility, None, accessor.calls_super));
                }
                (AccessorKind::Get, AccessorBody::Get(body)) => {
                    get = Some(accessor_def(key.visibility, Some(body), accessor.calls_super));
                }
                (AccessorKind::Set, AccessorBody::Auto) => {
                    set = Some(accessor_def(key.visibility, None, accessor.calls_super));
                }
                (AccessorKind::Set, AccessorBody::Set(body)) => {
                    set = Some(accessor_def(key.visibility, Some(body), accessor.calls_super));
                }
                (accessor, _) => {
                    return Err(DefinitionError::AccessorBodyMismatch { name, accessor });
                }
            }
        }

        if let (Some(g), Some(s)) = (&get, &set)
            && g.visibility != visibility
            && s.visibility != visibility
        {
            return Err(DefinitionError::BothAccessorsModified { name });
        }

        if get.is_none() && set.is_none() {
            get = Some(accessor_def(visibility, None, false));
            set = Some(accessor_def(visibility, None, false));
        }

        if let Some(found) = &inherited
            && (found.getter_visibility().is_some() != get.is_some()
                || found.setter_visibility().is_some() != set.is_some())
        {
            return Err(DefinitionError::ReadWriteChange { name });
        }

        Ok(MemberDescriptor {
            name,
            visibility,
            flags: parsed.flags,
            def: MemberDef::Property(PropertyDef {
                get,
                set,
                initial: property.value.unwrap_or(Value::Null),
            }),
        })
    }

    fn install(&self, descriptor: MemberDescriptor) {
        tracing::trace!(
            template = %self.display_name(),
            member = %descriptor.name,
            kind = %descriptor.kind(),
            visibility = %descriptor.visibility,
            "member declared"
        );
        let mut state = self.0.state.borrow_mut();
        let index = state.members.len();
        state.index.insert(descriptor.name.clone(), index);
        state.members.push(descriptor);
    }
}

fn parse_name(raw: &str) -> Result<MemberName, DefinitionError> {
    let parsed = MemberName::parse(raw);
    if parsed.name.is_empty() {
        return Err(DefinitionError::EmptyName {
            raw: raw.to_string(),
        });
    }
    Ok(parsed)
}

fn super_flag(calls_super: bool) -> MemberFlags {
    if calls_super {
        MemberFlags::CALLS_SUPER
    } else {
        MemberFlags::empty()
    }
}

fn accessor_def<B>(visibility: Visibility, body: Option<B>, calls_super: bool) -> AccessorDef<B> {
    AccessorDef {
        visibility,
        body,
        calls_super,
    }
}

impl PartialEq for Template {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0.state.borrow();
        f.debug_struct("Template")
            .field("name", &self.display_name())
            .field(
                "parent",
                &state.parent.as_ref().map(Template::display_name),
            )
            .field("members", &state.members)
            .field("mixins", &state.mixins.len())
            .field("sealed", &state.sealed)
            .finish()
    }
}
