//! Member invocation against a built instance.
//!
//! Every function here takes the arena borrow only long enough to copy out a
//! body handle and the super target, then releases it before running user
//! code. Bodies are free to call back into the same instance.

use typecraft_core::{AccessError, CTOR, MemberKind, Result};

use crate::arena::{LevelId, Slot};
use crate::member::{GetterBody, MethodBody, SetterBody};
use crate::scope::{Frame, SuperTarget, This};
use crate::{Handler, Instance, Value};

/// Run the method `name` as implemented on `level`.
pub(crate) fn invoke_method(
    instance: &Instance,
    level: LevelId,
    name: &str,
    args: &[Value],
) -> Result<Value> {
    let (body, super_target): (Option<MethodBody>, _) = {
        let arena = instance.arena();
        let owner = arena.level(level);
        let body = owner
            .template
            .with_member(name, |member| member.method().map(|m| m.body.clone()))
            .flatten();
        let super_target = owner.supers.get(name).copied().map(SuperTarget::Slot);
        (body, super_target)
    };
    let body = body.ok_or_else(|| AccessError::UnknownMember {
        name: name.to_string(),
    })?;

    tracing::trace!(member = name, %level, "invoking method");
    let this = This::new(
        instance.clone(),
        level,
        Frame::Method(name.to_string()),
        super_target,
        args,
    );
    body(&this, args)
}

/// Read property `name` through the get accessor declared on `level`.
pub(crate) fn invoke_getter(instance: &Instance, level: LevelId, name: &str) -> Result<Value> {
    let (body, super_target, stored) = {
        let arena = instance.arena();
        let owner = arena.level(level);
        let body: Option<GetterBody> = owner
            .template
            .with_member(name, |member| {
                member
                    .property()
                    .and_then(|p| p.get.as_ref())
                    .and_then(|a| a.body.clone())
            })
            .flatten();
        let super_target = owner.supers.get(name).copied().map(SuperTarget::Slot);
        let stored = owner.storage.get(name).cloned().unwrap_or_default();
        (body, super_target, stored)
    };

    match body {
        None => Ok(stored),
        Some(body) => {
            let this = This::new(
                instance.clone(),
                level,
                Frame::Getter(name.to_string()),
                super_target,
                &[],
            );
            body(&this)
        }
    }
}

/// Write property `name` through the set accessor declared on `level`.
pub(crate) fn invoke_setter(
    instance: &Instance,
    level: LevelId,
    name: &str,
    value: Value,
) -> Result<()> {
    let (body, super_target) = {
        let arena = instance.arena();
        let owner = arena.level(level);
        let body: Option<SetterBody> = owner
            .template
            .with_member(name, |member| {
                member
                    .property()
                    .and_then(|p| p.set.as_ref())
                    .and_then(|a| a.body.clone())
            })
            .flatten();
        let super_target = owner.supers.get(name).copied().map(SuperTarget::Slot);
        (body, super_target)
    };

    match body {
        None => {
            store(instance, level, name, value);
            Ok(())
        }
        Some(body) => {
            let this = This::new(
                instance.clone(),
                level,
                Frame::Setter(name.to_string()),
                super_target,
                std::slice::from_ref(&value),
            );
            body(&this, value)
        }
    }
}

/// Replace the backing value of `name` on `level`.
pub(crate) fn store(instance: &Instance, level: LevelId, name: &str, value: Value) {
    instance
        .arena_mut()
        .level_mut(level)
        .storage
        .insert(name.to_string(), value);
}

/// Read the backing value of `name` on `level`.
pub(crate) fn load(instance: &Instance, level: LevelId, name: &str) -> Value {
    instance
        .arena()
        .level(level)
        .storage
        .get(name)
        .cloned()
        .unwrap_or_default()
}

/// Invoke whatever `slot` resolves to, as a method call.
pub(crate) fn call_slot(
    instance: &Instance,
    slot: Slot,
    name: &str,
    args: &[Value],
) -> Result<Value> {
    match slot {
        Slot::Method(level) => invoke_method(instance, level, name, args),
        other => Err(AccessError::WrongKind {
            name: name.to_string(),
            expected: MemberKind::Method,
            found: other.kind(),
        }
        .into()),
    }
}

/// Run the constructor chain of `level`.
///
/// Mixins are default-constructed first. A parent whose constructor takes no
/// parameters is constructed automatically; otherwise it is handed to the
/// body as its super target and runs when the body calls super.
pub(crate) fn construct_level(instance: &Instance, level: LevelId, args: &[Value]) -> Result<()> {
    let (template, parent, mixins) = {
        let mut arena = instance.arena_mut();
        let owner = arena.level_mut(level);
        if owner.constructed {
            return Err(AccessError::AlreadyConstructed {
                template: owner.template.display_name(),
            }
            .into());
        }
        owner.constructed = true;
        (owner.template.clone(), owner.parent, owner.mixins.clone())
    };

    for mixin in mixins {
        construct_level(instance, mixin, &[])?;
    }

    let mut super_target = None;
    if let Some(parent) = parent {
        let parent_template = instance.arena().level(parent).template.clone();
        if parent_template.dependencies().is_empty() {
            construct_level(instance, parent, &[])?;
        } else {
            super_target = Some(SuperTarget::Ctor(parent));
        }
    }

    let body: Option<MethodBody> = template
        .with_member(CTOR, |member| member.method().map(|m| m.body.clone()))
        .flatten();
    if let Some(body) = body {
        let this = This::new(instance.clone(), level, Frame::Ctor, super_target, args);
        body(&this, args)?;
    }

    tracing::trace!(template = %template.display_name(), %level, "level constructed");
    Ok(())
}

/// Invoke every handler of event `name` held on `level`, in registration order.
pub(crate) fn raise(instance: &Instance, level: LevelId, name: &str, args: &[Value]) -> Result<()> {
    let handlers = instance
        .arena()
        .level(level)
        .handlers
        .get(name)
        .cloned()
        .unwrap_or_default();
    tracing::trace!(event = name, handlers = handlers.len(), "raising event");
    for handler in &handlers {
        handler.call(instance, args)?;
    }
    Ok(())
}

pub(crate) fn add_handler(instance: &Instance, level: LevelId, name: &str, handler: Handler) {
    instance
        .arena_mut()
        .level_mut(level)
        .handlers
        .entry(name.to_string())
        .or_default()
        .push(handler);
}

/// Remove every registration of `handler`. Returns whether any was removed.
pub(crate) fn remove_handler(
    instance: &Instance,
    level: LevelId,
    name: &str,
    handler: &Handler,
) -> bool {
    let mut arena = instance.arena_mut();
    let Some(handlers) = arena.level_mut(level).handlers.get_mut(name) else {
        return false;
    };
    let before = handlers.len();
    handlers.retain(|registered| !registered.ptr_eq(handler));
    handlers.len() != before
}
