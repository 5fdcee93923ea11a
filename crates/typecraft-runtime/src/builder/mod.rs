//! Scope Builder - turns a template into a live instance.
//!
//! Construction runs three passes over one fresh [`ScopeArena`], then the
//! constructor chain:
//!
//! - [`build`]: Pass 1 - one level per ancestor and mixin, own members
//!   installed, inherited members proxied down
//! - [`morph`]: Pass 2 - older generations' virtual slots redirected to the
//!   youngest override
//! - [`expose`]: Pass 3 - public members projected onto the public interface
//!
//! ## Architecture
//!
//! ```text
//! Template ──► check_constructible ──► seal
//!                                        │
//!              ┌─────────────────────────┘
//!              ▼
//!         BuildPass ──► MorphPass (each chain) ──► ExposePass
//!                                                      │
//!              Instance ◄── construct_level(leaf) ◄────┘
//! ```
//!
//! All state lives in the arena handed from pass to pass, so nested
//! construction (mixins, `spawn` from inside a constructor) never shares
//! anything with the construction that triggered it.

mod build;
mod expose;
mod morph;

pub(crate) use expose::{PublicEntry, PublicTable};

use typecraft_core::{CTOR, DefinitionError, Result};

use crate::arena::ScopeArena;
use crate::{Instance, Template, Value, dispatch};

use build::BuildPass;
use expose::ExposePass;
use morph::MorphPass;

/// Build, compose and construct a new instance of `template`.
#[cfg_attr(feature = "profiling", profiling::function)]
pub(crate) fn instantiate(template: &Template, args: &[Value]) -> Result<Instance> {
    check_constructible(template)?;
    template.seal();

    let mut arena = ScopeArena::default();
    let built = BuildPass::new(&mut arena).run(template);

    let mut redirected = 0;
    for &chain in built.mixin_chains.iter().chain(std::iter::once(&built.leaf)) {
        redirected += MorphPass::new(&mut arena).run(chain);
    }

    let public = ExposePass::new(&arena).run(built.leaf);
    tracing::debug!(
        template = %template.display_name(),
        levels = arena.len(),
        redirected,
        public = public.len(),
        "instance composed"
    );

    let instance = Instance::new(template.clone(), built.leaf, arena, public);
    dispatch::construct_level(&instance, built.leaf, args)?;
    Ok(instance)
}

/// Reject compositions whose constructors could never run.
///
/// A parent constructor with parameters cannot be invoked automatically, so
/// the derived constructor must call it. Checked for every ancestor and mixin
/// before anything is built.
pub(crate) fn check_constructible(template: &Template) -> Result<(), DefinitionError> {
    if let Some(parent) = template.parent() {
        let calls_super = template
            .with_member(CTOR, |ctor| ctor.calls_super())
            .unwrap_or(false);
        if !parent.dependencies().is_empty() && !calls_super {
            return Err(DefinitionError::ParentCtorNotCalled {
                template: template.display_name(),
            });
        }
        check_constructible(&parent)?;
    }
    for mixin in template.mixins() {
        check_constructible(&mixin)?;
    }
    Ok(())
}
