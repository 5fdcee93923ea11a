//! Morph Pass (Pass 2) - virtual override propagation.
//!
//! Each level of a chain is a physically separate scope, so a body running on
//! an old level reaches members through that level's own slots. For every
//! virtual member declared above the leaf, this pass finds the youngest
//! generation that declares the member non-privately and redirects the slot
//! of every older generation to it. A body on the root calling a virtual
//! method then reaches the most-derived override.
//!
//! The generation holding the youngest override (the leaf included) already
//! resolves to itself and is left alone. Generations that redeclare the name
//! privately shadow it and are skipped, as are generations without a slot.

use rustc_hash::FxHashSet;

use crate::arena::{LevelId, ScopeArena};

pub(crate) struct MorphPass<'a> {
    arena: &'a mut ScopeArena,
}

impl<'a> MorphPass<'a> {
    pub(crate) fn new(arena: &'a mut ScopeArena) -> Self {
        Self { arena }
    }

    /// Propagate overrides along the chain ending at `leaf`.
    ///
    /// Returns the number of slots redirected.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(crate) fn run(mut self, leaf: LevelId) -> usize {
        let chain = self.arena.chain(leaf);

        let mut seen = FxHashSet::default();
        let mut virtuals = Vec::new();
        for &id in chain.iter().skip(1) {
            for member in self.arena.level(id).template.descriptors() {
                if member.is_virtual() && seen.insert(member.name.clone()) {
                    virtuals.push(member.name);
                }
            }
        }

        let mut redirected = 0;
        for name in &virtuals {
            redirected += self.propagate(&chain, name);
        }
        redirected
    }

    fn propagate(&mut self, chain: &[LevelId], name: &str) -> usize {
        let declares_open = |id: LevelId| {
            self.arena
                .level(id)
                .template
                .declared_visibility(name)
                .is_some_and(|visibility| !visibility.is_private())
        };
        let Some(youngest) = chain.iter().position(|&id| declares_open(id)) else {
            return 0;
        };
        let Some(target) = self.arena.level(chain[youngest]).slot(name) else {
            return 0;
        };

        let mut redirected = 0;
        for &id in &chain[youngest + 1..] {
            let level = self.arena.level_mut(id);
            if level
                .template
                .declared_visibility(name)
                .is_some_and(|visibility| visibility.is_private())
            {
                continue;
            }
            if let Some(entry) = level.slots.get_mut(name) {
                entry.slot.redirect(&target);
                redirected += 1;
            }
        }

        tracing::trace!(
            member = name,
            youngest = %chain[youngest],
            redirected,
            "override propagated"
        );
        redirected
    }
}
