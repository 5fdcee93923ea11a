//! Build Pass (Pass 1) - allocate levels and install members.
//!
//! Levels are built root-first. For each level:
//!
//! 1. Each mixin chain is built (recursively) and its non-private members
//!    are proxied onto the level unless the level's own template declares
//!    them.
//! 2. Own members are installed, each slot pointing at this level. Bodies
//!    that call super capture the overridden slot now, before morph
//!    redirects anything.
//! 3. Non-private parent members the template does not redeclare are
//!    proxied down, replacing any mixin proxy of the same name.
//!
//! Constructors get no slot; they run through the construction chain.

use crate::arena::{AccessorSlot, LevelId, ScopeArena, Slot, SlotEntry};
use crate::member::{MemberDef, MemberDescriptor};
use crate::Template;

/// Output of the build pass.
#[derive(Debug)]
pub(crate) struct BuildOutput {
    /// Leaf level of the requested template.
    pub(crate) leaf: LevelId,
    /// Leaf level of every mixin chain built on the way.
    pub(crate) mixin_chains: Vec<LevelId>,
}

pub(crate) struct BuildPass<'a> {
    arena: &'a mut ScopeArena,
    mixin_chains: Vec<LevelId>,
}

impl<'a> BuildPass<'a> {
    pub(crate) fn new(arena: &'a mut ScopeArena) -> Self {
        Self {
            arena,
            mixin_chains: Vec::new(),
        }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(crate) fn run(mut self, template: &Template) -> BuildOutput {
        let leaf = self.build_level(template);
        BuildOutput {
            leaf,
            mixin_chains: self.mixin_chains,
        }
    }

    fn build_level(&mut self, template: &Template) -> LevelId {
        let parent = template.parent().map(|parent| self.build_level(&parent));
        let id = self.arena.alloc(template.clone(), parent);

        for mixin in template.mixins() {
            let mixin_leaf = self.build_level(&mixin);
            self.mixin_chains.push(mixin_leaf);
            self.arena.level_mut(id).mixins.push(mixin_leaf);
            self.proxy(mixin_leaf, id);
        }

        for member in template.descriptors() {
            self.install(id, parent, &member);
        }

        if let Some(parent) = parent {
            self.proxy(parent, id);
        }

        tracing::trace!(
            template = %template.display_name(),
            level = %id,
            slots = self.arena.level(id).slots.len(),
            "level built"
        );
        id
    }

    fn install(&mut self, id: LevelId, parent: Option<LevelId>, member: &MemberDescriptor) {
        let slot = match &member.def {
            MemberDef::Constructor(_) => return,
            MemberDef::Method(_) => Slot::Method(id),
            MemberDef::Event => {
                self.arena
                    .level_mut(id)
                    .handlers
                    .entry(member.name.clone())
                    .or_default();
                Slot::Event(id)
            }
            MemberDef::Property(property) => {
                self.arena
                    .level_mut(id)
                    .storage
                    .insert(member.name.clone(), property.initial.clone());
                let at = |visibility| AccessorSlot {
                    level: id,
                    visibility,
                };
                Slot::Property {
                    get: property.get.as_ref().map(|a| at(a.visibility)),
                    set: property.set.as_ref().map(|a| at(a.visibility)),
                }
            }
        };

        if member.calls_super()
            && let Some(overridden) = self.overridden(id, parent, &member.name)
        {
            self.arena
                .level_mut(id)
                .supers
                .insert(member.name.clone(), overridden);
        }

        self.arena.level_mut(id).slots.insert(
            member.name.clone(),
            SlotEntry {
                slot,
                visibility: member.visibility,
            },
        );
    }

    /// The implementation an own member replaces: the nearest ancestor's,
    /// else the first mixin's that provides one.
    ///
    /// A private redeclaration on an ancestor shadows the name on that level
    /// only, so the walk continues above it.
    fn overridden(&self, id: LevelId, parent: Option<LevelId>, name: &str) -> Option<Slot> {
        let from = |level: LevelId| {
            self.arena
                .level(level)
                .slots
                .get(name)
                .filter(|entry| !entry.visibility.is_private())
                .map(|entry| entry.slot.proxied())
        };

        let mut ancestor = parent;
        while let Some(level) = ancestor {
            if let Some(slot) = from(level) {
                return Some(slot);
            }
            ancestor = self.arena.level(level).parent;
        }
        self.arena.level(id).mixins.iter().find_map(|&m| from(m))
    }

    /// Copy `from`'s non-private slots onto `to` where `to` declares nothing.
    fn proxy(&mut self, from: LevelId, to: LevelId) {
        let entries: Vec<(String, SlotEntry)> = self
            .arena
            .level(from)
            .slots
            .iter()
            .filter(|(_, entry)| !entry.visibility.is_private())
            .map(|(name, entry)| (name.clone(), *entry))
            .collect();

        let target = self.arena.level_mut(to);
        for (name, entry) in entries {
            if target.template.declares(&name) {
                continue;
            }
            target.slots.insert(
                name,
                SlotEntry {
                    slot: entry.slot.proxied(),
                    visibility: entry.visibility,
                },
            );
        }
    }
}
