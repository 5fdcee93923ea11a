//! Expose Pass (Pass 3) - project public members onto the public interface.
//!
//! Levels are visited root-first so a derived declaration replaces the entry
//! of the member it overrides while keeping the position where the name first
//! appeared. Entries name a level, not an implementation: every access goes
//! through that level's slot, which morph already pointed at the youngest
//! override.
//!
//! Mixin members become public when the composing template does not declare
//! them and the composing level still holds the mixin's slot. A parent member
//! of the same name has replaced that slot during the build pass, so the
//! inherited member wins.

use rustc_hash::FxHashMap;
use typecraft_core::{MemberKind, Visibility};

use crate::arena::{LevelId, ScopeArena};

/// One member of the public interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PublicEntry {
    /// Level whose slot answers for the member.
    pub(crate) level: LevelId,
    pub(crate) kind: MemberKind,
    /// Property has a public get accessor.
    pub(crate) readable: bool,
    /// Property has a public set accessor.
    pub(crate) writable: bool,
}

/// Ordered public member table of one instance.
#[derive(Debug, Default, Clone)]
pub(crate) struct PublicTable {
    entries: Vec<(String, PublicEntry)>,
    index: FxHashMap<String, usize>,
}

impl PublicTable {
    /// Insert or replace an entry, keeping the name's first position.
    pub(crate) fn insert(&mut self, name: String, entry: PublicEntry) {
        match self.index.get(&name) {
            Some(&i) => self.entries[i].1 = entry,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, entry));
            }
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&PublicEntry> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

pub(crate) struct ExposePass<'a> {
    arena: &'a ScopeArena,
}

impl<'a> ExposePass<'a> {
    pub(crate) fn new(arena: &'a ScopeArena) -> Self {
        Self { arena }
    }

    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(crate) fn run(self, leaf: LevelId) -> PublicTable {
        let mut table = PublicTable::default();
        self.expose(leaf, &mut table);
        table
    }

    fn expose(&self, id: LevelId, table: &mut PublicTable) {
        let level = self.arena.level(id);
        if let Some(parent) = level.parent {
            self.expose(parent, table);
        }

        for &mixin in &level.mixins {
            let mut mixin_table = PublicTable::default();
            self.expose(mixin, &mut mixin_table);
            let mixin_level = self.arena.level(mixin);
            for (name, entry) in mixin_table.entries {
                if level.template.declares(&name) {
                    continue;
                }
                let provided = mixin_level.slot(&name).map(|slot| slot.proxied());
                if provided.is_some() && level.slot(&name) == provided {
                    table.insert(name, PublicEntry { level: id, ..entry });
                }
            }
        }

        for member in level.template.descriptors() {
            if !member.visibility.is_public() || member.kind() == MemberKind::Constructor {
                continue;
            }
            let public = Some(Visibility::Public);
            table.insert(
                member.name.clone(),
                PublicEntry {
                    level: id,
                    kind: member.kind(),
                    readable: member.getter_visibility() == public,
                    writable: member.setter_visibility() == public,
                },
            );
        }
    }
}
