//! Per-instance scope storage.
//!
//! Every inheritance level of an instance (and every level of each mixin
//! chain) is one [`Level`] in a [`ScopeArena`]. A level's member table maps a
//! bare name to a [`Slot`], an indirection cell naming the level whose
//! implementation currently answers for that member. Proxying copies a slot;
//! override propagation redirects it. Bodies are never cloned per level.

use std::fmt;

use rustc_hash::FxHashMap;
use typecraft_core::{MemberKind, Visibility};

use crate::{Handler, Template, Value};

/// Index of a level within one instance's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct LevelId(u32);

impl LevelId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level_{}", self.0)
    }
}

/// One accessor of a property slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AccessorSlot {
    /// Level whose accessor body and backing value are used.
    pub(crate) level: LevelId,
    pub(crate) visibility: Visibility,
}

/// Indirection cell for one member on one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Method(LevelId),
    Property {
        get: Option<AccessorSlot>,
        set: Option<AccessorSlot>,
    },
    Event(LevelId),
}

impl Slot {
    pub(crate) fn kind(&self) -> MemberKind {
        match self {
            Slot::Method(_) => MemberKind::Method,
            Slot::Property { .. } => MemberKind::Property,
            Slot::Event(_) => MemberKind::Event,
        }
    }

    /// Copy of this slot as seen from a derived level.
    ///
    /// Private accessors never travel past their declaring level.
    pub(crate) fn proxied(&self) -> Slot {
        match *self {
            Slot::Property { get, set } => Slot::Property {
                get: get.filter(|a| !a.visibility.is_private()),
                set: set.filter(|a| !a.visibility.is_private()),
            },
            other => other,
        }
    }

    /// Point this slot at `target`, the youngest override.
    ///
    /// Property accessors are redirected one by one; an accessor the override
    /// keeps private stays bound where it was.
    pub(crate) fn redirect(&mut self, target: &Slot) {
        match (self, target) {
            (Slot::Method(current), Slot::Method(youngest)) => *current = *youngest,
            (
                Slot::Property { get, set },
                Slot::Property {
                    get: young_get,
                    set: young_set,
                },
            ) => {
                if let Some(accessor) = young_get.filter(|a| !a.visibility.is_private()) {
                    *get = Some(accessor);
                }
                if let Some(accessor) = young_set.filter(|a| !a.visibility.is_private()) {
                    *set = Some(accessor);
                }
            }
            _ => {}
        }
    }
}

/// A slot together with the visibility it carries at its level.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SlotEntry {
    pub(crate) slot: Slot,
    pub(crate) visibility: Visibility,
}

/// Private state of one inheritance level.
pub(crate) struct Level {
    pub(crate) template: Template,
    pub(crate) parent: Option<LevelId>,
    pub(crate) slots: FxHashMap<String, SlotEntry>,
    /// Overridden implementations for bodies that call super, captured
    /// before override propagation.
    pub(crate) supers: FxHashMap<String, Slot>,
    /// Property backing values.
    pub(crate) storage: FxHashMap<String, Value>,
    /// Ad-hoc private state set from inside bodies.
    pub(crate) fields: FxHashMap<String, Value>,
    pub(crate) handlers: FxHashMap<String, Vec<Handler>>,
    /// Leaf level of each mixin chain, in inclusion order.
    pub(crate) mixins: Vec<LevelId>,
    pub(crate) constructed: bool,
}

impl Level {
    fn new(template: Template, parent: Option<LevelId>) -> Self {
        Self {
            template,
            parent,
            slots: FxHashMap::default(),
            supers: FxHashMap::default(),
            storage: FxHashMap::default(),
            fields: FxHashMap::default(),
            handlers: FxHashMap::default(),
            mixins: Vec::new(),
            constructed: false,
        }
    }

    pub(crate) fn slot(&self, name: &str) -> Option<Slot> {
        self.slots.get(name).map(|entry| entry.slot)
    }
}

/// All levels of one instance.
#[derive(Default)]
pub(crate) struct ScopeArena {
    levels: Vec<Level>,
}

impl ScopeArena {
    pub(crate) fn alloc(&mut self, template: Template, parent: Option<LevelId>) -> LevelId {
        let id = LevelId(self.levels.len() as u32);
        self.levels.push(Level::new(template, parent));
        id
    }

    #[inline]
    pub(crate) fn level(&self, id: LevelId) -> &Level {
        &self.levels[id.index()]
    }

    #[inline]
    pub(crate) fn level_mut(&mut self, id: LevelId) -> &mut Level {
        &mut self.levels[id.index()]
    }

    pub(crate) fn len(&self) -> usize {
        self.levels.len()
    }

    /// Levels from `leaf` up to its root, leaf first.
    pub(crate) fn chain(&self, leaf: LevelId) -> Vec<LevelId> {
        let mut chain = vec![leaf];
        let mut current = self.level(leaf).parent;
        while let Some(id) = current {
            chain.push(id);
            current = self.level(id).parent;
        }
        chain
    }

    /// Find the level built from `template`.
    ///
    /// The main chain is searched leaf to root before any mixin chain.
    pub(crate) fn find(&self, leaf: LevelId, template: &Template) -> Option<LevelId> {
        let chain = self.chain(leaf);
        if let Some(found) = chain
            .iter()
            .copied()
            .find(|&id| self.level(id).template.ptr_eq(template))
        {
            return Some(found);
        }
        chain
            .iter()
            .flat_map(|&id| self.level(id).mixins.iter().copied())
            .find_map(|mixin| self.find(mixin, template))
    }
}
