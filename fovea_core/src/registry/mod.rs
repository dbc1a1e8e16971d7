// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The item registry: owner of every visual item.
//!
//! The [`Registry`] owns the backing [`Graph`](crate::graph::Graph), an
//! [`ItemPool`](crate::pool::ItemPool), and, per declared item class, an
//! ordered item list and an entity → item map. It also hosts the focus sets
//! and the installed [`Renderer`](crate::render::Renderer).
//!
//! # Staleness cycle
//!
//! Items are kept alive by being *touched* (fetched with `create = true`)
//! by a filter. One cycle for a class looks like this:
//!
//! ```text
//!   begin_cycle(class)        dirty += 1, newly_visible = false
//!         │
//!         ▼
//!   filters touch items       dirty = 0, visible = true
//!         │
//!         ▼
//!   garbage_collect(class)    dirty > max_dirty → evict
//!                             dirty > 0         → hide
//! ```
//!
//! An item left untouched for `max_dirty + 1` consecutive cycles is evicted:
//! its entity mapping is removed, node items take their incident edge items
//! with them, and the storage goes back to the pool.
//!
//! # Ordering
//!
//! [`Registry::items`] yields every item across all classes in the order of
//! the installed [`ItemComparator`] (back to front for drawing). Each class
//! list is re-sorted lazily, only when it was mutated since the last ordered
//! iteration, and the class lists are merged on the fly.
//!
//! # Sharing
//!
//! Scheduler threads and the UI thread share one registry through a
//! [`RegistryHandle`]. Every read and write happens under its lock, and a
//! pipeline batch holds the lock for all of its actions.

mod handle;
mod iter;
mod store;

pub use handle::RegistryHandle;
pub use iter::{DefaultComparator, ItemComparator, ItemSnapshot, Items};
pub use store::Registry;

use crate::item::{ItemClass, ItemKind};

/// Declaration of an item class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemClassConfig {
    /// The class being declared.
    pub class: ItemClass,
    /// Variant of item the class holds.
    pub kind: ItemKind,
    /// Untouched cycles an item survives before eviction.
    pub max_dirty: u32,
    /// Maximum number of released items parked for reuse.
    pub pool_capacity: usize,
    /// For edge classes: the node class whose items are the endpoints.
    pub endpoints: ItemClass,
}

impl ItemClassConfig {
    /// Default `max_dirty`.
    pub const DEFAULT_MAX_DIRTY: u32 = 1;
    /// Default `pool_capacity`.
    pub const DEFAULT_POOL_CAPACITY: usize = 256;

    /// Declares a class with default GC and pool settings.
    #[must_use]
    pub const fn new(class: ItemClass, kind: ItemKind) -> Self {
        Self {
            class,
            kind,
            max_dirty: Self::DEFAULT_MAX_DIRTY,
            pool_capacity: Self::DEFAULT_POOL_CAPACITY,
            endpoints: ItemClass::NODE,
        }
    }

    /// The built-in node class.
    #[must_use]
    pub const fn node() -> Self {
        Self::new(ItemClass::NODE, ItemKind::Node)
    }

    /// The built-in edge class, with endpoints in the node class.
    #[must_use]
    pub const fn edge() -> Self {
        Self::new(ItemClass::EDGE, ItemKind::Edge)
    }

    /// The built-in aggregate class.
    #[must_use]
    pub const fn aggregate() -> Self {
        Self::new(ItemClass::AGGREGATE, ItemKind::Aggregate)
    }

    /// Sets the eviction threshold.
    #[must_use]
    pub const fn with_max_dirty(mut self, max_dirty: u32) -> Self {
        self.max_dirty = max_dirty;
        self
    }

    /// Sets the free-list bound.
    #[must_use]
    pub const fn with_pool_capacity(mut self, pool_capacity: usize) -> Self {
        self.pool_capacity = pool_capacity;
        self
    }

    /// Sets the endpoint node class of an edge class.
    #[must_use]
    pub const fn with_endpoints(mut self, endpoints: ItemClass) -> Self {
        self.endpoints = endpoints;
        self
    }
}

/// Outcome of [`Registry::garbage_collect`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GcStats {
    /// Items of the class that were evicted.
    pub evicted: usize,
    /// Survivors that were hidden because they were not touched.
    pub hidden: usize,
    /// Items of the class still resident.
    pub retained: usize,
}

/// Occupancy of one item class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassStats {
    /// The class.
    pub class: ItemClass,
    /// Variant of item the class holds.
    pub kind: ItemKind,
    /// Resident items.
    pub resident: usize,
    /// Resident items that are visible.
    pub visible: usize,
    /// Released items parked for reuse.
    pub parked: usize,
}

/// Occupancy of the whole registry, from [`Registry::stats`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Per-class figures in declaration order.
    pub classes: Vec<ClassStats>,
    /// Live items across all classes.
    pub live: usize,
    /// Pool slots ever allocated.
    pub slots: usize,
}

impl RegistryStats {
    /// Figures for one class.
    #[must_use]
    pub fn class(&self, class: ItemClass) -> Option<&ClassStats> {
        self.classes.iter().find(|c| c.class == class)
    }
}
