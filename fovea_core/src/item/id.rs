// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visual item identity types.

use core::fmt;

/// A handle to a visual item owned by a [`Registry`](crate::registry::Registry).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after the item is evicted and its slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl ItemId {
    /// A handle that never refers to a live item.
    pub const NONE: Self = Self {
        idx: u32::MAX,
        generation: u32::MAX,
    };

    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::NONE {
            return f.write_str("ItemId(none)");
        }
        write!(f, "ItemId({}@gen{})", self.idx, self.generation)
    }
}

/// A logical category of visual items.
///
/// Each class has its own pool free list, entity map, and garbage-collection
/// policy. The three built-in classes cover the common case; applications
/// may declare more (for instance a separate class for search highlights).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemClass(&'static str);

impl ItemClass {
    /// Items representing graph nodes.
    pub const NODE: Self = Self("node");
    /// Items representing graph edges.
    pub const EDGE: Self = Self("edge");
    /// Items representing groups of entities.
    pub const AGGREGATE: Self = Self("aggregate");

    /// Creates a user-defined class.
    #[inline]
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the class name.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Debug for ItemClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemClass({})", self.0)
    }
}

impl fmt::Display for ItemClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// The variant of item a class holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// One graph node.
    Node,
    /// One graph edge between two node items.
    Edge,
    /// Zero or more member entities shown as one item.
    Aggregate,
}
