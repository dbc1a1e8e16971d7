// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Graph entity identity types.

use core::fmt;

/// Sentinel value indicating "no node" or "no edge" in index fields.
pub(crate) const INVALID: u32 = u32::MAX;

/// A handle to a node in a [`Graph`](super::Graph).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a node is removed and the slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl NodeId {
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

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}@gen{})", self.idx, self.generation)
    }
}

/// A handle to an edge in a [`Graph`](super::Graph).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl EdgeId {
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

impl fmt::Debug for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EdgeId({}@gen{})", self.idx, self.generation)
    }
}

/// A backing graph entity: the thing a visual item represents.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Entity {
    /// A graph node.
    Node(NodeId),
    /// A graph edge.
    Edge(EdgeId),
}

impl Entity {
    /// Returns the node handle, if this entity is a node.
    #[inline]
    #[must_use]
    pub const fn as_node(self) -> Option<NodeId> {
        match self {
            Self::Node(n) => Some(n),
            Self::Edge(_) => None,
        }
    }

    /// Returns the edge handle, if this entity is an edge.
    #[inline]
    #[must_use]
    pub const fn as_edge(self) -> Option<EdgeId> {
        match self {
            Self::Edge(e) => Some(e),
            Self::Node(_) => None,
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(n) => n.fmt(f),
            Self::Edge(e) => e.fmt(f),
        }
    }
}

impl From<NodeId> for Entity {
    fn from(n: NodeId) -> Self {
        Self::Node(n)
    }
}

impl From<EdgeId> for Entity {
    fn from(e: EdgeId) -> Self {
        Self::Edge(e)
    }
}
