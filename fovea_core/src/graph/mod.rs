// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backing graph data model.
//!
//! The graph is what the visualization is *of*. Visual items in the
//! [`Registry`](crate::registry::Registry) point back at graph entities
//! ([`Entity`]), and filters walk the graph to decide which entities get
//! items at all.
//!
//! Each node and edge has:
//!
//! - An identity ([`NodeId`], [`EdgeId`]) — a generational handle that
//!   becomes stale when the entity is removed, so a focus that disappeared
//!   from the graph can be detected and skipped.
//! - Adjacency — general edges, optionally directed, queried without regard
//!   to direction by [`Graph::neighbors`].
//! - An optional tree view — parent, first-child, and sibling links created
//!   by [`Graph::add_child`], used by tree-shaped filters and layouts.

mod id;
mod store;
mod traverse;

pub use id::{EdgeId, Entity, NodeId};
pub use store::Graph;
pub use traverse::Children;
