// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visual item data model.
//!
//! A *visual item* is the drawable stand-in for one graph node, one graph
//! edge, or an aggregate of several entities. Each item has:
//!
//! - An identity ([`ItemId`]) — a generational handle that becomes stale when
//!   the registry evicts the item, so a recycled slot is never mistaken for
//!   the item that used to live there.
//! - A class ([`ItemClass`]) selecting pool, entity map, and GC policy.
//! - A per-kind payload ([`Kind`]): node links, edge endpoints, or aggregate
//!   orientation.
//! - Animatable visual attributes ([`Tween`]) for location, colors, size,
//!   and font.
//! - Lifecycle flags maintained by the registry's staleness cycle.

mod id;
mod value;
mod visual;

pub use id::{ItemClass, ItemId, ItemKind};
pub use value::{Font, Value};
pub use visual::{AggregateData, EdgeData, Kind, NodeData, Tween, VisualItem};
