// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Filters: actions that decide which items exist.
//!
//! A filter opens a staleness cycle for the classes it manages, touches the
//! items it wants to keep, and (unless told to leave that to a separate
//! [`GarbageCollector`]) closes the cycle again:
//!
//! ```text
//!   begin_cycle ─▶ touch wanted items ─▶ relink ─▶ garbage_collect
//!   (all classes)   (dirty = 0, visible)            (optional)
//! ```
//!
//! Whatever a filter does not touch is hidden, and evicted once it stays
//! untouched for longer than its class's `max_dirty`.

mod fisheye;

pub use fisheye::{FisheyeConfig, FisheyeGraphFilter, FisheyeTreeFilter};

use std::collections::HashMap;

use crate::action::{Action, ActionError, Frame};
use crate::graph::{EdgeId, NodeId};
use crate::item::{ItemClass, ItemId};
use crate::registry::{GcStats, Registry};

/// Shows every node and edge of the graph.
#[derive(Clone, Debug)]
pub struct GraphFilter {
    node_class: ItemClass,
    edge_class: ItemClass,
    collect_garbage: bool,
}

impl Default for GraphFilter {
    fn default() -> Self {
        Self::new(ItemClass::NODE, ItemClass::EDGE)
    }
}

impl GraphFilter {
    /// Filters into the given node and edge classes.
    #[must_use]
    pub fn new(node_class: ItemClass, edge_class: ItemClass) -> Self {
        Self {
            node_class,
            edge_class,
            collect_garbage: true,
        }
    }

    /// Whether the filter closes its cycle itself (default `true`).
    #[must_use]
    pub fn with_garbage_collection(mut self, collect: bool) -> Self {
        self.collect_garbage = collect;
        self
    }
}

impl Action for GraphFilter {
    fn name(&self) -> &str {
        "graph-filter"
    }

    fn run(&mut self, registry: &mut Registry, _frame: &Frame<'_>) -> Result<(), ActionError> {
        let classes = [self.edge_class, self.node_class];
        begin_cycles(registry, &classes)?;
        let nodes: Vec<NodeId> = registry.graph().nodes().collect();
        for node in nodes {
            registry.node_item(self.node_class, node, true)?;
        }
        let edges: Vec<EdgeId> = registry.graph().edges().collect();
        for edge in edges {
            registry.edge_item(self.edge_class, edge, true)?;
        }
        registry.relink();
        if self.collect_garbage {
            collect(registry, &classes)?;
        }
        Ok(())
    }
}

/// Closes the staleness cycle of a set of classes.
///
/// Pair it with filters built without garbage collection, to run other
/// actions between touching and eviction.
#[derive(Clone, Debug)]
pub struct GarbageCollector {
    classes: Vec<ItemClass>,
}

impl Default for GarbageCollector {
    fn default() -> Self {
        Self::new([ItemClass::EDGE, ItemClass::NODE])
    }
}

impl GarbageCollector {
    /// Collects `classes`, in order.
    ///
    /// Edge classes should come before their endpoint classes, so edges are
    /// judged on their own staleness rather than evicted with their nodes.
    pub fn new(classes: impl IntoIterator<Item = ItemClass>) -> Self {
        Self {
            classes: classes.into_iter().collect(),
        }
    }
}

impl Action for GarbageCollector {
    fn name(&self) -> &str {
        "garbage-collector"
    }

    fn run(&mut self, registry: &mut Registry, _frame: &Frame<'_>) -> Result<(), ActionError> {
        collect(registry, &self.classes)?;
        Ok(())
    }
}

pub(crate) fn begin_cycles(registry: &mut Registry, classes: &[ItemClass]) -> Result<(), ActionError> {
    for &class in classes {
        registry.begin_cycle(class)?;
    }
    Ok(())
}

pub(crate) fn collect(
    registry: &mut Registry,
    classes: &[ItemClass],
) -> Result<GcStats, ActionError> {
    let mut total = GcStats::default();
    for &class in classes {
        let stats = registry.garbage_collect(class)?;
        total.evicted += stats.evicted;
        total.hidden += stats.hidden;
        total.retained += stats.retained;
    }
    Ok(total)
}

/// Touches the node items for `dois`, in order, and stores their DOI.
///
/// Node items of the class that are not in `dois` get their DOI reset.
pub(crate) fn materialize_nodes(
    registry: &mut Registry,
    class: ItemClass,
    order: &[NodeId],
    dois: &HashMap<NodeId, f64>,
) -> Result<HashMap<NodeId, ItemId>, ActionError> {
    registry.for_each_item_of_mut(class, |_, item| item.doi = f64::NEG_INFINITY)?;
    let mut items = HashMap::with_capacity(order.len());
    for &node in order {
        let Some(id) = registry.node_item(class, node, true)? else {
            continue;
        };
        if let Some(item) = registry.get_mut(id) {
            item.doi = dois.get(&node).copied().unwrap_or(f64::NEG_INFINITY);
        }
        items.insert(node, id);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::Attributes;
    use crate::graph::Entity;

    fn run(action: &mut dyn Action, r: &mut Registry) {
        let attrs = Attributes::new();
        action
            .run(
                r,
                &Frame {
                    fraction: 1.0,
                    attrs: &attrs,
                },
            )
            .unwrap();
    }

    #[test]
    fn graph_filter_shows_everything_and_links() {
        let mut r = Registry::with_default_classes();
        let a = r.graph_mut().add_node("a");
        let b = r.graph_mut().add_node("b");
        let c = r.graph_mut().add_node("c");
        r.graph_mut().add_child(a, b);
        r.graph_mut().add_edge(b, c, true);

        run(&mut GraphFilter::default(), &mut r);
        let stats = r.stats();
        assert_eq!(stats.class(ItemClass::NODE).unwrap().visible, 3);
        assert_eq!(stats.class(ItemClass::EDGE).unwrap().visible, 2);

        let ib = r.node_item(ItemClass::NODE, b, false).unwrap().unwrap();
        let ia = r.node_item(ItemClass::NODE, a, false).unwrap().unwrap();
        let node = r.get(ib).unwrap().node().unwrap();
        assert_eq!(node.parent(), Some(ia));
        assert_eq!(node.neighbors().len(), 2);
    }

    #[test]
    fn removed_entities_age_out() {
        let mut r = Registry::with_default_classes();
        let a = r.graph_mut().add_node("a");
        let b = r.graph_mut().add_node("b");
        let mut filter = GraphFilter::default();
        run(&mut filter, &mut r);
        let ib = r.node_item(ItemClass::NODE, b, false).unwrap().unwrap();

        r.graph_mut().remove_node(b);
        run(&mut filter, &mut r);
        assert!(!r.get(ib).unwrap().is_visible(), "hidden after one cycle");
        run(&mut filter, &mut r);
        assert!(!r.contains(ib), "evicted after two");
        assert!(
            r.get_item(ItemClass::NODE, Entity::Node(a), false)
                .unwrap()
                .is_some(),
            "live node stays"
        );
    }

    #[test]
    fn deferred_collection() {
        let mut r = Registry::with_default_classes();
        let a = r.graph_mut().add_node("a");
        let mut filter = GraphFilter::default().with_garbage_collection(false);
        let mut gc = GarbageCollector::default();
        run(&mut filter, &mut r);
        let ia = r.node_item(ItemClass::NODE, a, false).unwrap().unwrap();
        r.graph_mut().remove_node(a);

        run(&mut filter, &mut r);
        assert!(r.get(ia).unwrap().is_visible(), "not collected yet");
        run(&mut gc, &mut r);
        assert!(!r.get(ia).unwrap().is_visible(), "hidden by the collector");
    }
}
