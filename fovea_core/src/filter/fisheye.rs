// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Degree-of-interest (fisheye) filters.
//!
//! Both filters start from the nodes of a focus set, which get DOI 0, and
//! let interest decay by 1 per step of structural distance. A node is shown
//! when its integer DOI level (`doi.ceil()`) is at least
//! [`FisheyeConfig::min_doi`].
//!
//! The tree filter walks the tree view of the graph:
//!
//! ```text
//!             root  0          every ancestor of a focus gets 0 and
//!            /    \            its other subtrees are visited as
//!      -1.x  a     b  0        descendants;
//!                 / \
//!           -1.x c   f  0      the focus itself
//!                   / \
//!             -1.0 g   h -1.y  children get level - lateral penalty
//! ```
//!
//! Within a sibling list, the child on the path back to a focus (or the first
//! child) is the *center*; siblings further from it get a penalty of
//! `|i - center| / node_count`, which keeps every child on the same integer
//! level while ordering siblings deterministically.
//!
//! The graph filter does the same breadth-first over all neighbors.
//!
//! A node reached by several paths keeps the highest DOI, and a traversal
//! never re-enters a node whose DOI is already at least what it would
//! assign. Foci that are no longer in the graph are skipped.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::action::{Action, ActionError, Frame};
use crate::focus;
use crate::graph::{EdgeId, Entity, Graph, NodeId};
use crate::item::ItemClass;
use crate::registry::Registry;

use super::{begin_cycles, collect, materialize_nodes};

/// Fisheye filter settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FisheyeConfig {
    /// Lowest DOI level that is still shown. `-d` shows everything within
    /// distance `d` of a focus.
    ///
    /// The comparison is against the integer level `doi.ceil()`, not the raw
    /// DOI: the fractional sibling penalty never hides a node, so with
    /// `min_doi = -1` a child at DOI `-1.14` is shown and one at `-2.0` is
    /// not.
    pub min_doi: f64,
    /// Whether the tree root is always treated as a focus (tree filter only).
    pub include_root: bool,
    /// Whether the filter evicts stale items itself.
    pub collect_garbage: bool,
}

impl Default for FisheyeConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FisheyeConfig {
    /// Distance 1, root included, self-collecting.
    pub const DEFAULT: Self = Self {
        min_doi: -1.0,
        include_root: true,
        collect_garbage: true,
    };

    /// Shows nodes up to `distance` steps from a focus.
    #[must_use]
    pub fn with_distance(mut self, distance: u32) -> Self {
        self.min_doi = -f64::from(distance);
        self
    }

    /// Sets [`include_root`](Self::include_root).
    #[must_use]
    pub const fn with_root(mut self, include_root: bool) -> Self {
        self.include_root = include_root;
        self
    }

    /// Sets [`collect_garbage`](Self::collect_garbage).
    #[must_use]
    pub const fn with_garbage_collection(mut self, collect: bool) -> Self {
        self.collect_garbage = collect;
        self
    }

    fn admits(&self, level: f64) -> bool {
        level >= self.min_doi
    }
}

/// DOI values assigned during one pass, in first-visit order.
#[derive(Debug, Default)]
struct Interest {
    doi: HashMap<NodeId, f64>,
    order: Vec<NodeId>,
}

impl Interest {
    fn get(&self, node: NodeId) -> f64 {
        self.doi.get(&node).copied().unwrap_or(f64::NEG_INFINITY)
    }

    /// Raises the DOI of `node` to `value`. Returns `false` if it already
    /// had at least that much.
    fn raise(&mut self, node: NodeId, value: f64) -> bool {
        match self.doi.get_mut(&node) {
            Some(d) if *d >= value => false,
            Some(d) => {
                *d = value;
                true
            }
            None => {
                self.doi.insert(node, value);
                self.order.push(node);
                true
            }
        }
    }
}

fn live_foci(registry: &Registry, set: &str) -> Result<Vec<NodeId>, ActionError> {
    let graph = registry.graph();
    let foci = registry
        .focus_set(set)?
        .iter()
        .filter_map(|entity| match entity {
            Entity::Node(n) if graph.contains_node(n) => Some(n),
            other => {
                tracing::trace!(?other, "skipping focus");
                None
            }
        })
        .collect();
    Ok(foci)
}

fn lateral_penalty(distance: usize, node_count: usize) -> f64 {
    distance as f64 / node_count.max(1) as f64
}

/// Fisheye filter over the tree view of the graph.
#[derive(Clone, Debug)]
pub struct FisheyeTreeFilter {
    config: FisheyeConfig,
    node_class: ItemClass,
    edge_class: ItemClass,
    focus_set: String,
}

impl Default for FisheyeTreeFilter {
    fn default() -> Self {
        Self::new(FisheyeConfig::DEFAULT)
    }
}

impl FisheyeTreeFilter {
    /// Filters the default focus set into the built-in node and edge classes.
    #[must_use]
    pub fn new(config: FisheyeConfig) -> Self {
        Self {
            config,
            node_class: ItemClass::NODE,
            edge_class: ItemClass::EDGE,
            focus_set: focus::DEFAULT.to_owned(),
        }
    }

    /// Uses other node and edge classes.
    #[must_use]
    pub fn with_classes(mut self, node_class: ItemClass, edge_class: ItemClass) -> Self {
        self.node_class = node_class;
        self.edge_class = edge_class;
        self
    }

    /// Reads foci from another focus set.
    #[must_use]
    pub fn with_focus_set(mut self, name: impl Into<String>) -> Self {
        self.focus_set = name.into();
        self
    }

    /// The filter's settings.
    #[must_use]
    pub fn config(&self) -> &FisheyeConfig {
        &self.config
    }

    /// Computes DOI values without touching any items.
    fn traverse(&self, graph: &Graph, foci: &[NodeId]) -> (Interest, HashSet<NodeId>) {
        let mut interest = Interest::default();
        let mut expanded = HashSet::new();
        for &focus in foci {
            let mut node = focus;
            let mut from = None;
            // Walk up until we meet a path an earlier focus already opened.
            while interest.get(node) <= -1.0 {
                interest.raise(node, 0.0);
                self.visit_descendants(graph, node, from, &mut interest, &mut expanded);
                match graph.parent(node) {
                    Some(parent) => {
                        from = Some(node);
                        node = parent;
                    }
                    None => break,
                }
            }
        }
        (interest, expanded)
    }

    fn visit_descendants(
        &self,
        graph: &Graph,
        start: NodeId,
        skip: Option<NodeId>,
        interest: &mut Interest,
        expanded: &mut HashSet<NodeId>,
    ) {
        let node_count = graph.node_count();
        let mut stack = vec![(start, skip)];
        while let Some((parent, skip)) = stack.pop() {
            let level = interest.get(parent).ceil() - 1.0;
            if !self.config.admits(level) {
                continue;
            }
            let children: Vec<NodeId> = graph.children(parent).collect();
            if children.is_empty() {
                continue;
            }
            expanded.insert(parent);
            let center = skip
                .and_then(|s| children.iter().position(|&c| c == s))
                .unwrap_or(0);
            for (i, &child) in children.iter().enumerate() {
                if Some(child) == skip {
                    continue;
                }
                let value = level - lateral_penalty(i.abs_diff(center), node_count);
                if interest.raise(child, value) {
                    stack.push((child, None));
                }
            }
        }
    }
}

impl Action for FisheyeTreeFilter {
    fn name(&self) -> &str {
        "fisheye-tree-filter"
    }

    fn run(&mut self, registry: &mut Registry, _frame: &Frame<'_>) -> Result<(), ActionError> {
        let mut foci = live_foci(registry, &self.focus_set)?;
        if self.config.include_root
            && let Some(root) = registry.graph().root()
        {
            foci.push(root);
        }
        let (interest, expanded) = self.traverse(registry.graph(), &foci);

        let classes = [self.edge_class, self.node_class];
        begin_cycles(registry, &classes)?;
        materialize_nodes(registry, self.node_class, &interest.order, &interest.doi)?;

        let tree_edges: Vec<(EdgeId, f64)> = interest
            .order
            .iter()
            .filter_map(|&node| {
                let graph = registry.graph();
                let edge = graph.parent_edge(node)?;
                let parent = graph.parent(node)?;
                interest
                    .doi
                    .contains_key(&parent)
                    .then(|| (edge, interest.get(node)))
            })
            .collect();
        for (edge, doi) in tree_edges {
            if let Some(id) = registry.edge_item(self.edge_class, edge, true)?
                && let Some(item) = registry.get_mut(id)
            {
                item.doi = doi;
            }
        }

        registry.for_each_item_of_mut(self.node_class, |_, item| {
            let open = item
                .entity()
                .and_then(|e| match e {
                    Entity::Node(n) => Some(expanded.contains(&n)),
                    Entity::Edge(_) => None,
                })
                .unwrap_or(false);
            if let Some(node) = item.node_mut() {
                node.expanded = open;
            }
        })?;
        registry.relink();

        tracing::debug!(
            foci = foci.len(),
            visible = interest.order.len(),
            min_doi = self.config.min_doi,
            "fisheye tree filter"
        );
        if self.config.collect_garbage {
            collect(registry, &classes)?;
        }
        Ok(())
    }
}

/// Fisheye filter over the general graph, breadth-first over neighbors.
#[derive(Clone, Debug)]
pub struct FisheyeGraphFilter {
    config: FisheyeConfig,
    node_class: ItemClass,
    edge_class: ItemClass,
    focus_set: String,
}

impl Default for FisheyeGraphFilter {
    fn default() -> Self {
        Self::new(FisheyeConfig::DEFAULT)
    }
}

impl FisheyeGraphFilter {
    /// Filters the default focus set into the built-in node and edge classes.
    ///
    /// [`FisheyeConfig::include_root`] has no effect here.
    #[must_use]
    pub fn new(config: FisheyeConfig) -> Self {
        Self {
            config,
            node_class: ItemClass::NODE,
            edge_class: ItemClass::EDGE,
            focus_set: focus::DEFAULT.to_owned(),
        }
    }

    /// Uses other node and edge classes.
    #[must_use]
    pub fn with_classes(mut self, node_class: ItemClass, edge_class: ItemClass) -> Self {
        self.node_class = node_class;
        self.edge_class = edge_class;
        self
    }

    /// Reads foci from another focus set.
    #[must_use]
    pub fn with_focus_set(mut self, name: impl Into<String>) -> Self {
        self.focus_set = name.into();
        self
    }

    fn traverse(&self, graph: &Graph, foci: &[NodeId]) -> Interest {
        let mut interest = Interest::default();
        let mut queue = VecDeque::new();
        for &focus in foci {
            if interest.raise(focus, 0.0) {
                queue.push_back(focus);
            }
        }
        while let Some(node) = queue.pop_front() {
            let next = interest.get(node) - 1.0;
            if !self.config.admits(next) {
                continue;
            }
            for neighbor in graph.neighbors(node) {
                if interest.raise(neighbor, next) {
                    queue.push_back(neighbor);
                }
            }
        }
        interest
    }
}

impl Action for FisheyeGraphFilter {
    fn name(&self) -> &str {
        "fisheye-graph-filter"
    }

    fn run(&mut self, registry: &mut Registry, _frame: &Frame<'_>) -> Result<(), ActionError> {
        let foci = live_foci(registry, &self.focus_set)?;
        let interest = self.traverse(registry.graph(), &foci);

        let classes = [self.edge_class, self.node_class];
        begin_cycles(registry, &classes)?;
        materialize_nodes(registry, self.node_class, &interest.order, &interest.doi)?;

        let edges: Vec<(EdgeId, f64)> = {
            let graph = registry.graph();
            graph
                .edges()
                .filter_map(|edge| {
                    let (s, t) = graph.endpoints(edge);
                    let (ds, dt) = (interest.doi.get(&s)?, interest.doi.get(&t)?);
                    Some((edge, ds.min(*dt)))
                })
                .collect()
        };
        for (edge, doi) in edges {
            if let Some(id) = registry.edge_item(self.edge_class, edge, true)?
                && let Some(item) = registry.get_mut(id)
            {
                item.doi = doi;
            }
        }
        registry.relink();

        tracing::debug!(
            foci = foci.len(),
            visible = interest.order.len(),
            min_doi = self.config.min_doi,
            "fisheye graph filter"
        );
        if self.config.collect_garbage {
            collect(registry, &classes)?;
        }
        Ok(())
    }
}
