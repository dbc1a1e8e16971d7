// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays graph storage with allocation, topology, and tree links.

use super::id::{EdgeId, Entity, INVALID, NodeId};
use crate::error::StateError;
use super::traverse::Children;

/// Struct-of-arrays storage for the backing graph.
///
/// Nodes and edges are addressed by generational handles. Removed slots are
/// recycled via free lists, and generation counters prevent stale handle
/// access.
///
/// Besides general (possibly directed) edges, the graph carries an optional
/// *tree view*: [`add_child`](Self::add_child) creates a tree edge and links
/// the child into the parent's ordered child list. Tree queries
/// ([`parent`](Self::parent), [`children`](Self::children),
/// [`root`](Self::root)) only see tree edges.
#[derive(Debug, Default)]
pub struct Graph {
    // -- Nodes --
    pub(crate) label: Vec<String>,
    pub(crate) incident: Vec<Vec<u32>>,
    pub(crate) node_generation: Vec<u32>,
    pub(crate) node_alive: Vec<bool>,
    pub(crate) node_free: Vec<u32>,
    pub(crate) node_slots: u32,
    pub(crate) node_count: usize,

    // -- Tree links --
    pub(crate) parent: Vec<u32>,
    pub(crate) parent_edge: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,
    pub(crate) root: Option<NodeId>,

    // -- Edges --
    pub(crate) source: Vec<u32>,
    pub(crate) target: Vec<u32>,
    pub(crate) directed: Vec<bool>,
    pub(crate) tree_edge: Vec<bool>,
    pub(crate) edge_generation: Vec<u32>,
    pub(crate) edge_alive: Vec<bool>,
    pub(crate) edge_free: Vec<u32>,
    pub(crate) edge_slots: u32,
    pub(crate) edge_count: usize,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Node allocation --

    /// Adds a node with the given label and returns its handle.
    pub fn add_node(&mut self, label: impl Into<String>) -> NodeId {
        let label = label.into();
        let idx = if let Some(idx) = self.node_free.pop() {
            let i = idx as usize;
            self.label[i] = label;
            self.incident[i].clear();
            self.node_alive[i] = true;
            self.parent[i] = INVALID;
            self.parent_edge[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            idx
        } else {
            let idx = self.node_slots;
            self.node_slots += 1;
            self.label.push(label);
            self.incident.push(Vec::new());
            self.node_generation.push(0);
            self.node_alive.push(true);
            self.parent.push(INVALID);
            self.parent_edge.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            idx
        };
        self.node_count += 1;
        self.node_handle(idx)
    }

    /// Removes a node together with its incident edges.
    ///
    /// Tree children of the node become roots of their own subtrees.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn remove_node(&mut self, id: NodeId) {
        self.validate_node(id);
        let idx = id.idx;

        let incident = core::mem::take(&mut self.incident[idx as usize]);
        for e in incident {
            if self.edge_alive[e as usize] {
                self.remove_edge(self.edge_handle(e));
            }
        }

        self.node_alive[idx as usize] = false;
        self.node_generation[idx as usize] += 1;
        self.node_free.push(idx);
        self.node_count -= 1;
        if self.root == Some(id) {
            self.root = None;
        }
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn contains_node(&self, id: NodeId) -> bool {
        (id.idx as usize) < self.node_alive.len()
            && self.node_alive[id.idx as usize]
            && self.node_generation[id.idx as usize] == id.generation
    }

    /// Returns whether the given handle refers to a live edge.
    #[must_use]
    pub fn contains_edge(&self, id: EdgeId) -> bool {
        (id.idx as usize) < self.edge_alive.len()
            && self.edge_alive[id.idx as usize]
            && self.edge_generation[id.idx as usize] == id.generation
    }

    /// Returns whether the entity is live in this graph.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        match entity {
            Entity::Node(n) => self.contains_node(n),
            Entity::Edge(e) => self.contains_edge(e),
        }
    }

    // -- Edge allocation --

    /// Adds a general edge between two nodes.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId, directed: bool) -> EdgeId {
        self.validate_node(a);
        self.validate_node(b);
        self.alloc_edge(a.idx, b.idx, directed, false)
    }

    /// Adds `child` as the last tree child of `parent`, creating a directed
    /// tree edge from parent to child.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if `child` already has a parent, or
    /// if the link would close a cycle. See
    /// [`try_add_child`](Self::try_add_child) for the fallible form.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> EdgeId {
        match self.try_add_child(parent, child) {
            Ok(edge) => edge,
            Err(err) => panic!("{err}"),
        }
    }

    /// Like [`add_child`](Self::add_child), but reports a second parent or a
    /// cycle (`child` is `parent` or one of its ancestors) as an error and
    /// leaves the graph unchanged.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn try_add_child(&mut self, parent: NodeId, child: NodeId) -> Result<EdgeId, StateError> {
        self.validate_node(parent);
        self.validate_node(child);
        let p = parent.idx;
        let c = child.idx;
        if self.parent[c as usize] != INVALID {
            return Err(StateError::AlreadyParented(child));
        }
        let mut up = p;
        while up != INVALID {
            if up == c {
                return Err(StateError::TreeCycle { parent, child });
            }
            up = self.parent[up as usize];
        }

        let edge = self.alloc_edge(p, c, true, true);
        self.parent[c as usize] = p;
        self.parent_edge[c as usize] = edge.idx;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            // Walk to last child.
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }
        Ok(edge)
    }

    /// Removes an edge. Removing a tree edge detaches the child from its
    /// parent.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn remove_edge(&mut self, id: EdgeId) {
        self.validate_edge(id);
        let e = id.idx;
        let s = self.source[e as usize];
        let t = self.target[e as usize];

        if self.tree_edge[e as usize] {
            self.unlink_from_parent(t);
        }
        self.incident[s as usize].retain(|&x| x != e);
        if t != s {
            self.incident[t as usize].retain(|&x| x != e);
        }

        self.edge_alive[e as usize] = false;
        self.edge_generation[e as usize] += 1;
        self.edge_free.push(e);
        self.edge_count -= 1;
    }

    // -- Queries --

    /// Returns the label of a node.
    #[must_use]
    pub fn label(&self, id: NodeId) -> &str {
        self.validate_node(id);
        &self.label[id.idx as usize]
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Returns the number of live edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Returns an iterator over all live nodes in slot order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.node_slots)
            .filter(|&i| self.node_alive[i as usize])
            .map(|i| self.node_handle(i))
    }

    /// Returns an iterator over all live edges in slot order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.edge_slots)
            .filter(|&i| self.edge_alive[i as usize])
            .map(|i| self.edge_handle(i))
    }

    /// Returns the endpoints of an edge as `(source, target)`.
    #[must_use]
    pub fn endpoints(&self, id: EdgeId) -> (NodeId, NodeId) {
        self.validate_edge(id);
        (
            self.node_handle(self.source[id.idx as usize]),
            self.node_handle(self.target[id.idx as usize]),
        )
    }

    /// Returns whether an edge is directed.
    #[must_use]
    pub fn is_directed(&self, id: EdgeId) -> bool {
        self.validate_edge(id);
        self.directed[id.idx as usize]
    }

    /// Returns whether an edge is a tree edge created by
    /// [`add_child`](Self::add_child).
    #[must_use]
    pub fn is_tree_edge(&self, id: EdgeId) -> bool {
        self.validate_edge(id);
        self.tree_edge[id.idx as usize]
    }

    /// Returns the edges incident to a node, in insertion order.
    #[must_use]
    pub fn edges_of(&self, id: NodeId) -> Vec<EdgeId> {
        self.validate_node(id);
        self.incident[id.idx as usize]
            .iter()
            .map(|&e| self.edge_handle(e))
            .collect()
    }

    /// Returns the nodes adjacent to `id` (ignoring edge direction), in edge
    /// insertion order.
    #[must_use]
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        self.validate_node(id);
        let n = id.idx;
        self.incident[n as usize]
            .iter()
            .map(|&e| {
                let s = self.source[e as usize];
                if s == n {
                    self.node_handle(self.target[e as usize])
                } else {
                    self.node_handle(s)
                }
            })
            .collect()
    }

    /// Returns the tree parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate_node(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.node_handle(p))
    }

    /// Returns the tree edge connecting a node to its parent, if any.
    #[must_use]
    pub fn parent_edge(&self, id: NodeId) -> Option<EdgeId> {
        self.validate_node(id);
        let e = self.parent_edge[id.idx as usize];
        (e != INVALID).then(|| self.edge_handle(e))
    }

    /// Returns an iterator over the tree children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate_node(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the position of `child` among the tree children of `parent`.
    #[must_use]
    pub fn child_index(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).position(|c| c == child)
    }

    /// Returns the number of tree edges between a node and its root.
    #[must_use]
    pub fn depth(&self, id: NodeId) -> usize {
        self.validate_node(id);
        let mut depth = 0;
        let mut p = self.parent[id.idx as usize];
        while p != INVALID {
            depth += 1;
            p = self.parent[p as usize];
        }
        depth
    }

    /// Returns the tree root.
    ///
    /// This is the node set with [`set_root`](Self::set_root) if it is still
    /// live, otherwise the first live node without a tree parent.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        if let Some(r) = self.root.filter(|&r| self.contains_node(r)) {
            return Some(r);
        }
        (0..self.node_slots)
            .find(|&i| self.node_alive[i as usize] && self.parent[i as usize] == INVALID)
            .map(|i| self.node_handle(i))
    }

    /// Designates the tree root.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_root(&mut self, id: NodeId) {
        self.validate_node(id);
        self.root = Some(id);
    }

    // -- Internal helpers --

    fn alloc_edge(&mut self, s: u32, t: u32, directed: bool, tree: bool) -> EdgeId {
        let idx = if let Some(idx) = self.edge_free.pop() {
            let i = idx as usize;
            self.source[i] = s;
            self.target[i] = t;
            self.directed[i] = directed;
            self.tree_edge[i] = tree;
            self.edge_alive[i] = true;
            idx
        } else {
            let idx = self.edge_slots;
            self.edge_slots += 1;
            self.source.push(s);
            self.target.push(t);
            self.directed.push(directed);
            self.tree_edge.push(tree);
            self.edge_generation.push(0);
            self.edge_alive.push(true);
            idx
        };
        self.incident[s as usize].push(idx);
        if t != s {
            self.incident[t as usize].push(idx);
        }
        self.edge_count += 1;
        self.edge_handle(idx)
    }

    pub(crate) fn node_handle(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.node_generation[idx as usize],
        }
    }

    pub(crate) fn edge_handle(&self, idx: u32) -> EdgeId {
        EdgeId {
            idx,
            generation: self.edge_generation[idx as usize],
        }
    }

    /// Panics if the handle is stale.
    fn validate_node(&self, id: NodeId) {
        assert!(self.contains_node(id), "stale NodeId: {id:?}");
    }

    /// Panics if the handle is stale.
    fn validate_edge(&self, id: EdgeId) {
        assert!(self.contains_edge(id), "stale EdgeId: {id:?}");
    }

    /// Removes `idx` from its parent's child list.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        if p == INVALID {
            return;
        }
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            // Was first child.
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.parent_edge[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }
}
