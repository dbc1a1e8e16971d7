// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{INVALID, NodeId};
use super::store::Graph;

/// An iterator over the tree children of a node.
///
/// Created by [`Graph::children`].
#[derive(Debug)]
pub struct Children<'a> {
    graph: &'a Graph,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(graph: &'a Graph, first: u32) -> Self {
        Self {
            graph,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.graph.next_sibling[idx as usize];
        Some(self.graph.node_handle(idx))
    }
}
