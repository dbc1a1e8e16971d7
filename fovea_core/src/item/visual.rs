// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The visual item record and its per-kind payloads.

use std::collections::HashMap;

use kurbo::Point;

use super::id::{ItemClass, ItemId, ItemKind};
use super::value::{Font, Value};
use crate::color::Color;
use crate::graph::Entity;

/// An animatable value: what is on screen now, where the current transition
/// started, and where it ends.
#[derive(Clone, Debug, PartialEq)]
pub struct Tween<T> {
    /// Value shown in the current frame.
    pub current: T,
    /// Value at the start of the running transition.
    pub start: T,
    /// Value the running transition converges to.
    pub end: T,
}

impl<T: Clone> Tween<T> {
    /// Creates a tween resting at `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            current: value.clone(),
            start: value.clone(),
            end: value,
        }
    }

    /// Sets all three values, so no transition is pending.
    pub fn set(&mut self, value: T) {
        self.current = value.clone();
        self.start = value.clone();
        self.end = value;
    }

    /// Makes the current value the start of the next transition.
    pub fn settle(&mut self) {
        self.start.clone_from(&self.current);
    }

    /// Jumps to the end of the transition.
    pub fn finish(&mut self) {
        self.current.clone_from(&self.end);
    }
}

/// Node-only links.
///
/// Neighbor and edge lists are parallel: `edges[i]` connects this node to
/// `neighbors[i]`. Links refer to other items of the registry and are kept up
/// to date as edge items come and go; tree links are rebuilt by
/// [`Registry::relink`](crate::registry::Registry::relink).
#[derive(Clone, Debug, PartialEq)]
pub struct NodeData {
    pub(crate) neighbors: Vec<ItemId>,
    pub(crate) edges: Vec<ItemId>,
    pub(crate) parent: ItemId,
    pub(crate) children: Vec<ItemId>,
    /// Whether the node is shown expanded.
    pub expanded: bool,
}

impl Default for NodeData {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeData {
    fn new() -> Self {
        Self {
            neighbors: Vec::new(),
            edges: Vec::new(),
            parent: ItemId::NONE,
            children: Vec::new(),
            expanded: false,
        }
    }

    /// Node items adjacent through a registered edge item.
    #[must_use]
    pub fn neighbors(&self) -> &[ItemId] {
        &self.neighbors
    }

    /// Edge items incident to this node, parallel to
    /// [`neighbors`](Self::neighbors).
    #[must_use]
    pub fn edges(&self) -> &[ItemId] {
        &self.edges
    }

    /// Item of the tree parent, if registered.
    #[must_use]
    pub fn parent(&self) -> Option<ItemId> {
        (self.parent != ItemId::NONE).then_some(self.parent)
    }

    /// Items of the registered tree children, in child order.
    #[must_use]
    pub fn children(&self) -> &[ItemId] {
        &self.children
    }

    fn reset(&mut self) {
        self.neighbors.clear();
        self.edges.clear();
        self.parent = ItemId::NONE;
        self.children.clear();
        self.expanded = false;
    }
}

/// Edge-only endpoints.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeData {
    pub(crate) source: ItemId,
    pub(crate) target: ItemId,
    pub(crate) directed: bool,
}

impl EdgeData {
    /// The source node item.
    #[must_use]
    pub fn source(&self) -> ItemId {
        self.source
    }

    /// The target node item.
    #[must_use]
    pub fn target(&self) -> ItemId {
        self.target
    }

    /// Whether the edge is directed.
    #[must_use]
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Returns the endpoint opposite `node`, if `node` is an endpoint.
    #[must_use]
    pub fn opposite(&self, node: ItemId) -> Option<ItemId> {
        if node == self.source {
            Some(self.target)
        } else if node == self.target {
            Some(self.source)
        } else {
            None
        }
    }
}

/// Aggregate-only orientation, used by radial transitions.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregateData {
    /// Orientation angle in radians.
    pub angle: Tween<f64>,
    /// Distance from the layout anchor.
    pub radius: Tween<f64>,
}

/// Per-variant payload of a [`VisualItem`].
#[derive(Clone, Debug, PartialEq)]
pub enum Kind {
    /// A graph node.
    Node(NodeData),
    /// A graph edge.
    Edge(EdgeData),
    /// A group of entities.
    Aggregate(AggregateData),
}

impl Kind {
    /// Creates the empty payload for `kind`.
    #[must_use]
    pub fn new(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Node => Self::Node(NodeData::new()),
            ItemKind::Edge => Self::Edge(EdgeData {
                source: ItemId::NONE,
                target: ItemId::NONE,
                directed: false,
            }),
            ItemKind::Aggregate => Self::Aggregate(AggregateData {
                angle: Tween::new(0.0),
                radius: Tween::new(0.0),
            }),
        }
    }

    /// The variant tag.
    #[must_use]
    pub fn tag(&self) -> ItemKind {
        match self {
            Self::Node(_) => ItemKind::Node,
            Self::Edge(_) => ItemKind::Edge,
            Self::Aggregate(_) => ItemKind::Aggregate,
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Node(n) => n.reset(),
            Self::Edge(e) => {
                e.source = ItemId::NONE;
                e.target = ItemId::NONE;
                e.directed = false;
            }
            Self::Aggregate(a) => {
                a.angle.set(0.0);
                a.radius.set(0.0);
            }
        }
    }
}

/// One visualized node, edge, or aggregate.
///
/// Visual attributes are [`Tween`]s: assignment and layout actions write the
/// `end` values, interpolators blend `start` toward `end` into `current`, and
/// renderers read `current`.
///
/// Lifecycle flags are owned by the registry:
///
/// - `visible` / `newly_visible` — `newly_visible` is set only when `visible`
///   flips from false to true and is cleared at the start of the next cycle.
/// - `dirty` — number of consecutive cycles in which no filter touched the
///   item. Items over their class's `max_dirty` are evicted.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualItem {
    pub(crate) class: ItemClass,
    pub(crate) kind: Kind,
    pub(crate) entities: Vec<Entity>,
    /// Position.
    pub location: Tween<Point>,
    /// Stroke color.
    pub stroke: Tween<Color>,
    /// Fill color.
    pub fill: Tween<Color>,
    /// Scale factor relative to the renderer's base size.
    pub size: Tween<f64>,
    /// Label font.
    pub font: Tween<Font>,
    pub(crate) visible: bool,
    pub(crate) newly_visible: bool,
    pub(crate) dirty: u32,
    /// Layouts leave the location of fixed items alone.
    pub fixed: bool,
    /// Drawn on top of its kind and usually in a highlight color.
    pub highlighted: bool,
    /// Degree of interest; `NEG_INFINITY` when unassigned.
    pub doi: f64,
    /// Free-form visualization attributes.
    pub attrs: HashMap<String, Value>,
}

impl VisualItem {
    /// Creates a blank, invisible item of the given class and kind.
    #[must_use]
    pub fn new(class: ItemClass, kind: ItemKind) -> Self {
        Self {
            class,
            kind: Kind::new(kind),
            entities: Vec::new(),
            location: Tween::new(Point::ORIGIN),
            stroke: Tween::new(Color::BLACK),
            fill: Tween::new(Color::TRANSPARENT),
            size: Tween::new(1.0),
            font: Tween::new(Font::default()),
            visible: false,
            newly_visible: false,
            dirty: 0,
            fixed: false,
            highlighted: false,
            doi: f64::NEG_INFINITY,
            attrs: HashMap::new(),
        }
    }

    /// Returns every field to its [`new`](Self::new) state, keeping class,
    /// kind, and allocations.
    pub(crate) fn reset(&mut self) {
        self.kind.reset();
        self.entities.clear();
        self.location.set(Point::ORIGIN);
        self.stroke.set(Color::BLACK);
        self.fill.set(Color::TRANSPARENT);
        self.size.set(1.0);
        self.font.set(Font::default());
        self.visible = false;
        self.newly_visible = false;
        self.dirty = 0;
        self.fixed = false;
        self.highlighted = false;
        self.doi = f64::NEG_INFINITY;
        self.attrs.clear();
    }

    /// The item class.
    #[must_use]
    pub fn class(&self) -> ItemClass {
        self.class
    }

    /// The per-kind payload.
    #[must_use]
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// The variant tag.
    #[must_use]
    pub fn item_kind(&self) -> ItemKind {
        self.kind.tag()
    }

    /// Node links, if this is a node item.
    #[must_use]
    pub fn node(&self) -> Option<&NodeData> {
        match &self.kind {
            Kind::Node(n) => Some(n),
            _ => None,
        }
    }

    /// Mutable node payload, if this is a node item.
    pub fn node_mut(&mut self) -> Option<&mut NodeData> {
        match &mut self.kind {
            Kind::Node(n) => Some(n),
            _ => None,
        }
    }

    /// Endpoints, if this is an edge item.
    #[must_use]
    pub fn edge(&self) -> Option<&EdgeData> {
        match &self.kind {
            Kind::Edge(e) => Some(e),
            _ => None,
        }
    }

    /// Orientation, if this is an aggregate item.
    #[must_use]
    pub fn aggregate(&self) -> Option<&AggregateData> {
        match &self.kind {
            Kind::Aggregate(a) => Some(a),
            _ => None,
        }
    }

    /// Mutable orientation, if this is an aggregate item.
    pub fn aggregate_mut(&mut self) -> Option<&mut AggregateData> {
        match &mut self.kind {
            Kind::Aggregate(a) => Some(a),
            _ => None,
        }
    }

    /// The first backing entity, if any.
    ///
    /// Node and edge items have exactly one; an aggregate may have none, in
    /// which case use [`entities`](Self::entities).
    #[must_use]
    pub fn entity(&self) -> Option<Entity> {
        self.entities.first().copied()
    }

    /// All backing entities.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Number of member entities (meaningful for aggregates).
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.entities.len()
    }

    /// Whether the item is drawn.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the item became visible during the current cycle.
    #[must_use]
    pub fn is_newly_visible(&self) -> bool {
        self.newly_visible
    }

    /// Consecutive cycles without a filter touching this item.
    #[must_use]
    pub fn dirty(&self) -> u32 {
        self.dirty
    }

    /// Shows or hides the item.
    pub fn set_visible(&mut self, visible: bool) {
        self.newly_visible = visible && !self.visible;
        self.visible = visible;
    }

    /// Marks the item as wanted this cycle.
    pub(crate) fn touch(&mut self) {
        self.dirty = 0;
        if !self.visible {
            self.set_visible(true);
        }
    }

    /// Copies every `current` value into `start`.
    pub(crate) fn settle(&mut self) {
        self.location.settle();
        self.stroke.settle();
        self.fill.settle();
        self.size.settle();
        self.font.settle();
        if let Kind::Aggregate(a) = &mut self.kind {
            a.angle.settle();
            a.radius.settle();
        }
    }

    /// Looks up a visualization attribute.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }

    /// Sets a visualization attribute.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attrs.insert(key.into(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newly_visible_only_on_rising_edge() {
        let mut item = VisualItem::new(ItemClass::NODE, ItemKind::Node);
        item.set_visible(true);
        assert!(item.is_newly_visible(), "false -> true sets the flag");
        item.set_visible(true);
        assert!(!item.is_newly_visible(), "staying visible clears it");
        item.set_visible(false);
        assert!(!item.is_newly_visible(), "hiding never sets it");
        item.set_visible(true);
        assert!(item.is_newly_visible(), "second rise sets it again");
    }

    #[test]
    fn touch_keeps_flag_of_already_visible_item() {
        let mut item = VisualItem::new(ItemClass::NODE, ItemKind::Node);
        item.touch();
        assert!(item.is_newly_visible(), "first touch shows the item");
        item.newly_visible = false;
        item.dirty = 3;
        item.touch();
        assert_eq!(item.dirty(), 0);
        assert!(!item.is_newly_visible(), "touch of a shown item is not a rise");
    }

    #[test]
    fn default_node_links_point_nowhere() {
        let node = NodeData::default();
        assert_eq!(node.parent(), None);
        assert_eq!(node, NodeData::new());
        assert!(node.neighbors().is_empty(), "no neighbors yet");
    }

    #[test]
    fn reset_matches_fresh_item() {
        let mut item = VisualItem::new(ItemClass::AGGREGATE, ItemKind::Aggregate);
        item.location.end = Point::new(4.0, 5.0);
        item.stroke.current = Color::WHITE;
        item.entities.push(Entity::Node(crate::graph::NodeId {
            idx: 0,
            generation: 0,
        }));
        item.set_attr("highlighted", true);
        item.doi = 2.0;
        item.fixed = true;
        if let Some(a) = item.aggregate_mut() {
            a.angle.end = 1.0;
        }
        item.touch();

        item.reset();
        assert_eq!(
            item,
            VisualItem::new(ItemClass::AGGREGATE, ItemKind::Aggregate)
        );
    }

    #[test]
    fn settle_copies_current_into_start() {
        let mut item = VisualItem::new(ItemClass::NODE, ItemKind::Node);
        item.location.current = Point::new(1.0, 2.0);
        item.size.current = 3.0;
        item.settle();
        assert_eq!(item.location.start, Point::new(1.0, 2.0));
        assert!((item.size.start - 3.0).abs() < f64::EPSILON, "size settled");
    }

    #[test]
    fn opposite_endpoint() {
        let a = ItemId {
            idx: 1,
            generation: 0,
        };
        let b = ItemId {
            idx: 2,
            generation: 0,
        };
        let e = EdgeData {
            source: a,
            target: b,
            directed: true,
        };
        assert_eq!(e.opposite(a), Some(b));
        assert_eq!(e.opposite(b), Some(a));
        assert_eq!(e.opposite(ItemId::NONE), None);
    }
}
