// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registry storage: class tables, entity mapping, eviction, and links.

use core::cmp::Ordering;
use core::fmt;
use std::collections::HashMap;

use kurbo::Rect;

use super::iter::{DefaultComparator, ItemComparator, ItemSnapshot, Items};
use super::{ClassStats, GcStats, ItemClassConfig, RegistryStats};
use crate::error::{ConfigError, Error, Result, StateError};
use crate::focus::{FocusSet, FocusSets};
use crate::graph::{EdgeId, Entity, Graph, NodeId};
use crate::item::{EdgeData, ItemClass, ItemId, ItemKind, Kind, NodeData, VisualItem};
use crate::pool::ItemPool;
use crate::render::{DefaultRenderer, Renderer};

#[derive(Debug)]
struct ClassEntry {
    config: ItemClassConfig,
    list: Vec<ItemId>,
    map: HashMap<Entity, ItemId>,
    sorted: bool,
}

/// Links an evicted item leaves behind in other items.
enum Links {
    Node {
        edges: Vec<ItemId>,
        parent: ItemId,
        children: Vec<ItemId>,
    },
    Edge {
        source: ItemId,
        target: ItemId,
    },
    None,
}

/// Owner of the backing graph and every visual item.
///
/// See the [module docs](super) for the staleness cycle and ordering rules.
pub struct Registry {
    graph: Graph,
    pool: ItemPool,
    classes: Vec<ClassEntry>,
    comparator: Box<dyn ItemComparator>,
    focus: FocusSets,
    renderer: Box<dyn Renderer>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("graph", &self.graph)
            .field("classes", &self.classes)
            .field("live", &self.pool.live())
            .field("focus", &self.focus)
            .finish_non_exhaustive()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates a registry with an empty graph and no item classes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            pool: ItemPool::new(),
            classes: Vec::new(),
            comparator: Box::new(DefaultComparator),
            focus: FocusSets::new(),
            renderer: Box::new(DefaultRenderer::default()),
        }
    }

    /// Creates a registry with the built-in node, edge, and aggregate
    /// classes declared.
    #[must_use]
    pub fn with_default_classes() -> Self {
        let mut registry = Self::new();
        for config in [
            ItemClassConfig::node(),
            ItemClassConfig::edge(),
            ItemClassConfig::aggregate(),
        ] {
            if let Err(err) = registry.add_item_class(config) {
                tracing::error!(%err, "declaring built-in item class");
            }
        }
        registry
    }

    // -- Classes --

    /// Declares an item class.
    pub fn add_item_class(&mut self, config: ItemClassConfig) -> Result<()> {
        if self.class_index(config.class).is_ok() {
            return Err(ConfigError::DuplicateItemClass(config.class).into());
        }
        self.pool
            .register(config.class, config.kind, config.pool_capacity)?;
        tracing::debug!(class = %config.class, kind = ?config.kind, max_dirty = config.max_dirty, "declared item class");
        self.classes.push(ClassEntry {
            config,
            list: Vec::new(),
            map: HashMap::new(),
            sorted: true,
        });
        Ok(())
    }

    /// The declaration of `class`.
    pub fn class_config(&self, class: ItemClass) -> Result<ItemClassConfig> {
        Ok(self.classes[self.class_index(class)?].config)
    }

    /// Declared classes in declaration order.
    pub fn classes(&self) -> impl Iterator<Item = ItemClass> + '_ {
        self.classes.iter().map(|c| c.config.class)
    }

    fn class_index(&self, class: ItemClass) -> core::result::Result<usize, ConfigError> {
        self.classes
            .iter()
            .position(|c| c.config.class == class)
            .ok_or(ConfigError::UnknownItemClass(class))
    }

    fn kind_index(&self, class: ItemClass, kind: ItemKind) -> Result<usize> {
        let ci = self.class_index(class)?;
        let actual = self.classes[ci].config.kind;
        if actual != kind {
            return Err(ConfigError::KindMismatch {
                class,
                expected: kind,
                actual,
            }
            .into());
        }
        Ok(ci)
    }

    // -- Graph --

    /// The backing graph.
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The backing graph, mutably.
    ///
    /// Items of removed entities stay resident until the staleness cycle
    /// evicts them.
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    // -- Item access --

    /// Returns whether `id` refers to a resident item.
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.pool.contains(id)
    }

    /// Returns the item for `id`.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&VisualItem> {
        self.pool.get(id)
    }

    /// Returns the item for `id` mutably. The item's class is re-sorted
    /// before the next ordered iteration.
    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut VisualItem> {
        let class = self.pool.get(id)?.class;
        if let Ok(ci) = self.class_index(class) {
            self.classes[ci].sorted = false;
        }
        self.pool.get_mut(id)
    }

    /// Number of resident items across all classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pool.live()
    }

    /// Whether no item is resident.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pool.live() == 0
    }

    /// Looks up, and optionally creates, the item of `class` for `entity`.
    ///
    /// With `create` set, the item is also *touched*: its dirty counter is
    /// reset and it is made visible, protecting it from the next eviction.
    /// Without `create`, a missing item yields `Ok(None)`.
    ///
    /// Creating an edge item requires both endpoint node items to be
    /// resident in the class's endpoint class.
    pub fn get_item(
        &mut self,
        class: ItemClass,
        entity: Entity,
        create: bool,
    ) -> Result<Option<ItemId>> {
        let ci = self.class_index(class)?;
        if let Some(&id) = self.classes[ci].map.get(&entity) {
            if create && let Some(item) = self.pool.get_mut(id) {
                item.touch();
            }
            return Ok(Some(id));
        }
        if !create {
            return Ok(None);
        }
        if !self.graph.contains(entity) {
            return Err(StateError::MissingEntity(entity).into());
        }

        let config = self.classes[ci].config;
        let id = match (config.kind, entity) {
            (ItemKind::Node, Entity::Node(_)) | (ItemKind::Aggregate, _) => {
                self.pool.acquire(class)?
            }
            (ItemKind::Edge, Entity::Edge(edge)) => self.acquire_edge(&config, edge)?,
            (actual, _) => {
                return Err(ConfigError::KindMismatch {
                    class,
                    expected: match entity {
                        Entity::Node(_) => ItemKind::Node,
                        Entity::Edge(_) => ItemKind::Edge,
                    },
                    actual,
                }
                .into());
            }
        };
        if let Some(item) = self.pool.get_mut(id) {
            item.entities.push(entity);
            item.touch();
        }
        let entry = &mut self.classes[ci];
        entry.list.push(id);
        entry.map.insert(entity, id);
        entry.sorted = false;
        Ok(Some(id))
    }

    /// [`get_item`](Self::get_item) for a node entity.
    pub fn node_item(
        &mut self,
        class: ItemClass,
        node: NodeId,
        create: bool,
    ) -> Result<Option<ItemId>> {
        self.get_item(class, Entity::Node(node), create)
    }

    /// [`get_item`](Self::get_item) for an edge entity.
    pub fn edge_item(
        &mut self,
        class: ItemClass,
        edge: EdgeId,
        create: bool,
    ) -> Result<Option<ItemId>> {
        self.get_item(class, Entity::Edge(edge), create)
    }

    fn acquire_edge(&mut self, config: &ItemClassConfig, edge: EdgeId) -> Result<ItemId> {
        let (s, t) = self.graph.endpoints(edge);
        let directed = self.graph.is_directed(edge);
        let ni = self.kind_index(config.endpoints, ItemKind::Node)?;
        let nodes = &self.classes[ni].map;
        let (Some(&source), Some(&target)) =
            (nodes.get(&Entity::Node(s)), nodes.get(&Entity::Node(t)))
        else {
            return Err(StateError::MissingEndpoint(edge).into());
        };

        let id = self.pool.acquire(config.class)?;
        if let Some(item) = self.pool.get_mut(id) {
            item.kind = Kind::Edge(EdgeData {
                source,
                target,
                directed,
            });
        }
        if let Some(n) = self.node_data_mut(source) {
            n.neighbors.push(target);
            n.edges.push(id);
        }
        if source != target
            && let Some(n) = self.node_data_mut(target)
        {
            n.neighbors.push(source);
            n.edges.push(id);
        }
        Ok(id)
    }

    fn node_data_mut(&mut self, id: ItemId) -> Option<&mut NodeData> {
        self.pool.get_mut(id).and_then(VisualItem::node_mut)
    }

    /// Evicts an item, returning its storage to the pool.
    pub fn remove_item(&mut self, id: ItemId) -> Result<()> {
        if !self.pool.contains(id) {
            return Err(StateError::StaleItem(id).into());
        }
        self.evict(id);
        self.compact();
        Ok(())
    }

    /// Detaches `id` from maps and links and releases it. Class lists are
    /// cleaned up by [`compact`](Self::compact).
    fn evict(&mut self, id: ItemId) {
        let Some(item) = self.pool.get_mut(id) else {
            return;
        };
        let class = item.class;
        let entities = core::mem::take(&mut item.entities);
        let links = match &mut item.kind {
            Kind::Node(n) => Links::Node {
                edges: core::mem::take(&mut n.edges),
                parent: n.parent,
                children: core::mem::take(&mut n.children),
            },
            Kind::Edge(e) => Links::Edge {
                source: e.source,
                target: e.target,
            },
            Kind::Aggregate(_) => Links::None,
        };

        if let Ok(ci) = self.class_index(class) {
            let map = &mut self.classes[ci].map;
            for e in &entities {
                if map.get(e) == Some(&id) {
                    map.remove(e);
                }
            }
        }

        match links {
            Links::Node {
                edges,
                parent,
                children,
            } => {
                for edge in edges {
                    self.evict(edge);
                }
                if let Some(p) = self.node_data_mut(parent) {
                    p.children.retain(|&c| c != id);
                }
                for child in children {
                    if let Some(c) = self.node_data_mut(child)
                        && c.parent == id
                    {
                        c.parent = ItemId::NONE;
                    }
                }
            }
            Links::Edge { source, target } => {
                for end in [source, target] {
                    if let Some(n) = self.node_data_mut(end)
                        && let Some(pos) = n.edges.iter().position(|&e| e == id)
                    {
                        n.edges.remove(pos);
                        n.neighbors.remove(pos);
                    }
                }
            }
            Links::None => {}
        }
        self.pool.release(id);
    }

    /// Drops released handles from the class lists. Relative order is kept,
    /// so sorted lists stay sorted.
    fn compact(&mut self) {
        let Self { classes, pool, .. } = self;
        for entry in classes {
            entry.list.retain(|&id| pool.contains(id));
        }
    }

    // -- Aggregates --

    /// Creates an empty aggregate item in `class`.
    pub fn create_aggregate(&mut self, class: ItemClass) -> Result<ItemId> {
        let ci = self.kind_index(class, ItemKind::Aggregate)?;
        let id = self.pool.acquire(class)?;
        if let Some(item) = self.pool.get_mut(id) {
            item.touch();
        }
        let entry = &mut self.classes[ci];
        entry.list.push(id);
        entry.sorted = false;
        Ok(id)
    }

    /// Makes `entity` a member of aggregate `id`.
    ///
    /// An entity belongs to at most one aggregate per class; it leaves its
    /// previous aggregate.
    pub fn add_mapping(&mut self, id: ItemId, entity: Entity) -> Result<()> {
        let ci = self.aggregate_class_of(id)?;
        if let Some(&old) = self.classes[ci].map.get(&entity) {
            if old == id {
                return Ok(());
            }
            if let Some(item) = self.pool.get_mut(old) {
                item.entities.retain(|&e| e != entity);
            }
        }
        if let Some(item) = self.pool.get_mut(id) {
            item.entities.push(entity);
        }
        self.classes[ci].map.insert(entity, id);
        Ok(())
    }

    /// Removes `entity` from aggregate `id`. Returns `false` if it was not a
    /// member.
    pub fn remove_mapping(&mut self, id: ItemId, entity: Entity) -> Result<bool> {
        let ci = self.aggregate_class_of(id)?;
        let map = &mut self.classes[ci].map;
        if map.get(&entity) != Some(&id) {
            return Ok(false);
        }
        map.remove(&entity);
        if let Some(item) = self.pool.get_mut(id) {
            item.entities.retain(|&e| e != entity);
        }
        Ok(true)
    }

    /// The aggregate of `class` that `entity` belongs to.
    pub fn aggregate_for(&self, class: ItemClass, entity: Entity) -> Result<Option<ItemId>> {
        let ci = self.kind_index(class, ItemKind::Aggregate)?;
        Ok(self.classes[ci].map.get(&entity).copied())
    }

    fn aggregate_class_of(&self, id: ItemId) -> Result<usize> {
        let item = self.pool.get(id).ok_or(StateError::StaleItem(id))?;
        self.kind_index(item.class, ItemKind::Aggregate)
    }

    // -- Entities --

    /// The first backing entity of `id`.
    ///
    /// `None` for stale handles and for aggregates without members; use
    /// [`entities`](Self::entities) for aggregates.
    #[must_use]
    pub fn entity(&self, id: ItemId) -> Option<Entity> {
        self.pool.get(id).and_then(VisualItem::entity)
    }

    /// All backing entities of `id` (empty for stale handles).
    #[must_use]
    pub fn entities(&self, id: ItemId) -> &[Entity] {
        self.pool.get(id).map_or(&[][..], VisualItem::entities)
    }

    /// The backing entity of `id`, as an error if there is none.
    pub fn require_entity(&self, id: ItemId) -> Result<Entity> {
        let item = self.pool.get(id).ok_or(StateError::StaleItem(id))?;
        item.entity()
            .ok_or_else(|| Error::from(StateError::NoEntity(id)))
    }

    // -- Staleness --

    /// Opens a cycle for `class`: every resident item gets one cycle
    /// staler, and last cycle's `newly_visible` flags are cleared.
    pub fn begin_cycle(&mut self, class: ItemClass) -> Result<()> {
        let ci = self.class_index(class)?;
        let Self { classes, pool, .. } = self;
        for &id in &classes[ci].list {
            if let Some(item) = pool.get_mut(id) {
                item.dirty = item.dirty.saturating_add(1);
                item.newly_visible = false;
            }
        }
        Ok(())
    }

    /// Closes a cycle for `class`: evicts items untouched for more than
    /// `max_dirty` cycles and hides the other untouched ones.
    pub fn garbage_collect(&mut self, class: ItemClass) -> Result<GcStats> {
        let ci = self.class_index(class)?;
        let max_dirty = self.classes[ci].config.max_dirty;
        let mut stats = GcStats::default();
        let mut victims = Vec::new();
        {
            let Self { classes, pool, .. } = &mut *self;
            for &id in &classes[ci].list {
                let Some(item) = pool.get_mut(id) else {
                    continue;
                };
                if item.dirty > max_dirty {
                    victims.push(id);
                    continue;
                }
                if item.dirty > 0 && item.visible {
                    item.set_visible(false);
                    stats.hidden += 1;
                }
                stats.retained += 1;
            }
        }
        stats.evicted = victims.len();
        for id in victims {
            self.evict(id);
        }
        self.compact();
        tracing::debug!(
            %class,
            evicted = stats.evicted,
            hidden = stats.hidden,
            retained = stats.retained,
            "garbage collected"
        );
        Ok(stats)
    }

    /// Copies every item's current visual state into its `start` values, so
    /// the next transition begins from what is on screen.
    pub fn settle_starts(&mut self) {
        let Self { classes, pool, .. } = self;
        for entry in classes.iter() {
            for &id in &entry.list {
                if let Some(item) = pool.get_mut(id) {
                    item.settle();
                }
            }
        }
    }

    /// Evicts every item of every class.
    pub fn clear(&mut self) {
        let Self { classes, pool, .. } = self;
        for entry in classes {
            for id in entry.list.drain(..) {
                pool.release(id);
            }
            entry.map.clear();
            entry.sorted = true;
        }
    }

    // -- Iteration --

    /// Installs a drawing-order comparator.
    pub fn set_comparator(&mut self, comparator: impl ItemComparator + 'static) {
        self.comparator = Box::new(comparator);
        for entry in &mut self.classes {
            entry.sorted = false;
        }
    }

    fn ensure_sorted(&mut self) {
        let Self {
            classes,
            pool,
            comparator,
            ..
        } = self;
        for entry in classes.iter_mut().filter(|e| !e.sorted) {
            entry
                .list
                .sort_by(|&a, &b| match (pool.get(a), pool.get(b)) {
                    (Some(x), Some(y)) => comparator.compare(x, y),
                    _ => Ordering::Equal,
                });
            entry.sorted = true;
        }
    }

    /// Every resident item in drawing order, across all classes.
    pub fn items(&mut self) -> Items<'_> {
        self.ensure_sorted();
        self.merged()
    }

    fn merged(&self) -> Items<'_> {
        let lists = self.classes.iter().map(|c| c.list.as_slice()).collect();
        Items::new(lists, &self.pool, &*self.comparator)
    }

    /// The items of one class, in class-list order.
    pub fn items_of(
        &self,
        class: ItemClass,
    ) -> Result<impl Iterator<Item = (ItemId, &VisualItem)> + '_> {
        let ci = self.class_index(class)?;
        Ok(self.classes[ci]
            .list
            .iter()
            .filter_map(|&id| self.pool.get(id).map(|item| (id, item))))
    }

    /// Handles of the items of one class.
    pub fn ids_of(&self, class: ItemClass) -> Result<Vec<ItemId>> {
        Ok(self.classes[self.class_index(class)?].list.clone())
    }

    /// Calls `f` with every resident item. All classes are re-sorted before
    /// the next ordered iteration.
    pub fn for_each_item_mut(&mut self, mut f: impl FnMut(ItemId, &mut VisualItem)) {
        let Self { classes, pool, .. } = self;
        for entry in classes {
            entry.sorted = false;
            for &id in &entry.list {
                if let Some(item) = pool.get_mut(id) {
                    f(id, item);
                }
            }
        }
    }

    /// Calls `f` with every item of `class`.
    pub fn for_each_item_of_mut(
        &mut self,
        class: ItemClass,
        mut f: impl FnMut(ItemId, &mut VisualItem),
    ) -> Result<()> {
        let ci = self.class_index(class)?;
        let Self { classes, pool, .. } = self;
        let entry = &mut classes[ci];
        entry.sorted = false;
        for &id in &entry.list {
            if let Some(item) = pool.get_mut(id) {
                f(id, item);
            }
        }
        Ok(())
    }

    /// Render-time copies of the visible items, in drawing order.
    pub fn snapshot(&mut self) -> Vec<ItemSnapshot> {
        self.ensure_sorted();
        self.merged()
            .filter(|(_, item)| item.visible)
            .map(|(id, item)| {
                ItemSnapshot::capture(id, item, self.renderer.bounds(item), &self.pool)
            })
            .collect()
    }

    /// Occupancy figures.
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        let classes = self
            .classes
            .iter()
            .map(|entry| {
                let class = entry.config.class;
                ClassStats {
                    class,
                    kind: entry.config.kind,
                    resident: entry.list.len(),
                    visible: entry
                        .list
                        .iter()
                        .filter(|&&id| self.pool.get(id).is_some_and(|i| i.visible))
                        .count(),
                    parked: self.pool.parked(class),
                }
            })
            .collect();
        RegistryStats {
            classes,
            live: self.pool.live(),
            slots: self.pool.capacity(),
        }
    }

    // -- Links and geometry --

    /// Rebuilds the tree links of every node item from the graph's tree
    /// view: an item's parent is the item of its node's tree parent in the
    /// same class, and its children are the items of the node's tree
    /// children, in child order.
    pub fn relink(&mut self) {
        let mut updates = Vec::new();
        for entry in self.classes.iter().filter(|c| c.config.kind == ItemKind::Node) {
            for &id in &entry.list {
                let Some(Entity::Node(node)) = self.pool.get(id).and_then(VisualItem::entity)
                else {
                    continue;
                };
                if !self.graph.contains_node(node) {
                    updates.push((id, ItemId::NONE, Vec::new()));
                    continue;
                }
                let parent = self
                    .graph
                    .parent(node)
                    .and_then(|p| entry.map.get(&Entity::Node(p)).copied())
                    .unwrap_or(ItemId::NONE);
                let children = self
                    .graph
                    .children(node)
                    .filter_map(|c| entry.map.get(&Entity::Node(c)).copied())
                    .collect();
                updates.push((id, parent, children));
            }
        }
        for (id, parent, children) in updates {
            if let Some(n) = self.node_data_mut(id) {
                n.parent = parent;
                n.children = children;
            }
        }
    }

    /// Number of parent links between a node item and its root item.
    #[must_use]
    pub fn depth(&self, id: ItemId) -> Option<usize> {
        let mut node = self.pool.get(id)?.node()?;
        let mut depth = 0;
        while let Some(parent) = node.parent() {
            if depth > self.pool.live() {
                tracing::warn!(?id, "cycle in item parent links");
                return None;
            }
            let Some(next) = self.pool.get(parent).and_then(VisualItem::node) else {
                break;
            };
            node = next;
            depth += 1;
        }
        Some(depth)
    }

    /// Screen-space bounds of `id`, from the installed renderer.
    #[must_use]
    pub fn bounds(&self, id: ItemId) -> Option<Rect> {
        self.pool.get(id).map(|item| self.renderer.bounds(item))
    }

    /// Installs the renderer used for bounds queries.
    pub fn set_renderer(&mut self, renderer: impl Renderer + 'static) {
        self.renderer = Box::new(renderer);
    }

    /// The installed renderer.
    #[must_use]
    pub fn renderer(&self) -> &dyn Renderer {
        &*self.renderer
    }

    // -- Focus --

    /// All focus sets.
    #[must_use]
    pub fn focus_sets(&self) -> &FocusSets {
        &self.focus
    }

    /// All focus sets, mutably.
    pub fn focus_sets_mut(&mut self) -> &mut FocusSets {
        &mut self.focus
    }

    /// A focus set by name.
    pub fn focus_set(&self, name: &str) -> Result<&FocusSet> {
        Ok(self.focus.get(name)?)
    }

    /// A focus set by name, mutably.
    pub fn focus_set_mut(&mut self, name: &str) -> Result<&mut FocusSet> {
        Ok(self.focus.get_mut(name)?)
    }

    /// The default focus set, which drives the fisheye filters.
    #[must_use]
    pub fn default_focus(&self) -> &FocusSet {
        self.focus.default_set()
    }

    /// The default focus set, mutably.
    pub fn default_focus_mut(&mut self) -> &mut FocusSet {
        self.focus.default_set_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(n: usize) -> (Registry, Vec<NodeId>, Vec<EdgeId>) {
        let mut r = Registry::with_default_classes();
        let nodes: Vec<_> = (0..n).map(|i| r.graph_mut().add_node(format!("n{i}"))).collect();
        let edges = nodes
            .windows(2)
            .map(|w| r.graph_mut().add_child(w[0], w[1]))
            .collect();
        (r, nodes, edges)
    }

    fn gc_pass(r: &mut Registry, class: ItemClass) -> GcStats {
        r.begin_cycle(class).unwrap();
        r.garbage_collect(class).unwrap()
    }

    #[test]
    fn unknown_class_is_a_config_error() {
        let (mut r, nodes, _) = path(1);
        let err = r
            .node_item(ItemClass::new("ghost"), nodes[0], true)
            .unwrap_err();
        assert!(
            matches!(err, Error::Config(ConfigError::UnknownItemClass(_))),
            "got {err}"
        );
        assert!(r.begin_cycle(ItemClass::new("ghost")).is_err(), "begin_cycle checks class");
    }

    #[test]
    fn duplicate_class_is_rejected() {
        let mut r = Registry::with_default_classes();
        let err = r.add_item_class(ItemClassConfig::node()).unwrap_err();
        assert!(
            matches!(err, Error::Config(ConfigError::DuplicateItemClass(_))),
            "got {err}"
        );
    }

    #[test]
    fn lookup_without_create_does_not_materialize() {
        let (mut r, nodes, _) = path(1);
        assert_eq!(r.node_item(ItemClass::NODE, nodes[0], false).unwrap(), None);
        let id = r.node_item(ItemClass::NODE, nodes[0], true).unwrap().unwrap();
        assert_eq!(r.node_item(ItemClass::NODE, nodes[0], false).unwrap(), Some(id));
        assert_eq!(r.entity(id), Some(Entity::Node(nodes[0])));
        assert!(r.get(id).unwrap().is_visible(), "created items are visible");
    }

    #[test]
    fn kind_mismatch_is_reported() {
        let (mut r, nodes, _) = path(1);
        let err = r.node_item(ItemClass::EDGE, nodes[0], true).unwrap_err();
        assert!(
            matches!(
                err,
                Error::Config(ConfigError::KindMismatch {
                    expected: ItemKind::Node,
                    actual: ItemKind::Edge,
                    ..
                })
            ),
            "got {err}"
        );
    }

    #[test]
    fn edge_needs_both_endpoints() {
        let (mut r, nodes, edges) = path(2);
        r.node_item(ItemClass::NODE, nodes[0], true).unwrap();
        let err = r.edge_item(ItemClass::EDGE, edges[0], true).unwrap_err();
        assert!(
            matches!(err, Error::State(StateError::MissingEndpoint(_))),
            "got {err}"
        );

        let b = r.node_item(ItemClass::NODE, nodes[1], true).unwrap().unwrap();
        let e = r.edge_item(ItemClass::EDGE, edges[0], true).unwrap().unwrap();
        let a = r.node_item(ItemClass::NODE, nodes[0], false).unwrap().unwrap();
        let na = r.get(a).unwrap().node().unwrap();
        assert_eq!(na.neighbors(), &[b]);
        assert_eq!(na.edges(), &[e]);
        let ed = r.get(e).unwrap().edge().unwrap();
        assert_eq!((ed.source(), ed.target()), (a, b));
        assert!(ed.is_directed(), "tree edges are directed");
    }

    #[test]
    fn untouched_item_is_hidden_then_evicted() {
        let (mut r, nodes, _) = path(1);
        let a = r.node_item(ItemClass::NODE, nodes[0], true).unwrap().unwrap();
        assert_eq!(r.get(a).unwrap().dirty(), 0);

        let first = gc_pass(&mut r, ItemClass::NODE);
        assert_eq!(first, GcStats { evicted: 0, hidden: 1, retained: 1 });
        let item = r.get(a).unwrap();
        assert_eq!(item.dirty(), 1);
        assert!(!item.is_visible(), "untouched item hidden");

        let second = gc_pass(&mut r, ItemClass::NODE);
        assert_eq!(second.evicted, 1);
        assert!(!r.contains(a), "evicted");
        assert_eq!(r.node_item(ItemClass::NODE, nodes[0], false).unwrap(), None);
        assert_eq!(r.items().count(), 0);
    }

    #[test]
    fn touched_item_survives_any_number_of_passes() {
        let (mut r, nodes, _) = path(1);
        for _ in 0..10 {
            r.begin_cycle(ItemClass::NODE).unwrap();
            r.node_item(ItemClass::NODE, nodes[0], true).unwrap();
            let stats = r.garbage_collect(ItemClass::NODE).unwrap();
            assert_eq!(stats, GcStats { evicted: 0, hidden: 0, retained: 1 });
        }
    }

    #[test]
    fn evicting_node_takes_edges_and_links() {
        let (mut r, nodes, edges) = path(3);
        let ids: Vec<_> = nodes
            .iter()
            .map(|&n| r.node_item(ItemClass::NODE, n, true).unwrap().unwrap())
            .collect();
        let e0 = r.edge_item(ItemClass::EDGE, edges[0], true).unwrap().unwrap();
        let e1 = r.edge_item(ItemClass::EDGE, edges[1], true).unwrap().unwrap();
        r.relink();
        assert_eq!(r.depth(ids[2]), Some(2));

        r.remove_item(ids[1]).unwrap();
        assert!(!r.contains(e0) && !r.contains(e1), "incident edges evicted");
        assert!(r.get(ids[0]).unwrap().node().unwrap().children().is_empty(), "child link removed");
        assert!(r.get(ids[0]).unwrap().node().unwrap().neighbors().is_empty(), "neighbor removed");
        assert_eq!(r.get(ids[2]).unwrap().node().unwrap().parent(), None);
        assert_eq!(r.ids_of(ItemClass::EDGE).unwrap(), Vec::<ItemId>::new());
        assert!(matches!(
            r.remove_item(ids[1]),
            Err(Error::State(StateError::StaleItem(_)))
        ), "second removal is stale");
    }

    #[test]
    fn aggregates_map_many_entities() {
        let (mut r, nodes, _) = path(3);
        let agg = r.create_aggregate(ItemClass::AGGREGATE).unwrap();
        assert_eq!(r.entity(agg), None, "empty aggregate has no single entity");
        assert!(
            matches!(r.require_entity(agg), Err(Error::State(StateError::NoEntity(_)))),
            "require_entity reports the empty aggregate"
        );

        r.add_mapping(agg, nodes[0].into()).unwrap();
        r.add_mapping(agg, nodes[1].into()).unwrap();
        assert_eq!(r.entities(agg).len(), 2);
        assert_eq!(
            r.aggregate_for(ItemClass::AGGREGATE, nodes[1].into()).unwrap(),
            Some(agg)
        );

        let other = r.create_aggregate(ItemClass::AGGREGATE).unwrap();
        r.add_mapping(other, nodes[1].into()).unwrap();
        assert_eq!(r.entities(agg), &[Entity::Node(nodes[0])]);
        assert!(r.remove_mapping(other, nodes[1].into()).unwrap(), "was a member");
        assert!(!r.remove_mapping(other, nodes[1].into()).unwrap(), "no longer a member");

        let n = r.node_item(ItemClass::NODE, nodes[2], true).unwrap().unwrap();
        assert!(r.add_mapping(n, nodes[2].into()).is_err(), "node items are not aggregates");
    }

    #[test]
    fn ordered_iteration_follows_comparator() {
        let (mut r, nodes, edges) = path(3);
        let ids: Vec<_> = nodes
            .iter()
            .map(|&n| r.node_item(ItemClass::NODE, n, true).unwrap().unwrap())
            .collect();
        let e = r.edge_item(ItemClass::EDGE, edges[0], true).unwrap().unwrap();
        r.get_mut(ids[0]).unwrap().doi = 0.0;
        r.get_mut(ids[1]).unwrap().doi = -2.0;
        r.get_mut(ids[2]).unwrap().doi = -1.0;

        let order: Vec<_> = r.items().map(|(id, _)| id).collect();
        assert_eq!(order, vec![e, ids[1], ids[2], ids[0]]);

        r.get_mut(ids[1]).unwrap().highlighted = true;
        let order: Vec<_> = r.items().map(|(id, _)| id).collect();
        assert_eq!(order, vec![e, ids[2], ids[0], ids[1]]);
    }

    #[test]
    fn snapshot_skips_hidden_items() {
        let (mut r, nodes, edges) = path(2);
        let a = r.node_item(ItemClass::NODE, nodes[0], true).unwrap().unwrap();
        let b = r.node_item(ItemClass::NODE, nodes[1], true).unwrap().unwrap();
        r.edge_item(ItemClass::EDGE, edges[0], true).unwrap();
        r.get_mut(b).unwrap().location.current = kurbo::Point::new(3.0, 4.0);
        r.get_mut(a).unwrap().set_visible(false);

        let snap = r.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].kind, ItemKind::Edge);
        assert_eq!(
            snap[0].endpoints,
            Some((kurbo::Point::ORIGIN, kurbo::Point::new(3.0, 4.0)))
        );
        assert_eq!(snap[1].id, b);
    }

    #[test]
    fn clear_returns_everything_to_the_pool() {
        let (mut r, nodes, _) = path(3);
        for &n in &nodes {
            r.node_item(ItemClass::NODE, n, true).unwrap();
        }
        r.clear();
        let stats = r.stats();
        assert_eq!(stats.live, 0);
        assert_eq!(stats.class(ItemClass::NODE).unwrap().parked, 3);
        assert!(r.is_empty(), "registry empty after clear");
    }

    #[test]
    fn settle_starts_copies_current() {
        let (mut r, nodes, _) = path(1);
        let a = r.node_item(ItemClass::NODE, nodes[0], true).unwrap().unwrap();
        r.get_mut(a).unwrap().location.current = kurbo::Point::new(7.0, 8.0);
        r.settle_starts();
        assert_eq!(r.get(a).unwrap().location.start, kurbo::Point::new(7.0, 8.0));
    }

    #[test]
    fn missing_entity_is_a_state_error() {
        let (mut r, nodes, _) = path(1);
        r.graph_mut().remove_node(nodes[0]);
        let err = r.node_item(ItemClass::NODE, nodes[0], true).unwrap_err();
        assert!(
            matches!(err, Error::State(StateError::MissingEntity(_))),
            "got {err}"
        );
    }
}
