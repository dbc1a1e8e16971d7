// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Focus sets: named collections of entities the user is interested in.
//!
//! The registry hosts several named sets. [`DEFAULT`] drives the fisheye
//! filters; [`SELECTION`] and [`SEARCH`] are pre-registered for applications
//! to use. Further sets can be added with
//! [`FocusSets::add`].
//!
//! Listeners run synchronously inside the mutating call, which normally
//! happens while the caller holds the registry lock. A listener may send
//! messages (for instance to re-run a filter pipeline) but must not try to
//! lock the registry again.

use core::fmt;
use std::collections::HashSet;

use crate::error::ConfigError;
use crate::graph::Entity;

/// Name of the set that drives focus-based filtering.
pub const DEFAULT: &str = "default";
/// Name of the set holding the user's selection.
pub const SELECTION: &str = "selection";
/// Name of the set holding search matches.
pub const SEARCH: &str = "search";

/// A change to a focus set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FocusEvent {
    /// Entities were added.
    Added(Vec<Entity>),
    /// Entities were removed.
    Removed(Vec<Entity>),
    /// The contents were replaced.
    Replaced {
        /// Entities that are new to the set.
        added: Vec<Entity>,
        /// Entities that left the set.
        removed: Vec<Entity>,
    },
}

/// Handle for removing a listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&FocusEvent) + Send>;

/// An ordered, duplicate-free set of entities with change notification.
pub struct FocusSet {
    name: String,
    members: Vec<Entity>,
    index: HashSet<Entity>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl fmt::Debug for FocusSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusSet")
            .field("name", &self.name)
            .field("members", &self.members)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl FocusSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            index: HashSet::new(),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// The set's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds an entity. Returns `false` if it was already present.
    pub fn add(&mut self, entity: Entity) -> bool {
        if !self.index.insert(entity) {
            return false;
        }
        self.members.push(entity);
        self.notify(&FocusEvent::Added(vec![entity]));
        true
    }

    /// Adds several entities, notifying once. Returns how many were new.
    pub fn add_all(&mut self, entities: impl IntoIterator<Item = Entity>) -> usize {
        let mut added = Vec::new();
        for e in entities {
            if self.index.insert(e) {
                self.members.push(e);
                added.push(e);
            }
        }
        let n = added.len();
        if n > 0 {
            self.notify(&FocusEvent::Added(added));
        }
        n
    }

    /// Removes an entity. Returns `false` if it was not present.
    pub fn remove(&mut self, entity: Entity) -> bool {
        if !self.index.remove(&entity) {
            return false;
        }
        self.members.retain(|&e| e != entity);
        self.notify(&FocusEvent::Removed(vec![entity]));
        true
    }

    /// Replaces the contents, keeping the given order and dropping
    /// duplicates.
    pub fn set(&mut self, entities: impl IntoIterator<Item = Entity>) {
        let mut members = Vec::new();
        let mut index = HashSet::new();
        for e in entities {
            if index.insert(e) {
                members.push(e);
            }
        }
        let added: Vec<_> = members
            .iter()
            .copied()
            .filter(|e| !self.index.contains(e))
            .collect();
        let removed: Vec<_> = self
            .members
            .iter()
            .copied()
            .filter(|e| !index.contains(e))
            .collect();
        self.members = members;
        self.index = index;
        if !added.is_empty() || !removed.is_empty() {
            self.notify(&FocusEvent::Replaced { added, removed });
        }
    }

    /// Removes every entity.
    pub fn clear(&mut self) {
        if self.members.is_empty() {
            return;
        }
        let removed = core::mem::take(&mut self.members);
        self.index.clear();
        self.notify(&FocusEvent::Removed(removed));
    }

    /// Whether `entity` is in the set.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.index.contains(&entity)
    }

    /// Members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.members.iter().copied()
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Registers a change listener.
    pub fn add_listener(&mut self, f: impl FnMut(&FocusEvent) + Send + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(f)));
        id
    }

    /// Unregisters a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, event: &FocusEvent) {
        tracing::trace!(set = %self.name, ?event, "focus changed");
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }
}

/// The registry's named focus sets.
#[derive(Debug)]
pub struct FocusSets {
    // Index 0 is always the default set.
    sets: Vec<FocusSet>,
}

impl Default for FocusSets {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusSets {
    /// Creates the default, selection, and search sets.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sets: vec![
                FocusSet::new(DEFAULT),
                FocusSet::new(SELECTION),
                FocusSet::new(SEARCH),
            ],
        }
    }

    /// Adds an empty set.
    pub fn add(&mut self, name: impl Into<String>) -> Result<(), ConfigError> {
        let name = name.into();
        if self.sets.iter().any(|s| s.name == name) {
            return Err(ConfigError::DuplicateFocusSet(name));
        }
        self.sets.push(FocusSet::new(name));
        Ok(())
    }

    /// Looks up a set by name.
    pub fn get(&self, name: &str) -> Result<&FocusSet, ConfigError> {
        self.sets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ConfigError::UnknownFocusSet(name.to_owned()))
    }

    /// Looks up a set by name, mutably.
    pub fn get_mut(&mut self, name: &str) -> Result<&mut FocusSet, ConfigError> {
        self.sets
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| ConfigError::UnknownFocusSet(name.to_owned()))
    }

    /// The default set.
    #[must_use]
    pub fn default_set(&self) -> &FocusSet {
        &self.sets[0]
    }

    /// The default set, mutably.
    pub fn default_set_mut(&mut self) -> &mut FocusSet {
        &mut self.sets[0]
    }

    /// Names of all sets in creation order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.sets.iter().map(|s| s.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use std::sync::{Arc, Mutex};

    fn entities(n: usize) -> Vec<Entity> {
        let mut g = Graph::new();
        (0..n).map(|i| Entity::Node(g.add_node(format!("n{i}")))).collect()
    }

    fn recorded(set: &mut FocusSet) -> Arc<Mutex<Vec<FocusEvent>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        set.add_listener(move |e| sink.lock().unwrap().push(e.clone()));
        log
    }

    #[test]
    fn add_is_ordered_and_deduplicated() {
        let e = entities(3);
        let mut set = FocusSet::new("t");
        assert!(set.add(e[2]), "new entity");
        assert!(set.add(e[0]), "new entity");
        assert!(!set.add(e[2]), "duplicate rejected");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![e[2], e[0]]);
        assert_eq!(set.add_all(e.clone()), 1);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn listeners_see_each_change_once() {
        let e = entities(3);
        let mut set = FocusSet::new("t");
        let log = recorded(&mut set);

        set.add(e[0]);
        set.add(e[0]);
        set.remove(e[1]);
        set.set([e[1], e[2]]);
        set.set([e[2], e[1]]);
        set.clear();
        set.clear();

        let log = log.lock().unwrap();
        assert_eq!(
            *log,
            vec![
                FocusEvent::Added(vec![e[0]]),
                FocusEvent::Replaced {
                    added: vec![e[1], e[2]],
                    removed: vec![e[0]],
                },
                FocusEvent::Removed(vec![e[2], e[1]]),
            ]
        );
    }

    #[test]
    fn removed_listener_is_silent() {
        let e = entities(1);
        let mut set = FocusSet::new("t");
        let log = Arc::new(Mutex::new(0_usize));
        let sink = Arc::clone(&log);
        let id = set.add_listener(move |_| *sink.lock().unwrap() += 1);
        assert!(set.remove_listener(id), "registered listener removed");
        set.add(e[0]);
        assert_eq!(*log.lock().unwrap(), 0);
    }

    #[test]
    fn named_sets() {
        let mut sets = FocusSets::new();
        assert_eq!(sets.default_set().name(), DEFAULT);
        assert!(sets.get(SEARCH).is_ok(), "search set is pre-registered");
        sets.add("hover").unwrap();
        assert_eq!(
            sets.add("hover"),
            Err(ConfigError::DuplicateFocusSet("hover".into()))
        );
        assert_eq!(
            sets.get("nope").map(FocusSet::name),
            Err(ConfigError::UnknownFocusSet("nope".into()))
        );
        assert_eq!(sets.names().count(), 4);
    }
}
