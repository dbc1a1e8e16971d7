// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slot arena that recycles visual items.
//!
//! Items live in slots addressed by generational [`ItemId`]s. Releasing an
//! item bumps its slot's generation, so outstanding handles go stale, and
//! then either *parks* the reset item on its class's free list (bounded by
//! the class's pool capacity) or drops it and leaves the slot vacant for any
//! class to reuse.

use std::collections::HashMap;

use crate::error::ConfigError;
use crate::item::{ItemClass, ItemId, ItemKind, VisualItem};

#[derive(Debug)]
enum Slot {
    Occupied(VisualItem),
    Parked(VisualItem),
    Vacant,
}

#[derive(Debug)]
struct ClassPool {
    kind: ItemKind,
    capacity: usize,
    parked: Vec<u32>,
}

/// Per-class recycling of [`VisualItem`]s.
#[derive(Debug, Default)]
pub struct ItemPool {
    slots: Vec<Slot>,
    generation: Vec<u32>,
    slot_count: u32,
    vacant: Vec<u32>,
    classes: HashMap<ItemClass, ClassPool>,
    live: usize,
}

impl ItemPool {
    /// Creates an empty pool with no registered classes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class holding `kind` items and keeping at most `capacity`
    /// released items parked for reuse.
    pub fn register(
        &mut self,
        class: ItemClass,
        kind: ItemKind,
        capacity: usize,
    ) -> Result<(), ConfigError> {
        if self.classes.contains_key(&class) {
            return Err(ConfigError::DuplicateItemClass(class));
        }
        self.classes.insert(
            class,
            ClassPool {
                kind,
                capacity,
                parked: Vec::new(),
            },
        );
        Ok(())
    }

    /// Hands out a blank item of `class`, reusing a parked one if available.
    pub fn acquire(&mut self, class: ItemClass) -> Result<ItemId, ConfigError> {
        let pool = self
            .classes
            .get_mut(&class)
            .ok_or(ConfigError::UnknownItemClass(class))?;

        let idx = if let Some(idx) = pool.parked.pop() {
            let slot = &mut self.slots[idx as usize];
            *slot = match core::mem::replace(slot, Slot::Vacant) {
                Slot::Parked(item) => Slot::Occupied(item),
                _ => Slot::Occupied(VisualItem::new(class, pool.kind)),
            };
            idx
        } else if let Some(idx) = self.vacant.pop() {
            self.slots[idx as usize] = Slot::Occupied(VisualItem::new(class, pool.kind));
            idx
        } else {
            let idx = self.slot_count;
            self.slot_count += 1;
            self.slots
                .push(Slot::Occupied(VisualItem::new(class, pool.kind)));
            self.generation.push(0);
            idx
        };
        self.live += 1;
        Ok(ItemId {
            idx,
            generation: self.generation[idx as usize],
        })
    }

    /// Returns an item to the pool.
    ///
    /// The item is reset and parked if its class has room, otherwise dropped.
    /// Releasing a stale handle is a contract violation: it is logged and
    /// `false` is returned.
    pub fn release(&mut self, id: ItemId) -> bool {
        if !self.contains(id) {
            tracing::warn!(?id, "release of stale or foreign item handle");
            return false;
        }
        let i = id.idx as usize;
        let Slot::Occupied(mut item) = core::mem::replace(&mut self.slots[i], Slot::Vacant) else {
            return false;
        };
        self.generation[i] = self.generation[i].wrapping_add(1);
        self.live -= 1;

        match self.classes.get_mut(&item.class) {
            Some(pool) if pool.parked.len() < pool.capacity => {
                item.reset();
                self.slots[i] = Slot::Parked(item);
                pool.parked.push(id.idx);
            }
            Some(_) => self.vacant.push(id.idx),
            None => {
                tracing::warn!(class = %item.class, "released item of an unregistered class");
                self.vacant.push(id.idx);
            }
        }
        true
    }

    /// Returns whether `id` refers to a live item.
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        let i = id.idx as usize;
        i < self.slots.len()
            && self.generation[i] == id.generation
            && matches!(self.slots[i], Slot::Occupied(_))
    }

    /// Returns the live item for `id`.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&VisualItem> {
        if self.generation.get(id.idx as usize) != Some(&id.generation) {
            return None;
        }
        match &self.slots[id.idx as usize] {
            Slot::Occupied(item) => Some(item),
            _ => None,
        }
    }

    /// Returns the live item for `id` mutably.
    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut VisualItem> {
        if self.generation.get(id.idx as usize) != Some(&id.generation) {
            return None;
        }
        match &mut self.slots[id.idx as usize] {
            Slot::Occupied(item) => Some(item),
            _ => None,
        }
    }

    /// The registered kind of `class`.
    #[must_use]
    pub fn kind_of(&self, class: ItemClass) -> Option<ItemKind> {
        self.classes.get(&class).map(|p| p.kind)
    }

    /// Number of parked items of `class`.
    #[must_use]
    pub fn parked(&self, class: ItemClass) -> usize {
        self.classes.get(&class).map_or(0, |p| p.parked.len())
    }

    /// Number of live items across all classes.
    #[must_use]
    pub fn live(&self) -> usize {
        self.live
    }

    /// Number of slots ever allocated.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn pool() -> ItemPool {
        let mut pool = ItemPool::new();
        pool.register(ItemClass::NODE, ItemKind::Node, 2).unwrap();
        pool.register(ItemClass::EDGE, ItemKind::Edge, 0).unwrap();
        pool
    }

    #[test]
    fn acquire_unknown_class_fails() {
        let mut pool = pool();
        assert_eq!(
            pool.acquire(ItemClass::AGGREGATE),
            Err(ConfigError::UnknownItemClass(ItemClass::AGGREGATE))
        );
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut pool = pool();
        assert_eq!(
            pool.register(ItemClass::NODE, ItemKind::Node, 1),
            Err(ConfigError::DuplicateItemClass(ItemClass::NODE))
        );
    }

    #[test]
    fn released_item_comes_back_blank() {
        let mut pool = pool();
        let id = pool.acquire(ItemClass::NODE).unwrap();
        {
            let item = pool.get_mut(id).unwrap();
            item.location.end = Point::new(10.0, 10.0);
            item.set_attr("highlighted", true);
            item.set_visible(true);
        }
        assert!(pool.release(id), "first release succeeds");
        assert_eq!(pool.parked(ItemClass::NODE), 1);

        let again = pool.acquire(ItemClass::NODE).unwrap();
        assert_eq!(again.idx, id.idx, "parked slot is reused");
        assert_ne!(again.generation, id.generation);
        assert_eq!(
            pool.get(again),
            Some(&VisualItem::new(ItemClass::NODE, ItemKind::Node))
        );
    }

    #[test]
    fn stale_release_is_rejected() {
        let mut pool = pool();
        let id = pool.acquire(ItemClass::NODE).unwrap();
        assert!(pool.release(id), "first release succeeds");
        assert!(!pool.release(id), "second release is stale");
        assert!(pool.get(id).is_none(), "stale handle resolves to nothing");
        assert_eq!(pool.live(), 0);
    }

    #[test]
    fn free_list_is_bounded() {
        let mut pool = pool();
        let ids: Vec<_> = (0..4)
            .map(|_| pool.acquire(ItemClass::NODE).unwrap())
            .collect();
        for id in ids {
            pool.release(id);
        }
        assert_eq!(pool.parked(ItemClass::NODE), 2);
        assert_eq!(pool.capacity(), 4);

        // A zero-capacity class never parks, but reuses vacant slots.
        let e = pool.acquire(ItemClass::EDGE).unwrap();
        assert!(e.idx < 4, "vacant slot reused");
        pool.release(e);
        assert_eq!(pool.parked(ItemClass::EDGE), 0);
    }
}
