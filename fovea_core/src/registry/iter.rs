// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered iteration and render-time snapshots.

use core::cmp::Ordering;

use kurbo::{Point, Rect};

use crate::color::Color;
use crate::item::{Font, ItemClass, ItemId, ItemKind, VisualItem};
use crate::pool::ItemPool;

/// Total order used for drawing (back to front).
pub trait ItemComparator: Send {
    /// Compares two items.
    fn compare(&self, a: &VisualItem, b: &VisualItem) -> Ordering;
}

impl<F> ItemComparator for F
where
    F: Fn(&VisualItem, &VisualItem) -> Ordering + Send,
{
    fn compare(&self, a: &VisualItem, b: &VisualItem) -> Ordering {
        self(a, b)
    }
}

/// Aggregates first, then edges, then nodes. Within a kind, highlighted
/// items come after the rest, then ascending degree of interest.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultComparator;

const fn kind_rank(kind: ItemKind) -> u8 {
    match kind {
        ItemKind::Aggregate => 0,
        ItemKind::Edge => 1,
        ItemKind::Node => 2,
    }
}

impl ItemComparator for DefaultComparator {
    fn compare(&self, a: &VisualItem, b: &VisualItem) -> Ordering {
        kind_rank(a.item_kind())
            .cmp(&kind_rank(b.item_kind()))
            .then(a.highlighted.cmp(&b.highlighted))
            .then(a.doi.total_cmp(&b.doi))
    }
}

/// Iterator over all items in comparator order.
///
/// Merges the (already sorted) class lists; ties go to the class declared
/// first.
pub struct Items<'a> {
    lists: Vec<&'a [ItemId]>,
    cursors: Vec<usize>,
    pool: &'a ItemPool,
    comparator: &'a dyn ItemComparator,
}

impl core::fmt::Debug for Items<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Items")
            .field("lists", &self.lists.len())
            .finish_non_exhaustive()
    }
}

impl<'a> Items<'a> {
    pub(crate) fn new(
        lists: Vec<&'a [ItemId]>,
        pool: &'a ItemPool,
        comparator: &'a dyn ItemComparator,
    ) -> Self {
        let cursors = vec![0; lists.len()];
        Self {
            lists,
            cursors,
            pool,
            comparator,
        }
    }

    fn head(&self, list: usize) -> Option<(ItemId, &'a VisualItem)> {
        let id = *self.lists[list].get(self.cursors[list])?;
        self.pool.get(id).map(|item| (id, item))
    }
}

impl<'a> Iterator for Items<'a> {
    type Item = (ItemId, &'a VisualItem);

    fn next(&mut self) -> Option<Self::Item> {
        let mut best: Option<(usize, ItemId, &'a VisualItem)> = None;
        for list in 0..self.lists.len() {
            let Some((id, item)) = self.head(list) else {
                continue;
            };
            let better = match best {
                None => true,
                Some((_, _, b)) => self.comparator.compare(item, b) == Ordering::Less,
            };
            if better {
                best = Some((list, id, item));
            }
        }
        let (list, id, item) = best?;
        self.cursors[list] += 1;
        Some((id, item))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self
            .lists
            .iter()
            .zip(&self.cursors)
            .map(|(l, &c)| l.len().saturating_sub(c))
            .sum();
        (rest, Some(rest))
    }
}

/// A render-time copy of a visible item.
///
/// Renderers draw from snapshots so that they need not hold the registry
/// lock while painting.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemSnapshot {
    /// Handle of the item the snapshot was taken from.
    pub id: ItemId,
    /// Item class.
    pub class: ItemClass,
    /// Item variant.
    pub kind: ItemKind,
    /// Current location.
    pub location: Point,
    /// Current stroke color.
    pub stroke: Color,
    /// Current fill color.
    pub fill: Color,
    /// Current size.
    pub size: f64,
    /// Current font.
    pub font: Font,
    /// Highlight flag.
    pub highlighted: bool,
    /// Degree of interest.
    pub doi: f64,
    /// Bounds reported by the installed renderer.
    pub bounds: Rect,
    /// Current endpoint locations, for edges.
    pub endpoints: Option<(Point, Point)>,
}

impl ItemSnapshot {
    pub(crate) fn capture(id: ItemId, item: &VisualItem, bounds: Rect, pool: &ItemPool) -> Self {
        let endpoints = item.edge().and_then(|e| {
            let s = pool.get(e.source())?;
            let t = pool.get(e.target())?;
            Some((s.location.current, t.location.current))
        });
        Self {
            id,
            class: item.class(),
            kind: item.item_kind(),
            location: item.location.current,
            stroke: item.stroke.current,
            fill: item.fill.current,
            size: item.size.current,
            font: item.font.current.clone(),
            highlighted: item.highlighted,
            doi: item.doi,
            bounds,
            endpoints,
        }
    }
}
