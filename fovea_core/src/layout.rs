// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout actions: compute target locations.
//!
//! Layouts write `location.end` through [`set_end_location`], which leaves
//! fixed items alone and lets newly visible items grow out of a *referrer*
//! (their tree parent if it has an item, else the layout anchor) instead of
//! flying in from the origin.

use core::f64::consts::TAU;

use kurbo::{Point, Rect, Vec2};

use crate::action::{Action, ActionError, Frame};
use crate::attr;
use crate::item::{ItemClass, ItemId, VisualItem};
use crate::registry::Registry;

/// Sets the target location of `item`.
///
/// Fixed items are not moved. A newly visible item additionally gets its
/// `start` and `current` location set to `seed`.
pub fn set_end_location(item: &mut VisualItem, end: Point, seed: Point) {
    if item.fixed {
        return;
    }
    item.location.end = end;
    if item.is_newly_visible() {
        item.location.start = seed;
        item.location.current = seed;
    }
}

/// Where a newly visible item should appear from: the current location of
/// its parent item, or `fallback` if it has none.
#[must_use]
pub fn referrer_location(registry: &Registry, id: ItemId, fallback: Point) -> Point {
    registry
        .get(id)
        .and_then(VisualItem::node)
        .and_then(|n| n.parent())
        .and_then(|p| registry.get(p))
        .map_or(fallback, |parent| parent.location.current)
}

/// The point a layout centers on: the [`ANCHOR`](attr::ANCHOR) attribute,
/// else the center of `bounds`.
#[must_use]
pub fn layout_anchor(frame: &Frame<'_>, bounds: Rect) -> Point {
    frame.attrs.point(attr::ANCHOR).unwrap_or_else(|| bounds.center())
}

/// Places the visible items of one class evenly on a circle.
///
/// The circle is centered on the layout anchor and sized to fit the
/// [`BOUNDS`](attr::BOUNDS) attribute, which must be set, less the largest
/// item extent reported by the renderer.
#[derive(Clone, Debug)]
pub struct CircleLayout {
    class: ItemClass,
    start_angle: f64,
}

impl Default for CircleLayout {
    fn default() -> Self {
        Self::new(ItemClass::NODE)
    }
}

impl CircleLayout {
    /// Lays out the items of `class`.
    #[must_use]
    pub fn new(class: ItemClass) -> Self {
        Self {
            class,
            start_angle: 0.0,
        }
    }

    /// Sets the angle (radians) of the first item.
    #[must_use]
    pub fn with_start_angle(mut self, angle: f64) -> Self {
        self.start_angle = angle;
        self
    }
}

impl Action for CircleLayout {
    fn name(&self) -> &str {
        "circle-layout"
    }

    fn run(&mut self, registry: &mut Registry, frame: &Frame<'_>) -> Result<(), ActionError> {
        let bounds = frame.attrs.require_rect(attr::BOUNDS)?;
        let center = layout_anchor(frame, bounds);

        let ids: Vec<ItemId> = registry
            .items_of(self.class)?
            .filter(|(_, item)| item.is_visible())
            .map(|(id, _)| id)
            .collect();
        if ids.is_empty() {
            return Ok(());
        }

        let extent = ids
            .iter()
            .filter_map(|&id| registry.bounds(id))
            .map(|r| r.width().max(r.height()))
            .fold(0.0, f64::max);
        let radius = (bounds.width().min(bounds.height()) / 2.0 - extent).max(0.0);
        let step = TAU / ids.len() as f64;

        let seeds: Vec<Point> = ids
            .iter()
            .map(|&id| referrer_location(registry, id, center))
            .collect();
        for (i, (&id, seed)) in ids.iter().zip(seeds).enumerate() {
            let angle = self.start_angle + step * i as f64;
            let end = center + Vec2::from_angle(angle) * radius;
            if let Some(item) = registry.get_mut(id) {
                set_end_location(item, end, seed);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::Attributes;

    fn frame(attrs: &Attributes) -> Frame<'_> {
        Frame {
            fraction: 1.0,
            attrs,
        }
    }

    #[test]
    fn fixed_items_do_not_move() {
        let mut item = VisualItem::new(ItemClass::NODE, crate::item::ItemKind::Node);
        item.fixed = true;
        set_end_location(&mut item, Point::new(5.0, 5.0), Point::ORIGIN);
        assert_eq!(item.location.end, Point::ORIGIN);
    }

    #[test]
    fn circle_needs_bounds() {
        let mut r = Registry::with_default_classes();
        let attrs = Attributes::new();
        let err = CircleLayout::default().run(&mut r, &frame(&attrs));
        assert!(
            matches!(err, Err(ActionError::MissingAttribute(attr::BOUNDS))),
            "bounds required"
        );
    }

    #[test]
    fn circle_places_items_at_equal_distance() {
        let mut r = Registry::with_default_classes();
        let root = r.graph_mut().add_node("root");
        let kids: Vec<_> = (0..4)
            .map(|i| {
                let k = r.graph_mut().add_node(format!("k{i}"));
                r.graph_mut().add_child(root, k);
                k
            })
            .collect();
        let root_item = r.node_item(ItemClass::NODE, root, true).unwrap().unwrap();
        r.get_mut(root_item).unwrap().location.set(Point::new(7.0, 7.0));
        let items: Vec<_> = kids
            .iter()
            .map(|&k| r.node_item(ItemClass::NODE, k, true).unwrap().unwrap())
            .collect();
        r.relink();

        let mut attrs = Attributes::new();
        attrs.set(attr::BOUNDS, Rect::new(0.0, 0.0, 200.0, 100.0));
        CircleLayout::default().run(&mut r, &frame(&attrs)).unwrap();

        let center = Point::new(100.0, 50.0);
        // Default renderer: base radius 5 at size 1, so extent 10.
        for &id in &items {
            let item = r.get(id).unwrap();
            let d = (item.location.end - center).hypot();
            assert!((d - 40.0).abs() < 1e-9, "on the circle: {d}");
            assert_eq!(
                item.location.current,
                Point::new(7.0, 7.0),
                "new children grow out of their parent"
            );
        }
        let root_item = r.get(root_item).unwrap();
        assert_eq!(root_item.location.current, center, "root seeded at center");
    }
}
