// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contracts for the drawing side.
//!
//! Drawing itself lives outside this crate. The core only needs two
//! capabilities from it:
//!
//! - **Bounds** — a [`Renderer`] reports the screen-space box an item
//!   occupies. Layouts use it to keep items inside their area; hit testing
//!   uses it to find the item under the pointer.
//! - **Repaint** — a [`RepaintSink`] is poked once per pipeline batch or
//!   animation tick. It should only schedule a redraw (for instance by
//!   waking the UI event loop); it is called from scheduler threads.

use kurbo::{Point, Rect, Size};

use crate::item::{ItemKind, VisualItem};

/// Reports the screen-space extent of items.
pub trait Renderer: Send {
    /// Returns the bounding box of `item` at its current location.
    fn bounds(&self, item: &VisualItem) -> Rect;

    /// Whether `point` hits `item`.
    fn contains(&self, item: &VisualItem, point: Point) -> bool {
        self.bounds(item).contains(point)
    }
}

/// Draws every node and aggregate as a circle of `base_radius * size`.
///
/// Edges report an empty box at their location.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DefaultRenderer {
    /// Radius of an item with size 1.
    pub base_radius: f64,
}

impl DefaultRenderer {
    /// Base radius used by [`Default`].
    pub const DEFAULT_RADIUS: f64 = 5.0;
}

impl Default for DefaultRenderer {
    fn default() -> Self {
        Self {
            base_radius: Self::DEFAULT_RADIUS,
        }
    }
}

impl Renderer for DefaultRenderer {
    fn bounds(&self, item: &VisualItem) -> Rect {
        let center = item.location.current;
        match item.item_kind() {
            ItemKind::Edge => Rect::from_center_size(center, Size::ZERO),
            ItemKind::Node | ItemKind::Aggregate => {
                let d = 2.0 * self.base_radius * item.size.current.max(0.0);
                Rect::from_center_size(center, Size::new(d, d))
            }
        }
    }
}

/// Receives repaint requests.
pub trait RepaintSink: Send + Sync {
    /// Requests that the display be redrawn soon.
    fn repaint(&self);
}

impl<F: Fn() + Send + Sync> RepaintSink for F {
    fn repaint(&self) {
        self();
    }
}

/// A [`RepaintSink`] that ignores every request.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoRepaint;

impl RepaintSink for NoRepaint {
    fn repaint(&self) {}
}
