// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interpolators: animation actions that blend `start` toward `end`.
//!
//! Every interpolator writes `current = blend(start, end, fraction)` for the
//! items it covers (all classes unless restricted with `for_class`). A
//! fraction of exactly 0 reproduces `start` and exactly 1 reproduces `end`.

use core::f64::consts::TAU;
use std::collections::HashMap;

use kurbo::{Point, Vec2};

use crate::action::{Action, ActionError, ActionKind, Frame};
use crate::attr;
use crate::color::Color;
use crate::item::{Font, ItemClass, VisualItem};
use crate::registry::Registry;

/// Linear blend of two scalars.
#[must_use]
pub fn lerp(start: f64, end: f64, fraction: f64) -> f64 {
    if fraction <= 0.0 {
        start
    } else if fraction >= 1.0 {
        end
    } else {
        start + fraction * (end - start)
    }
}

/// Linear blend of two points.
#[must_use]
pub fn lerp_point(start: Point, end: Point, fraction: f64) -> Point {
    Point::new(
        lerp(start.x, end.x, fraction),
        lerp(start.y, end.y, fraction),
    )
}

/// Blend of two angles (radians) along the shorter of two paths.
///
/// The raw difference `end - start` is compared with the difference after
/// normalizing both angles into `[0, 2π)`; whichever has the smaller
/// magnitude is used.
#[must_use]
pub fn lerp_angle(start: f64, end: f64, fraction: f64) -> f64 {
    if fraction <= 0.0 {
        return start;
    }
    if fraction >= 1.0 {
        return end;
    }
    let raw = end - start;
    let ns = start.rem_euclid(TAU);
    let normalized = end.rem_euclid(TAU) - ns;
    if raw.abs() <= normalized.abs() {
        start + fraction * raw
    } else {
        ns + fraction * normalized
    }
}

fn covers(class: Option<ItemClass>, item: &VisualItem) -> bool {
    class.is_none_or(|c| c == item.class())
}

macro_rules! class_filter {
    ($ty:ident) => {
        impl $ty {
            /// Restricts the interpolator to one item class.
            #[must_use]
            pub fn for_class(mut self, class: ItemClass) -> Self {
                self.class = Some(class);
                self
            }
        }
    };
}

/// Blends item locations. Fixed items are left alone.
#[derive(Clone, Debug, Default)]
pub struct LocationInterpolator {
    class: Option<ItemClass>,
}

impl LocationInterpolator {
    /// Covers all classes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

class_filter!(LocationInterpolator);

impl Action for LocationInterpolator {
    fn name(&self) -> &str {
        "location-interpolator"
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Animation
    }

    fn run(&mut self, registry: &mut Registry, frame: &Frame<'_>) -> Result<(), ActionError> {
        let class = self.class;
        registry.for_each_item_mut(|_, item| {
            if item.fixed || !covers(class, item) {
                return;
            }
            item.location.current =
                lerp_point(item.location.start, item.location.end, frame.fraction);
        });
        Ok(())
    }
}

/// Blends item locations in polar coordinates about the
/// [`ANCHOR`](attr::ANCHOR) attribute, turning along the shorter arc.
///
/// Without an anchor the origin is used. Fixed items are left alone.
#[derive(Clone, Debug, Default)]
pub struct PolarLocationInterpolator {
    class: Option<ItemClass>,
}

impl PolarLocationInterpolator {
    /// Covers all classes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

class_filter!(PolarLocationInterpolator);

impl Action for PolarLocationInterpolator {
    fn name(&self) -> &str {
        "polar-location-interpolator"
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Animation
    }

    fn run(&mut self, registry: &mut Registry, frame: &Frame<'_>) -> Result<(), ActionError> {
        let class = self.class;
        let anchor = frame.attrs.point(attr::ANCHOR).unwrap_or(Point::ORIGIN);
        let f = frame.fraction;
        registry.for_each_item_mut(|_, item| {
            if item.fixed || !covers(class, item) {
                return;
            }
            let loc = &mut item.location;
            loc.current = if f <= 0.0 {
                loc.start
            } else if f >= 1.0 {
                loc.end
            } else {
                let s = loc.start - anchor;
                let e = loc.end - anchor;
                let angle = lerp_angle(s.atan2(), e.atan2(), f);
                let radius = lerp(s.hypot(), e.hypot(), f);
                anchor + Vec2::from_angle(angle) * radius
            };
        });
        Ok(())
    }
}

/// Blends stroke and fill colors.
///
/// Many items usually share the same start/end pair, so blends are memoized
/// per frame.
#[derive(Clone, Debug, Default)]
pub struct ColorInterpolator {
    class: Option<ItemClass>,
    cache: HashMap<(Color, Color), Color>,
    cached_fraction: f64,
}

impl ColorInterpolator {
    /// Memo entries kept before the cache is flushed.
    pub const CACHE_LIMIT: usize = 128;

    /// Covers all classes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn blend(&mut self, start: Color, end: Color, fraction: f64) -> Color {
        if start == end {
            return start;
        }
        if self.cache.len() >= Self::CACHE_LIMIT {
            self.cache.clear();
        }
        *self
            .cache
            .entry((start, end))
            .or_insert_with(|| Color::blend(start, end, fraction))
    }
}

class_filter!(ColorInterpolator);

impl Action for ColorInterpolator {
    fn name(&self) -> &str {
        "color-interpolator"
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Animation
    }

    fn run(&mut self, registry: &mut Registry, frame: &Frame<'_>) -> Result<(), ActionError> {
        let f = frame.fraction;
        if f.to_bits() != self.cached_fraction.to_bits() {
            self.cache.clear();
            self.cached_fraction = f;
        }
        let class = self.class;
        registry.for_each_item_mut(|_, item| {
            if !covers(class, item) {
                return;
            }
            item.stroke.current = self.blend(item.stroke.start, item.stroke.end, f);
            item.fill.current = self.blend(item.fill.start, item.fill.end, f);
        });
        Ok(())
    }
}

/// Blends item sizes.
#[derive(Clone, Debug, Default)]
pub struct SizeInterpolator {
    class: Option<ItemClass>,
}

impl SizeInterpolator {
    /// Covers all classes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

class_filter!(SizeInterpolator);

impl Action for SizeInterpolator {
    fn name(&self) -> &str {
        "size-interpolator"
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Animation
    }

    fn run(&mut self, registry: &mut Registry, frame: &Frame<'_>) -> Result<(), ActionError> {
        let class = self.class;
        registry.for_each_item_mut(|_, item| {
            if covers(class, item) {
                item.size.current = lerp(item.size.start, item.size.end, frame.fraction);
            }
        });
        Ok(())
    }
}

/// Blends fonts: size continuously, family and style at the midpoint.
#[derive(Clone, Debug, Default)]
pub struct FontInterpolator {
    class: Option<ItemClass>,
}

impl FontInterpolator {
    /// Covers all classes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

class_filter!(FontInterpolator);

impl Action for FontInterpolator {
    fn name(&self) -> &str {
        "font-interpolator"
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Animation
    }

    fn run(&mut self, registry: &mut Registry, frame: &Frame<'_>) -> Result<(), ActionError> {
        let class = self.class;
        registry.for_each_item_mut(|_, item| {
            if covers(class, item) && item.font.start != item.font.end {
                item.font.current = Font::blend(&item.font.start, &item.font.end, frame.fraction);
            } else if covers(class, item) {
                item.font.finish();
            }
        });
        Ok(())
    }
}

/// Blends aggregate orientation: angle along the shorter arc, radius
/// linearly.
#[derive(Clone, Debug, Default)]
pub struct AggregateOrientationInterpolator {
    class: Option<ItemClass>,
}

impl AggregateOrientationInterpolator {
    /// Covers all aggregate classes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

class_filter!(AggregateOrientationInterpolator);

impl Action for AggregateOrientationInterpolator {
    fn name(&self) -> &str {
        "aggregate-orientation-interpolator"
    }

    fn kind(&self) -> ActionKind {
        ActionKind::Animation
    }

    fn run(&mut self, registry: &mut Registry, frame: &Frame<'_>) -> Result<(), ActionError> {
        let class = self.class;
        let f = frame.fraction;
        registry.for_each_item_mut(|_, item| {
            if !covers(class, item) {
                return;
            }
            if let Some(agg) = item.aggregate_mut() {
                agg.angle.current = lerp_angle(agg.angle.start, agg.angle.end, f);
                agg.radius.current = lerp(agg.radius.start, agg.radius.end, f);
            }
        });
        Ok(())
    }
}
