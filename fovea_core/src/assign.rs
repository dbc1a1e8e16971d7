// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Assignment actions: compute the target visual attributes of items.
//!
//! An assignment writes the `end` value of an attribute for every visible
//! item it covers. Items that became visible this cycle have nothing on
//! screen to animate from, so they get `start` and `current` set to the same
//! value and appear in place.

use core::fmt;

use crate::action::{Action, ActionError, Frame};
use crate::color::Color;
use crate::item::{Font, ItemClass, Tween, VisualItem};
use crate::registry::Registry;

fn assign<T: Clone>(tween: &mut Tween<T>, value: T, newly_visible: bool) {
    if newly_visible {
        tween.set(value);
    } else {
        tween.end = value;
    }
}

fn for_visible(
    registry: &mut Registry,
    class: Option<ItemClass>,
    mut f: impl FnMut(&mut VisualItem),
) -> Result<(), ActionError> {
    let mut visit = |_, item: &mut VisualItem| {
        if item.is_visible() {
            f(item);
        }
    };
    match class {
        Some(class) => registry.for_each_item_of_mut(class, visit)?,
        None => registry.for_each_item_mut(&mut visit),
    }
    Ok(())
}

type ColorFn = Box<dyn Fn(&VisualItem) -> Color + Send>;

/// Assigns stroke and fill colors.
pub struct ColorAssignment {
    class: Option<ItemClass>,
    stroke: ColorFn,
    fill: ColorFn,
}

impl fmt::Debug for ColorAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorAssignment")
            .field("class", &self.class)
            .finish_non_exhaustive()
    }
}

impl ColorAssignment {
    /// Assigns fixed colors to every covered item.
    #[must_use]
    pub fn constant(stroke: Color, fill: Color) -> Self {
        Self::new(move |_| stroke, move |_| fill)
    }

    /// Assigns colors computed per item.
    pub fn new(
        stroke: impl Fn(&VisualItem) -> Color + Send + 'static,
        fill: impl Fn(&VisualItem) -> Color + Send + 'static,
    ) -> Self {
        Self {
            class: None,
            stroke: Box::new(stroke),
            fill: Box::new(fill),
        }
    }

    /// Restricts the assignment to one item class.
    #[must_use]
    pub fn for_class(mut self, class: ItemClass) -> Self {
        self.class = Some(class);
        self
    }
}

impl Action for ColorAssignment {
    fn name(&self) -> &str {
        "color-assignment"
    }

    fn run(&mut self, registry: &mut Registry, _frame: &Frame<'_>) -> Result<(), ActionError> {
        for_visible(registry, self.class, |item| {
            let stroke = (self.stroke)(item);
            let fill = (self.fill)(item);
            let fresh = item.is_newly_visible();
            assign(&mut item.stroke, stroke, fresh);
            assign(&mut item.fill, fill, fresh);
        })
    }
}

/// Assigns sizes.
pub struct SizeAssignment {
    class: Option<ItemClass>,
    size: Box<dyn Fn(&VisualItem) -> f64 + Send>,
}

impl fmt::Debug for SizeAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SizeAssignment")
            .field("class", &self.class)
            .finish_non_exhaustive()
    }
}

impl SizeAssignment {
    /// Assigns one size to every covered item.
    #[must_use]
    pub fn constant(size: f64) -> Self {
        Self::new(move |_| size)
    }

    /// Assigns sizes computed per item.
    pub fn new(size: impl Fn(&VisualItem) -> f64 + Send + 'static) -> Self {
        Self {
            class: None,
            size: Box::new(size),
        }
    }

    /// Restricts the assignment to one item class.
    #[must_use]
    pub fn for_class(mut self, class: ItemClass) -> Self {
        self.class = Some(class);
        self
    }
}

impl Action for SizeAssignment {
    fn name(&self) -> &str {
        "size-assignment"
    }

    fn run(&mut self, registry: &mut Registry, _frame: &Frame<'_>) -> Result<(), ActionError> {
        for_visible(registry, self.class, |item| {
            let size = (self.size)(item);
            let fresh = item.is_newly_visible();
            assign(&mut item.size, size, fresh);
        })
    }
}

/// Assigns label fonts.
pub struct FontAssignment {
    class: Option<ItemClass>,
    font: Box<dyn Fn(&VisualItem) -> Font + Send>,
}

impl fmt::Debug for FontAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontAssignment")
            .field("class", &self.class)
            .finish_non_exhaustive()
    }
}

impl FontAssignment {
    /// Assigns one font to every covered item.
    #[must_use]
    pub fn constant(font: Font) -> Self {
        Self::new(move |_| font.clone())
    }

    /// Assigns fonts computed per item.
    pub fn new(font: impl Fn(&VisualItem) -> Font + Send + 'static) -> Self {
        Self {
            class: None,
            font: Box::new(font),
        }
    }

    /// Restricts the assignment to one item class.
    #[must_use]
    pub fn for_class(mut self, class: ItemClass) -> Self {
        self.class = Some(class);
        self
    }
}

impl Action for FontAssignment {
    fn name(&self) -> &str {
        "font-assignment"
    }

    fn run(&mut self, registry: &mut Registry, _frame: &Frame<'_>) -> Result<(), ActionError> {
        for_visible(registry, self.class, |item| {
            let font = (self.font)(item);
            let fresh = item.is_newly_visible();
            assign(&mut item.font, font, fresh);
        })
    }
}
