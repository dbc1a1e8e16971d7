// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pipeline-scoped attributes.
//!
//! A [`Pipeline`](crate::pipeline::Pipeline) carries a small typed bag of
//! named values that every one of its actions can read, such as the area a
//! layout should fill or the point a radial transition turns around.

use std::collections::HashMap;

use kurbo::{Point, Rect};

use crate::action::ActionError;
use crate::item::Value;

/// Center for radial transitions and layouts ([`Value::Point`]).
pub const ANCHOR: &str = "anchor";
/// Area layouts place items in ([`Value::Rect`]).
pub const BOUNDS: &str = "bounds";

/// Named values shared by the actions of one pipeline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes {
    values: HashMap<String, Value>,
}

impl Attributes {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value, returning the previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Removes a value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Looks up a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Looks up a point.
    #[must_use]
    pub fn point(&self, key: &str) -> Option<Point> {
        self.get(key).and_then(Value::as_point)
    }

    /// Looks up a rectangle.
    #[must_use]
    pub fn rect(&self, key: &str) -> Option<Rect> {
        self.get(key).and_then(Value::as_rect)
    }

    /// Looks up a rectangle an action cannot work without.
    pub fn require_rect(&self, key: &'static str) -> Result<Rect, ActionError> {
        self.rect(key).ok_or(ActionError::MissingAttribute(key))
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
