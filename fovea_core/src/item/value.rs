// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Free-form attribute values and fonts.

use kurbo::{Point, Rect};

use crate::color::Color;

/// A dynamically typed attribute value.
///
/// Used both for per-item visualization attributes (for example
/// `"highlighted"`) and for pipeline-scoped attributes such as an animation
/// anchor.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A flag.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// A string.
    Text(String),
    /// A 2D point.
    Point(Point),
    /// An axis-aligned rectangle.
    Rect(Rect),
    /// A color.
    Color(Color),
}

impl Value {
    /// Returns the flag, if this is a [`Value::Bool`].
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number, widening integers.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns the string, if this is a [`Value::Text`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the point, if this is a [`Value::Point`].
    #[must_use]
    pub fn as_point(&self) -> Option<Point> {
        match self {
            Self::Point(p) => Some(*p),
            _ => None,
        }
    }

    /// Returns the rectangle, if this is a [`Value::Rect`].
    #[must_use]
    pub fn as_rect(&self) -> Option<Rect> {
        match self {
            Self::Rect(r) => Some(*r),
            _ => None,
        }
    }

    /// Returns the color, if this is a [`Value::Color`].
    #[must_use]
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Point> for Value {
    fn from(v: Point) -> Self {
        Self::Point(v)
    }
}

impl From<Rect> for Value {
    fn from(v: Rect) -> Self {
        Self::Rect(v)
    }
}

impl From<Color> for Value {
    fn from(v: Color) -> Self {
        Self::Color(v)
    }
}

/// A font description.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    /// Font family name.
    pub family: String,
    /// Point size.
    pub size: f64,
    /// Bold weight.
    pub bold: bool,
    /// Italic style.
    pub italic: bool,
}

impl Font {
    /// Creates a regular-weight, upright font.
    #[must_use]
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into(),
            size,
            bold: false,
            italic: false,
        }
    }

    /// Returns this font in bold.
    #[must_use]
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Returns the intermediate font between `start` and `end`.
    ///
    /// The size is blended linearly; family and style switch from `start`
    /// to `end` at the midpoint.
    #[must_use]
    pub fn blend(start: &Self, end: &Self, fraction: f64) -> Self {
        if fraction >= 1.0 {
            return end.clone();
        }
        if fraction <= 0.0 || fraction.is_nan() {
            return start.clone();
        }
        let shape = if fraction < 0.5 { start } else { end };
        Self {
            family: shape.family.clone(),
            size: start.size * (1.0 - fraction) + end.size * fraction,
            bold: shape.bold,
            italic: shape.italic,
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new("SansSerif", 10.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variants() {
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from(3_i64).as_f64(), Some(3.0));
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::from(1.5).as_bool(), None);
        let r = Rect::new(0.0, 0.0, 4.0, 2.0);
        assert_eq!(Value::from(r).as_rect(), Some(r));
    }

    #[test]
    fn font_blend_switches_family_at_midpoint() {
        let a = Font::new("Serif", 10.0);
        let b = Font::new("Mono", 20.0).bold();
        let early = Font::blend(&a, &b, 0.25);
        assert_eq!(early.family, "Serif");
        assert!((early.size - 12.5).abs() < 1e-9, "size was {}", early.size);
        let late = Font::blend(&a, &b, 0.75);
        assert_eq!(late.family, "Mono");
        assert!(late.bold, "end style wins past the midpoint");
        assert_eq!(Font::blend(&a, &b, 1.0), b);
        assert_eq!(Font::blend(&a, &b, 0.0), a);
    }
}
