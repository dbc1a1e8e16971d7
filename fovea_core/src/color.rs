// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 8-bit RGBA colors.

use core::fmt;

/// An 8-bit-per-channel RGBA color (straight alpha).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Opacity, 0 transparent to 255 opaque.
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Creates an opaque color.
    #[inline]
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Creates a color with the given opacity.
    #[inline]
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque gray.
    #[inline]
    #[must_use]
    pub const fn gray(v: u8) -> Self {
        Self::rgb(v, v, v)
    }

    /// Returns this color with a different opacity.
    #[inline]
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Blends component-wise from `start` to `end`, opacity included.
    ///
    /// Each channel is clamped to `0..=255`. A fraction of exactly 0 returns
    /// `start` and exactly 1 returns `end`; fractions outside `[0, 1]` are
    /// clamped.
    #[must_use]
    pub fn blend(start: Self, end: Self, fraction: f64) -> Self {
        if fraction <= 0.0 || fraction.is_nan() {
            return start;
        }
        if fraction >= 1.0 {
            return end;
        }
        Self {
            r: blend_channel(start.r, end.r, fraction),
            g: blend_channel(start.g, end.g, fraction),
            b: blend_channel(start.b, end.b, fraction),
            a: blend_channel(start.a, end.a, fraction),
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "value is rounded and clamped to the u8 range first"
)]
fn blend_channel(start: u8, end: u8, fraction: f64) -> u8 {
    let s = f64::from(start);
    let e = f64::from(end);
    (s + fraction * (e - s)).round().clamp(0.0, 255.0) as u8
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            self.r, self.g, self.b, self.a
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_exact() {
        let a = Color::rgba(10, 20, 30, 40);
        let b = Color::rgba(200, 100, 0, 255);
        assert_eq!(Color::blend(a, b, 0.0), a);
        assert_eq!(Color::blend(a, b, 1.0), b);
    }

    #[test]
    fn midpoint_rounds() {
        let c = Color::blend(Color::BLACK, Color::WHITE, 0.5);
        assert_eq!(c, Color::rgb(128, 128, 128));
    }

    #[test]
    fn channels_stay_in_range_for_any_fraction() {
        let pairs = [
            (Color::BLACK, Color::WHITE),
            (Color::WHITE, Color::TRANSPARENT),
            (Color::rgba(255, 0, 255, 0), Color::rgba(0, 255, 0, 255)),
        ];
        for (a, b) in pairs {
            for step in 0..=100 {
                let f = f64::from(step) / 100.0;
                let c = Color::blend(a, b, f);
                for (lo, hi, v) in [(a.r, b.r, c.r), (a.g, b.g, c.g), (a.a, b.a, c.a)] {
                    assert!(
                        v >= lo.min(hi) && v <= lo.max(hi),
                        "channel {v} escaped [{lo}, {hi}] at {f}"
                    );
                }
            }
        }
    }

    #[test]
    fn out_of_range_fractions_clamp() {
        let a = Color::gray(10);
        let b = Color::gray(20);
        assert_eq!(Color::blend(a, b, -3.0), a);
        assert_eq!(Color::blend(a, b, 7.0), b);
        assert_eq!(Color::blend(a, b, f64::NAN), a);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_color() -> impl Strategy<Value = Color> {
        any::<[u8; 4]>().prop_map(|[r, g, b, a]| Color::rgba(r, g, b, a))
    }

    fn between(v: u8, a: u8, b: u8) -> bool {
        a.min(b) <= v && v <= a.max(b)
    }

    proptest! {
        #[test]
        fn blend_stays_between_its_endpoints(
            start in arb_color(),
            end in arb_color(),
            fraction in 0.0..=1.0_f64,
        ) {
            let c = Color::blend(start, end, fraction);
            prop_assert!(between(c.r, start.r, end.r), "red {} outside {:?}..{:?}", c.r, start, end);
            prop_assert!(between(c.g, start.g, end.g), "green {} outside {:?}..{:?}", c.g, start, end);
            prop_assert!(between(c.b, start.b, end.b), "blue {} outside {:?}..{:?}", c.b, start, end);
            prop_assert!(between(c.a, start.a, end.a), "alpha {} outside {:?}..{:?}", c.a, start, end);
        }

        #[test]
        fn blend_is_exact_at_the_ends(start in arb_color(), end in arb_color()) {
            prop_assert_eq!(Color::blend(start, end, 0.0), start);
            prop_assert_eq!(Color::blend(start, end, 1.0), end);
        }
    }
}
