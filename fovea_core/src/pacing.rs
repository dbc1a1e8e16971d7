// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pacing functions: reshaping linear animation progress.

/// Steepness of [`Pacing::SlowInSlowOut`].
const SIGMOID_STEEPNESS: f64 = 12.0;

/// Maps linear progress to the fraction handed to interpolators.
///
/// Every variant maps 0 to 0 and 1 to 1, and results are clamped to
/// `[0, 1]`.
#[derive(Clone, Copy, Debug, Default)]
pub enum Pacing {
    /// Progress unchanged.
    #[default]
    Linear,
    /// Logistic ease-in/ease-out.
    SlowInSlowOut,
    /// A caller-supplied monotonic mapping of `[0, 1]` onto `[0, 1]`.
    Custom(fn(f64) -> f64),
}

impl Pacing {
    /// Applies the pacing to linear progress `x`.
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        if x.is_nan() || x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }
        let y = match self {
            Self::Linear => x,
            Self::SlowInSlowOut => {
                let lo = logistic(0.0);
                let hi = logistic(1.0);
                (logistic(x) - lo) / (hi - lo)
            }
            Self::Custom(f) => f(x),
        };
        if y.is_nan() { 0.0 } else { y.clamp(0.0, 1.0) }
    }
}

// Custom pacings compare by function address.
impl PartialEq for Pacing {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Custom(a), Self::Custom(b)) => core::ptr::fn_addr_eq(*a, *b),
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-(SIGMOID_STEEPNESS * x - SIGMOID_STEEPNESS / 2.0)).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ends_are_exact() {
        for p in [
            Pacing::Linear,
            Pacing::SlowInSlowOut,
            Pacing::Custom(|x| x * x),
        ] {
            assert_eq!(p.apply(0.0), 0.0, "{p:?} at 0");
            assert_eq!(p.apply(1.0), 1.0, "{p:?} at 1");
            assert_eq!(p.apply(-2.0), 0.0, "{p:?} below range");
            assert_eq!(p.apply(3.0), 1.0, "{p:?} above range");
        }
    }

    #[test]
    fn sigmoid_is_monotonic_and_symmetric() {
        let mut prev = 0.0;
        for i in 1..100 {
            let x = f64::from(i) / 100.0;
            let y = Pacing::SlowInSlowOut.apply(x);
            assert!(y >= prev, "non-decreasing at {x}");
            prev = y;
        }
        let mid = Pacing::SlowInSlowOut.apply(0.5);
        assert!((mid - 0.5).abs() < 1e-12, "midpoint maps to itself: {mid}");
        assert!(
            Pacing::SlowInSlowOut.apply(0.1) < 0.1,
            "starts slower than linear"
        );
    }

    #[test]
    fn custom_results_are_clamped() {
        let wild = Pacing::Custom(|x| x * 4.0 - 1.0);
        assert_eq!(wild.apply(0.1), 0.0);
        assert_eq!(wild.apply(0.9), 1.0);
        assert_eq!(Pacing::Custom(|_| f64::NAN).apply(0.5), 0.0);
    }
}
