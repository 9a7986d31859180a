//! Interpolation of scroll progress into output values
//!
//! An [`InterpolationRange`] is a declarative mapping table from an input
//! ratio to an output value: a strictly ascending `domain` and one value per
//! domain stop. Sampling is piecewise-linear between stops and clamped at both
//! ends, so inputs outside the domain never extrapolate.

use glide_core::Color;
use thiserror::Error;

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

// ============================================================================
// f32 Implementation
// ============================================================================

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

// ============================================================================
// Color Implementation
// ============================================================================

impl Interpolate for Color {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Color::lerp(self, other, t)
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.r - other.r).abs() < epsilon
            && (self.g - other.g).abs() < epsilon
            && (self.b - other.b).abs() < epsilon
            && (self.a - other.a).abs() < epsilon
    }
}

// ============================================================================
// Interpolation Ranges
// ============================================================================

/// Why an interpolation table was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RangeError {
    #[error("interpolation needs at least 2 stops, got {0}")]
    TooFewStops(usize),

    #[error("domain has {domain} stops but {values} values were given")]
    LengthMismatch { domain: usize, values: usize },

    #[error("domain stop {0} is not finite")]
    NonFiniteDomain(usize),

    #[error("domain stop {0} is not greater than the stop before it")]
    UnorderedDomain(usize),
}

/// A piecewise-linear mapping from an input ratio to values of type T
#[derive(Clone, Debug, PartialEq)]
pub struct InterpolationRange<T: Interpolate> {
    domain: Vec<f32>,
    values: Vec<T>,
}

impl<T: Interpolate> InterpolationRange<T> {
    /// Create a mapping table
    ///
    /// `domain` must hold at least two finite, strictly ascending stops and
    /// `values` one value per stop.
    pub fn new(
        domain: impl Into<Vec<f32>>,
        values: impl Into<Vec<T>>,
    ) -> Result<Self, RangeError> {
        let domain = domain.into();
        let values = values.into();

        if domain.len() != values.len() {
            return Err(RangeError::LengthMismatch {
                domain: domain.len(),
                values: values.len(),
            });
        }
        if domain.len() < 2 {
            return Err(RangeError::TooFewStops(domain.len()));
        }
        if let Some(i) = domain.iter().position(|d| !d.is_finite()) {
            return Err(RangeError::NonFiniteDomain(i));
        }
        if let Some(i) = (1..domain.len()).find(|&i| domain[i] <= domain[i - 1]) {
            return Err(RangeError::UnorderedDomain(i));
        }

        Ok(Self { domain, values })
    }

    /// A single-segment mapping
    pub fn linear(from: (f32, f32), to: (T, T)) -> Result<Self, RangeError> {
        Self::new(vec![from.0, from.1], vec![to.0, to.1])
    }

    pub fn domain(&self) -> &[f32] {
        &self.domain
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Sample the mapping at `input`
    ///
    /// Inputs at or beyond the domain ends return the end values exactly, and
    /// an input landing on a stop returns that stop's value exactly. NaN
    /// samples as the first stop.
    pub fn sample(&self, input: f32) -> T {
        let last = self.domain.len() - 1;

        // `!(a > b)` also routes NaN here
        if !(input > self.domain[0]) {
            return self.values[0].clone();
        }
        if input >= self.domain[last] {
            return self.values[last].clone();
        }

        // First stop greater than input; always in 1..=last here
        let upper = self.domain.partition_point(|&d| d <= input);
        let lower = upper - 1;

        if input == self.domain[lower] {
            return self.values[lower].clone();
        }

        let span = self.domain[upper] - self.domain[lower];
        let t = (input - self.domain[lower]) / span;
        self.values[lower].lerp(&self.values[upper], t)
    }
}

/// Remap `value` from the `from` range onto the `to` range, clamped
///
/// A degenerate `from` range acts as a step at its position.
pub fn remap(value: f32, from: (f32, f32), to: (f32, f32)) -> f32 {
    let (lo, hi) = from;
    let span = hi - lo;
    if span.abs() < f32::EPSILON {
        return if value >= lo { to.1 } else { to.0 };
    }
    let t = ((value - lo) / span).clamp(0.0, 1.0);
    if t.is_nan() {
        return to.0;
    }
    to.0.lerp(&to.1, t)
}
