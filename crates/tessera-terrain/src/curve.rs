//! Keyframed remapping curves applied to normalised noise.

use crate::error::TerrainError;

/// How values between two keys are interpolated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CurveInterpolation {
    #[default]
    Linear,
    /// Smoothstep between keys: zero slope at every key.
    Smooth,
}

/// A piecewise curve mapping a normalised noise value to a shaped height factor.
///
/// Inputs before the first key or after the last key are clamped to those keys.
/// Monotonicity is not required.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightCurve {
    keys: Vec<(f32, f32)>,
    interpolation: CurveInterpolation,
}

impl Default for HeightCurve {
    fn default() -> Self {
        Self::linear()
    }
}

impl HeightCurve {
    /// The identity curve on `[0, 1]`.
    pub fn linear() -> Self {
        Self {
            keys: vec![(0.0, 0.0), (1.0, 1.0)],
            interpolation: CurveInterpolation::Linear,
        }
    }

    /// Build a curve from `(time, value)` keys with strictly increasing times.
    pub fn from_keys(
        keys: Vec<(f32, f32)>,
        interpolation: CurveInterpolation,
    ) -> Result<Self, TerrainError> {
        if keys.is_empty() {
            return Err(TerrainError::EmptyCurve);
        }
        for index in 1..keys.len() {
            if !(keys[index].0 > keys[index - 1].0) {
                return Err(TerrainError::UnsortedCurveKeys { index });
            }
        }
        Ok(Self {
            keys,
            interpolation,
        })
    }

    /// Flat below `sea_level`, rising smoothly to full height above it.
    pub fn sea_floor(sea_level: f32) -> Self {
        let sea_level = sea_level.clamp(0.01, 0.99);
        Self {
            keys: vec![(0.0, 0.0), (sea_level, 0.02), (1.0, 1.0)],
            interpolation: CurveInterpolation::Smooth,
        }
    }

    pub fn keys(&self) -> &[(f32, f32)] {
        &self.keys
    }

    /// Evaluate the curve at `t`.
    pub fn evaluate(&self, t: f32) -> f32 {
        let first = self.keys[0];
        if t <= first.0 {
            return first.1;
        }
        let last = self.keys[self.keys.len() - 1];
        if t >= last.0 {
            return last.1;
        }

        // First key strictly after t; exists because t < last.0.
        let upper = self.keys.partition_point(|&(time, _)| time <= t);
        let (t0, v0) = self.keys[upper - 1];
        let (t1, v1) = self.keys[upper];
        let mut s = (t - t0) / (t1 - t0);
        if self.interpolation == CurveInterpolation::Smooth {
            s = s * s * (3.0 - 2.0 * s);
        }
        v0 + (v1 - v0) * s
    }
}
