//! Edge falloff masks for island-style tiles.
//!
//! The mask is 0 at the tile centre and rises to 1 at the edge, shaped by
//! `f(t) = t^a / (t^a + (b - b*t)^a)`.

use crate::error::TerrainError;
use crate::heightfield::Heightfield;

pub const DEFAULT_FALLOFF_A: f32 = 3.0;
pub const DEFAULT_FALLOFF_B: f32 = 2.3;

/// Distance metric from the tile centre.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FalloffShape {
    /// Chebyshev distance: `max(|x|, |y|)`.
    #[default]
    Square,
    /// Euclidean distance scaled so the corners reach 1.
    Radial,
}

/// How the mask is applied to heights.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FalloffMode {
    /// `height *= 1 - f`
    #[default]
    Multiply,
    /// `height -= f * height_multiplier`
    Subtract,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FalloffSettings {
    pub shape: FalloffShape,
    pub mode: FalloffMode,
    /// Steepness of the transition.
    pub a: f32,
    /// Position of the transition; larger pushes it toward the edge.
    pub b: f32,
}

impl Default for FalloffSettings {
    fn default() -> Self {
        Self {
            shape: FalloffShape::Square,
            mode: FalloffMode::Multiply,
            a: DEFAULT_FALLOFF_A,
            b: DEFAULT_FALLOFF_B,
        }
    }
}

impl FalloffSettings {
    pub fn validate(&self) -> Result<(), TerrainError> {
        if !(self.a > 0.0 && self.b > 0.0) {
            return Err(TerrainError::InvalidFalloff {
                a: self.a,
                b: self.b,
            });
        }
        Ok(())
    }

    /// Apply a mask value `f` to `height`.
    #[inline]
    pub fn apply(&self, height: f32, f: f32, height_multiplier: f32) -> f32 {
        match self.mode {
            FalloffMode::Multiply => height * (1.0 - f),
            FalloffMode::Subtract => height - f * height_multiplier,
        }
    }
}

/// The shaping curve, with `t` clamped to `[0, 1]`.
#[inline]
pub fn falloff_curve(t: f32, a: f32, b: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let ta = libm::powf(t, a);
    let denom = ta + libm::powf(b - b * t, a);
    if denom <= 0.0 { 0.0 } else { ta / denom }
}

/// Generate a `width x height` mask.
pub fn generate_falloff(width: usize, height: usize, settings: &FalloffSettings) -> Heightfield {
    Heightfield::from_fn(width, height, |x, y| {
        let u = centered(x, width);
        let v = centered(y, height);
        let t = match settings.shape {
            FalloffShape::Square => u.abs().max(v.abs()),
            FalloffShape::Radial => libm::sqrtf(u * u + v * v) / std::f32::consts::SQRT_2,
        };
        falloff_curve(t, settings.a, settings.b)
    })
}

/// Map `i` in `0..n` to `[-1, 1]`.
fn centered(i: usize, n: usize) -> f32 {
    if n < 2 {
        return 0.0;
    }
    i as f32 / (n - 1) as f32 * 2.0 - 1.0
}
