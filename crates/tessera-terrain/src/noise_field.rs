//! Deterministic multi-octave noise fields.
//!
//! Composites octaves of simplex noise into a heightfield. Each octave samples
//! the basis at a seeded random offset so octaves stay decorrelated, and the
//! sample position depends only on the absolute cell position, so adjacent tile
//! windows read one continuous field.
//!
//! Output is always in `[0, 1]`:
//! - [`NormalizeMode::Local`] rescales by the min/max observed in one call.
//! - [`NormalizeMode::Global`] maps `sum / max_amplitude` from `[-1, 1]` to
//!   `[0, 1]`, which is the same mapping for every tile.

use glam::{DVec2, Vec2};
use noise::{NoiseFn, Simplex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::TerrainError;
use crate::heightfield::Heightfield;

/// Smallest scale used when the configured scale is zero or negative.
pub const MIN_NOISE_SCALE: f32 = 1e-4;

/// Per-octave offsets are drawn from `[-OCTAVE_OFFSET_RANGE, OCTAVE_OFFSET_RANGE)`.
const OCTAVE_OFFSET_RANGE: i32 = 100_000;

/// How raw octave sums are mapped into `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NormalizeMode {
    /// Rescale by the min/max actually observed in the generated grid.
    Local,
    /// Rescale by the theoretical maximum amplitude. Consistent across tiles.
    #[default]
    Global,
}

/// Configuration of a fractal noise field.
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseParameters {
    /// Seed for the basis permutation table and the octave offsets.
    pub seed: u64,
    /// Size of the broadest features in cells. Clamped to [`MIN_NOISE_SCALE`].
    pub scale: f32,
    /// Number of octaves composited.
    pub octaves: u32,
    /// Amplitude multiplier between octaves.
    pub persistence: f32,
    /// Frequency multiplier between octaves.
    pub lacunarity: f32,
    /// How octave sums are mapped into `[0, 1]`.
    pub normalize_mode: NormalizeMode,
    /// Constant world-space offset added to every sample position.
    pub offset: Vec2,
}

impl Default for NoiseParameters {
    fn default() -> Self {
        Self {
            seed: 0,
            scale: 50.0,
            octaves: 6,
            persistence: 0.6,
            lacunarity: 2.0,
            normalize_mode: NormalizeMode::Global,
            offset: Vec2::ZERO,
        }
    }
}

impl NoiseParameters {
    /// Check the octave, persistence and lacunarity ranges.
    pub fn validate(&self) -> Result<(), TerrainError> {
        if self.octaves < 1 {
            return Err(TerrainError::InvalidOctaves(self.octaves));
        }
        if !(0.0..=1.0).contains(&self.persistence) {
            return Err(TerrainError::InvalidPersistence(self.persistence));
        }
        if !(self.lacunarity >= 1.0) {
            return Err(TerrainError::InvalidLacunarity(self.lacunarity));
        }
        Ok(())
    }

    /// The scale actually used for sampling.
    pub fn effective_scale(&self) -> f32 {
        self.scale.max(MIN_NOISE_SCALE)
    }

    /// Sum of all octave amplitudes, `sum(persistence^o)`.
    pub fn max_amplitude(&self) -> f64 {
        let persistence = self.persistence as f64;
        let mut amplitude = 1.0;
        let mut total = 0.0;
        for _ in 0..self.octaves {
            total += amplitude;
            amplitude *= persistence;
        }
        total
    }
}

/// A validated, ready-to-sample noise field.
#[derive(Clone, Debug)]
pub struct NoiseField {
    params: NoiseParameters,
    basis: Simplex,
    octave_offsets: Vec<DVec2>,
    max_amplitude: f64,
}

impl NoiseField {
    /// Validate `params` and derive the octave offsets from its seed.
    pub fn new(params: NoiseParameters) -> Result<Self, TerrainError> {
        params.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
        // Drawn from the stream so every bit of the seed reaches the permutation table.
        let basis_seed: u32 = rng.random();
        let octave_offsets = (0..params.octaves)
            .map(|_| {
                let x = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE);
                let y = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE);
                DVec2::new(x as f64, y as f64)
            })
            .collect();

        Ok(Self {
            basis: Simplex::new(basis_seed),
            max_amplitude: params.max_amplitude(),
            params,
            octave_offsets,
        })
    }

    pub fn params(&self) -> &NoiseParameters {
        &self.params
    }

    /// Sum of octave amplitudes used by [`NormalizeMode::Global`].
    pub fn max_amplitude(&self) -> f64 {
        self.max_amplitude
    }

    /// Raw octave sum at a world position, roughly in `[-max_amplitude, max_amplitude]`.
    fn octave_sum(&self, position: DVec2) -> f64 {
        let scale = self.params.effective_scale() as f64;
        let persistence = self.params.persistence as f64;
        let lacunarity = self.params.lacunarity as f64;

        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut sum = 0.0;
        for offset in &self.octave_offsets {
            let p = (position + *offset) / scale * frequency;
            sum += self.basis.get([p.x, p.y]) * amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }
        sum
    }

    fn normalize_global(&self, sum: f64) -> f32 {
        if self.max_amplitude <= 0.0 {
            return 0.5;
        }
        (((sum / self.max_amplitude) + 1.0) * 0.5).clamp(0.0, 1.0) as f32
    }

    /// Globally normalised value at a world-space point.
    ///
    /// Equivalent to the [`NormalizeMode::Global`] output of [`NoiseField::sample`] for
    /// the cell whose position, relative to the window centre, is `point`.
    pub fn value_at(&self, point: Vec2) -> f32 {
        let position = point.as_dvec2() + self.params.offset.as_dvec2();
        self.normalize_global(self.octave_sum(position))
    }

    /// Sample a `width x height` window whose origin cell sits at `tile_offset`.
    ///
    /// Two windows whose offsets differ by `width - 1` along x share one column:
    /// the last column of the first equals the first column of the second.
    pub fn sample(&self, width: usize, height: usize, tile_offset: Vec2) -> Heightfield {
        let half = DVec2::new(width as f64 / 2.0, height as f64 / 2.0);
        let tile_offset = tile_offset.as_dvec2();
        let offset = self.params.offset.as_dvec2();

        let mut raw = Vec::with_capacity(width * height);
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for y in 0..height {
            for x in 0..width {
                // Integer cell position first so shared cells of adjacent windows
                // produce bit-identical inputs.
                let cell = DVec2::new(x as f64, y as f64) + tile_offset;
                let sum = self.octave_sum(cell - half + offset);
                min = min.min(sum);
                max = max.max(sum);
                raw.push(sum);
            }
        }

        let values = match self.params.normalize_mode {
            NormalizeMode::Global => raw.into_iter().map(|s| self.normalize_global(s)).collect(),
            NormalizeMode::Local => {
                let range = max - min;
                raw.into_iter()
                    .map(|s| {
                        if range > 0.0 {
                            ((s - min) / range) as f32
                        } else {
                            0.0
                        }
                    })
                    .collect()
            }
        };
        Heightfield::from_values(width, height, values)
    }
}

/// Validate `params` and sample one window.
pub fn sample_noise(
    width: usize,
    height: usize,
    params: &NoiseParameters,
    tile_offset: Vec2,
) -> Result<Heightfield, TerrainError> {
    Ok(NoiseField::new(params.clone())?.sample(width, height, tile_offset))
}
