//! Per-biome terrain profiles keyed by [`BiomeType`].

use super::BiomeType;
use crate::curve::{CurveInterpolation, HeightCurve};
use crate::heightmap::HeightmapSettings;
use crate::noise_field::{NoiseParameters, NormalizeMode};

/// How adjacent material layers fade into each other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayerBlend {
    /// Step at each layer's start height.
    Hard,
    #[default]
    Linear,
    Smooth,
}

/// One material band of a biome, from `start_height` (normalised) upward.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainLayer {
    /// Texture identifier resolved by the material layer.
    pub texture: &'static str,
    pub tint: [u8; 3],
    pub start_height: f32,
    /// Height range over which the layer fades in.
    pub blend_strength: f32,
}

/// Terrain shape and material description of one biome.
#[derive(Clone, Debug, PartialEq)]
pub struct BiomeProfile {
    pub heightmap: HeightmapSettings,
    /// Layers ordered by increasing start height.
    pub layers: Vec<TerrainLayer>,
    pub blend: LayerBlend,
}

impl BiomeProfile {
    /// Weight of each layer at a normalised height. Weights sum to 1 unless
    /// there are no layers.
    pub fn layer_weights(&self, height: f32) -> Vec<f32> {
        let draws: Vec<f32> = self
            .layers
            .iter()
            .map(|layer| {
                let half = layer.blend_strength * 0.5;
                let t = if half <= 0.0 || self.blend == LayerBlend::Hard {
                    if height >= layer.start_height { 1.0 } else { 0.0 }
                } else {
                    ((height - layer.start_height + half) / (2.0 * half)).clamp(0.0, 1.0)
                };
                match self.blend {
                    LayerBlend::Smooth => t * t * (3.0 - 2.0 * t),
                    _ => t,
                }
            })
            .collect();

        // Each layer paints over everything below it.
        let mut weights = vec![0.0; draws.len()];
        let mut remaining = 1.0;
        for i in (0..draws.len()).rev() {
            weights[i] = draws[i] * remaining;
            remaining *= 1.0 - draws[i];
        }

        let total: f32 = weights.iter().sum();
        if total > 0.0 {
            weights.iter_mut().for_each(|w| *w /= total);
        } else if let Some(first) = weights.first_mut() {
            *first = 1.0;
        }
        weights
    }
}

/// Lookup from [`BiomeType`] to its [`BiomeProfile`].
#[derive(Clone, Debug)]
pub struct BiomeTable {
    profiles: Vec<BiomeProfile>,
}

impl BiomeTable {
    /// Build a table by evaluating `profile` for every biome.
    pub fn from_fn(mut profile: impl FnMut(BiomeType) -> BiomeProfile) -> Self {
        Self {
            profiles: BiomeType::ALL.iter().map(|&b| profile(b)).collect(),
        }
    }

    /// The built-in profiles, all sharing `seed`.
    pub fn standard(seed: u64) -> Self {
        Self::from_fn(|biome| standard_profile(biome, seed))
    }

    pub fn profile(&self, biome: BiomeType) -> &BiomeProfile {
        &self.profiles[biome.index()]
    }

    pub fn heightmap(&self, biome: BiomeType) -> &HeightmapSettings {
        &self.profile(biome).heightmap
    }

    /// Replace one biome's profile.
    pub fn with_profile(mut self, biome: BiomeType, profile: BiomeProfile) -> Self {
        self.profiles[biome.index()] = profile;
        self
    }

    /// Largest height any biome can produce, used to size shader height ranges.
    pub fn max_height(&self) -> f32 {
        self.profiles
            .iter()
            .map(|p| p.heightmap.max_height())
            .fold(0.0, f32::max)
    }
}

fn layer(texture: &'static str, tint: [u8; 3], start_height: f32) -> TerrainLayer {
    TerrainLayer {
        texture,
        tint,
        start_height,
        blend_strength: 0.1,
    }
}

fn standard_profile(biome: BiomeType, seed: u64) -> BiomeProfile {
    // (scale, octaves, persistence, lacunarity, height multiplier)
    let (scale, octaves, persistence, lacunarity, multiplier) = match biome {
        BiomeType::DeepOcean => (90.0, 3, 0.4, 2.0, 2.0),
        BiomeType::Ocean => (80.0, 4, 0.45, 2.0, 4.0),
        BiomeType::Grassland => (160.0, 5, 0.61, 2.3, 10.0),
        BiomeType::TemperateForest => (120.0, 5, 0.55, 2.1, 14.0),
        BiomeType::Jungle => (100.0, 5, 0.5, 2.2, 12.0),
        BiomeType::Desert => (200.0, 4, 0.45, 2.0, 8.0),
        BiomeType::Mountains => (60.0, 6, 0.61, 2.1, 40.0),
        BiomeType::SnowyPeaks => (50.0, 6, 0.55, 2.2, 55.0),
    };

    let curve = match biome {
        BiomeType::Mountains | BiomeType::SnowyPeaks => HeightCurve::from_keys(
            vec![(0.0, 0.0), (0.4, 0.1), (1.0, 1.0)],
            CurveInterpolation::Linear,
        )
        .unwrap_or_default(),
        BiomeType::Desert => HeightCurve::from_keys(
            vec![(0.0, 0.2), (0.5, 0.5), (1.0, 0.8)],
            CurveInterpolation::Smooth,
        )
        .unwrap_or_default(),
        _ => HeightCurve::linear(),
    };

    let layers = match biome {
        BiomeType::DeepOcean | BiomeType::Ocean => vec![
            layer("silt", [70, 90, 110], 0.0),
            layer("sand", [194, 178, 128], 0.6),
        ],
        BiomeType::Grassland => vec![
            layer("sand", [194, 178, 128], 0.0),
            layer("grass", [96, 160, 64], 0.15),
            layer("rock", [120, 110, 100], 0.8),
        ],
        BiomeType::TemperateForest => vec![
            layer("dirt", [110, 84, 56], 0.0),
            layer("forest_floor", [60, 110, 50], 0.2),
            layer("rock", [120, 110, 100], 0.75),
        ],
        BiomeType::Jungle => vec![
            layer("mud", [90, 70, 40], 0.0),
            layer("jungle_floor", [40, 120, 40], 0.15),
        ],
        BiomeType::Desert => vec![
            layer("sand", [220, 200, 140], 0.0),
            layer("sandstone", [200, 150, 100], 0.7),
        ],
        BiomeType::Mountains => vec![
            layer("grass", [96, 160, 64], 0.0),
            layer("rock", [120, 110, 100], 0.3),
            layer("snow", [240, 240, 250], 0.9),
        ],
        BiomeType::SnowyPeaks => vec![
            layer("rock", [120, 110, 100], 0.0),
            layer("snow", [240, 240, 250], 0.4),
        ],
    };

    BiomeProfile {
        heightmap: HeightmapSettings {
            noise: NoiseParameters {
                seed,
                scale,
                octaves,
                persistence,
                lacunarity,
                normalize_mode: NormalizeMode::Global,
                ..Default::default()
            },
            height_multiplier: multiplier,
            curve,
            falloff: None,
        },
        layers,
        blend: LayerBlend::Linear,
    }
}
