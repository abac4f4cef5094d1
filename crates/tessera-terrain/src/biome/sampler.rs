//! Climate sampling: geography, temperature and rainfall noise fed into the classifier.

use glam::Vec2;

use super::{BiomeType, GeographyType, adjust_temperature, classify, classify_geography};
use crate::error::TerrainError;
use crate::noise_field::{NoiseField, NoiseParameters, NormalizeMode};
use crate::tile::{Neighbor, TileCoord};

/// Inputs for the three climate fields.
#[derive(Clone, Debug, PartialEq)]
pub struct ClimateSettings {
    pub seed: u64,
    /// Feature size of the climate fields in noise cells.
    pub scale: f32,
    pub sea_level: f32,
    pub cooling_factor: f32,
}

impl Default for ClimateSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            scale: 400.0,
            sea_level: super::DEFAULT_SEA_LEVEL,
            cooling_factor: super::DEFAULT_COOLING_FACTOR,
        }
    }
}

/// Climate and classification at one point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiomeSample {
    pub height: f32,
    /// Temperature after elevation adjustment.
    pub temperature: f32,
    pub rainfall: f32,
    pub biome: BiomeType,
    pub geography: GeographyType,
}

/// Samples for a tile centre and its eight neighbours.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileBiomes {
    pub center: BiomeSample,
    pub neighbors: [BiomeSample; 8],
}

impl TileBiomes {
    pub fn neighbor(&self, neighbor: Neighbor) -> &BiomeSample {
        &self.neighbors[neighbor.index()]
    }
}

/// Deterministic climate at any point of the tile grid.
#[derive(Clone, Debug)]
pub struct ClimateSampler {
    geography: NoiseField,
    temperature: NoiseField,
    rainfall: NoiseField,
    sea_level: f32,
    cooling_factor: f32,
    tile_stride: f32,
}

impl ClimateSampler {
    /// `tile_stride` is the distance between tile centres in noise cells.
    pub fn new(settings: &ClimateSettings, tile_stride: f32) -> Result<Self, TerrainError> {
        let field = |salt: u64, octaves: u32| {
            NoiseField::new(NoiseParameters {
                seed: settings.seed.wrapping_add(salt),
                scale: settings.scale,
                octaves,
                persistence: 0.5,
                lacunarity: 2.0,
                normalize_mode: NormalizeMode::Global,
                offset: Vec2::ZERO,
            })
        };
        Ok(Self {
            geography: field(0, 5)?,
            temperature: field(0x5EED_0001, 3)?,
            rainfall: field(0x5EED_0002, 3)?,
            sea_level: settings.sea_level,
            cooling_factor: settings.cooling_factor,
            tile_stride,
        })
    }

    pub fn sea_level(&self) -> f32 {
        self.sea_level
    }

    /// Sample at a point measured in noise cells.
    pub fn sample_point(&self, point: Vec2) -> BiomeSample {
        // Geography noise rarely reaches its extremes; stretch it so every band occurs.
        let height = ((self.geography.value_at(point) - 0.5) * 1.6 + 0.5).clamp(0.0, 1.0);
        let temperature = adjust_temperature(
            self.temperature.value_at(point),
            height,
            self.sea_level,
            self.cooling_factor,
        );
        let rainfall = self.rainfall.value_at(point);
        BiomeSample {
            height,
            temperature,
            rainfall,
            biome: classify(height, temperature, rainfall, self.sea_level),
            geography: classify_geography(height, self.sea_level),
        }
    }

    /// Sample at the centre of a tile.
    pub fn sample_tile(&self, coord: TileCoord) -> BiomeSample {
        self.sample_point(Vec2::new(coord.x as f32, coord.y as f32) * self.tile_stride)
    }

    /// Sample a tile and its eight neighbours.
    pub fn sample_neighborhood(&self, coord: TileCoord) -> TileBiomes {
        TileBiomes {
            center: self.sample_tile(coord),
            neighbors: Neighbor::ALL.map(|n| self.sample_tile(coord.neighbor(n))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler(seed: u64) -> ClimateSampler {
        let settings = ClimateSettings {
            seed,
            scale: 60.0,
            ..Default::default()
        };
        ClimateSampler::new(&settings, 50.0).unwrap()
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let a = sampler(8).sample_tile(TileCoord::new(3, -4));
        let b = sampler(8).sample_tile(TileCoord::new(3, -4));
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_is_consistent_with_classifier() {
        let sampler = sampler(9);
        for x in -5..5 {
            let s = sampler.sample_tile(TileCoord::new(x, 2));
            assert!((0.0..=1.0).contains(&s.height));
            assert!((0.0..=1.0).contains(&s.temperature));
            assert_eq!(s.biome, classify(s.height, s.temperature, s.rainfall, sampler.sea_level()));
            assert_eq!(s.geography, classify_geography(s.height, sampler.sea_level()));
        }
    }

    #[test]
    fn test_neighborhood_matches_individual_tiles() {
        let sampler = sampler(10);
        let coord = TileCoord::new(-1, 1);
        let biomes = sampler.sample_neighborhood(coord);
        assert_eq!(biomes.center, sampler.sample_tile(coord));
        for n in Neighbor::ALL {
            assert_eq!(*biomes.neighbor(n), sampler.sample_tile(coord.neighbor(n)));
        }
    }

    #[test]
    fn test_large_region_has_several_biomes() {
        let sampler = sampler(11);
        let mut seen = std::collections::HashSet::new();
        for y in -20..20 {
            for x in -20..20 {
                seen.insert(sampler.sample_tile(TileCoord::new(x, y)).biome);
            }
        }
        assert!(seen.len() >= 3, "only {seen:?}");
    }
}
