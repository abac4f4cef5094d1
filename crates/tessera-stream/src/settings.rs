//! Streamer settings assembled from the configuration file.

use tessera_config::{Config, TerrainConfig};
use tessera_lod::{DetailLevels, LodInfo};
use tessera_mesh::MeshSettings;
use tessera_terrain::{
    BiomeProfile, BiomeTable, ClimateSettings, CornerStatistic, FalloffSettings,
    HeightmapSettings, NoiseParameters, NormalizeMode, StitchSettings,
};

use tracing::warn;

use crate::error::StreamError;

/// Everything the streamer needs, validated.
#[derive(Clone, Debug)]
pub struct StreamerSettings {
    pub mesh: MeshSettings,
    pub detail_levels: DetailLevels,
    /// Per-biome heightmap settings.
    pub biomes: BiomeTable,
    pub climate: ClimateSettings,
    /// Climate cells between adjacent tile centres.
    pub climate_tile_spacing: f32,
    /// Neighbour blend width for heightmap generation (0 disables it).
    pub border_blend_width: usize,
    pub stitch: StitchSettings,
    pub viewer_move_threshold: f32,
    pub retention_radius: u32,
    /// Worker threads (0 = automatic).
    pub workers: usize,
    /// Results delivered per tick (0 = unbounded).
    pub max_results_per_tick: usize,
}

impl Default for StreamerSettings {
    fn default() -> Self {
        let seed = 1;
        Self {
            mesh: MeshSettings::default(),
            detail_levels: DetailLevels::default(),
            biomes: BiomeTable::standard(seed),
            climate: ClimateSettings {
                seed,
                ..ClimateSettings::default()
            },
            climate_tile_spacing: 50.0,
            border_blend_width: 6,
            stitch: StitchSettings::default(),
            viewer_move_threshold: 25.0,
            retention_radius: 1,
            workers: 0,
            max_results_per_tick: 0,
        }
    }
}

/// Parse a corner statistic name.
pub fn parse_corner_statistic(name: &str) -> Result<CornerStatistic, StreamError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "max" => Ok(CornerStatistic::Max),
        "min" => Ok(CornerStatistic::Min),
        "mean" => Ok(CornerStatistic::Mean),
        _ => Err(StreamError::UnknownCornerStatistic(name.to_string())),
    }
}

/// Uniform-noise fields of `terrain` changed from their defaults. The biome
/// table supplies its own noise, so these have no effect while biomes are on.
pub(crate) fn unused_noise_fields(terrain: &TerrainConfig) -> Vec<&'static str> {
    let defaults = TerrainConfig::default();
    let mut fields = Vec::new();
    if terrain.noise_scale != defaults.noise_scale {
        fields.push("noise_scale");
    }
    if terrain.octaves != defaults.octaves {
        fields.push("octaves");
    }
    if terrain.persistence != defaults.persistence {
        fields.push("persistence");
    }
    if terrain.lacunarity != defaults.lacunarity {
        fields.push("lacunarity");
    }
    if terrain.global_normalization != defaults.global_normalization {
        fields.push("global_normalization");
    }
    if terrain.height_multiplier != defaults.height_multiplier {
        fields.push("height_multiplier");
    }
    fields
}

impl StreamerSettings {
    pub fn from_config(config: &Config) -> Result<Self, StreamError> {
        let terrain = &config.terrain;
        let mesh = MeshSettings::new(config.mesh.chunk_size_index, config.mesh.mesh_scale)?;
        let detail_levels = DetailLevels::new(
            config
                .lod
                .detail_levels
                .iter()
                .map(|&(lod, distance)| LodInfo::new(lod, distance))
                .collect(),
        )?;

        let falloff = terrain.falloff_enabled.then(|| FalloffSettings {
            a: terrain.falloff_a,
            b: terrain.falloff_b,
            ..FalloffSettings::default()
        });

        let standard = BiomeTable::standard(terrain.seed);
        let biomes = if terrain.use_biomes {
            let ignored = unused_noise_fields(terrain);
            if !ignored.is_empty() {
                warn!(
                    fields = ?ignored,
                    "terrain noise settings are ignored while use_biomes is on"
                );
            }
            BiomeTable::from_fn(|biome| {
                let mut profile = standard.profile(biome).clone();
                profile.heightmap.falloff = falloff;
                profile
            })
        } else {
            let uniform = HeightmapSettings {
                noise: NoiseParameters {
                    seed: terrain.seed,
                    scale: terrain.noise_scale,
                    octaves: terrain.octaves,
                    persistence: terrain.persistence,
                    lacunarity: terrain.lacunarity,
                    normalize_mode: if terrain.global_normalization {
                        NormalizeMode::Global
                    } else {
                        NormalizeMode::Local
                    },
                    ..NoiseParameters::default()
                },
                height_multiplier: terrain.height_multiplier,
                falloff,
                ..HeightmapSettings::default()
            };
            BiomeTable::from_fn(|biome| BiomeProfile {
                heightmap: uniform.clone(),
                ..standard.profile(biome).clone()
            })
        };

        let settings = Self {
            mesh,
            detail_levels,
            biomes,
            climate: ClimateSettings {
                seed: terrain.seed,
                scale: config.climate.scale,
                sea_level: config.climate.sea_level,
                cooling_factor: config.climate.cooling_factor,
            },
            climate_tile_spacing: config.climate.tile_spacing,
            border_blend_width: terrain.border_blend_width,
            stitch: StitchSettings {
                blend_width: terrain.stitch_blend_width,
                corner: parse_corner_statistic(&terrain.corner_statistic)?,
            },
            viewer_move_threshold: config.stream.viewer_move_threshold,
            retention_radius: config.stream.retention_radius,
            workers: config.stream.workers,
            max_results_per_tick: config.stream.max_results_per_tick,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), StreamError> {
        self.mesh.validate()?;
        for level in self.detail_levels.levels() {
            self.mesh.validate_lod(level.lod)?;
        }
        for biome in tessera_terrain::BiomeType::ALL {
            self.biomes.heightmap(biome).validate()?;
        }

        let core = self.mesh.core_size();
        let blend_limit = core.div_ceil(2);
        if 2 * self.border_blend_width >= core {
            return Err(StreamError::BorderBlendTooWide {
                width: self.border_blend_width,
                limit: blend_limit,
            });
        }
        if self.stitch.blend_width == 0 || self.stitch.blend_width >= core {
            return Err(StreamError::InvalidStitchWidth {
                width: self.stitch.blend_width,
                limit: core,
            });
        }
        if !(self.viewer_move_threshold >= 0.0) {
            return Err(StreamError::InvalidMoveThreshold(self.viewer_move_threshold));
        }
        Ok(())
    }

    /// Tiles created around the viewer in each direction.
    pub fn view_radius_tiles(&self) -> i32 {
        (self.detail_levels.max_view_distance() / self.mesh.mesh_world_size()).round() as i32
    }

    /// Noise cells between adjacent tile origins; tiles share border lines.
    pub fn tile_stride(&self) -> f32 {
        (self.mesh.core_size() - 1) as f32
    }
}
