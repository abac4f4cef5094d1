//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Heightfield generation and stitching.
    pub terrain: TerrainConfig,
    /// Chunk resolution.
    pub mesh: MeshConfig,
    /// Distance-based detail levels.
    pub lod: LodConfig,
    /// Streaming loop behaviour.
    pub stream: StreamConfig,
    /// Biome climate sampling.
    pub climate: ClimateConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Terrain generation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// World seed shared by every noise field.
    pub seed: u64,
    /// Pick per-tile noise settings from the biome table. When off, every
    /// tile uses the noise settings below.
    pub use_biomes: bool,
    /// Noise scale in cells (values <= 0 are clamped).
    pub noise_scale: f32,
    pub octaves: u32,
    pub persistence: f32,
    pub lacunarity: f32,
    /// Normalise noise by its theoretical maximum instead of per tile.
    pub global_normalization: bool,
    pub height_multiplier: f32,
    /// Cells blended toward neighbour-tile samples along each border.
    pub border_blend_width: usize,
    /// Cells on each side of a seam adjusted by the stitcher.
    pub stitch_blend_width: usize,
    /// How shared tile corners are reconciled: "max", "min" or "mean".
    pub corner_statistic: String,
    /// Apply the island falloff mask to every tile.
    pub falloff_enabled: bool,
    pub falloff_a: f32,
    pub falloff_b: f32,
}

/// Mesh resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeshConfig {
    /// Index into the supported chunk sizes.
    pub chunk_size_index: usize,
    /// World units per heightfield cell.
    pub mesh_scale: f32,
}

/// Detail levels as `(lod, visible_distance)`, sorted by distance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LodConfig {
    pub detail_levels: Vec<(usize, f32)>,
}

/// Streaming settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamConfig {
    /// World distance the viewer must move before the visible set is recomputed.
    pub viewer_move_threshold: f32,
    /// Extra tiles kept beyond the view radius before eviction.
    pub retention_radius: u32,
    /// Worker threads (0 = automatic).
    pub workers: usize,
    /// Results delivered per tick (0 = unbounded).
    pub max_results_per_tick: usize,
}

/// Climate sampling for biome selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClimateConfig {
    /// Normalised height below which terrain is water.
    pub sea_level: f32,
    /// Temperature loss per unit of height above sea level.
    pub cooling_factor: f32,
    /// Climate noise scale in climate cells.
    pub scale: f32,
    /// Climate cells between adjacent tile centres.
    pub tile_spacing: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            use_biomes: true,
            noise_scale: 50.0,
            octaves: 6,
            persistence: 0.6,
            lacunarity: 2.0,
            global_normalization: true,
            height_multiplier: 20.0,
            border_blend_width: 6,
            stitch_blend_width: 3,
            corner_statistic: "max".to_string(),
            falloff_enabled: false,
            falloff_a: 3.0,
            falloff_b: 2.3,
        }
    }
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            chunk_size_index: 0,
            mesh_scale: 2.5,
        }
    }
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            detail_levels: vec![(0, 200.0), (1, 400.0), (4, 600.0)],
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            viewer_move_threshold: 25.0,
            retention_radius: 1,
            workers: 0,
            max_results_per_tick: 0,
        }
    }
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            sea_level: 0.2,
            cooling_factor: 0.4,
            scale: 400.0,
            tile_spacing: 50.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// `<platform config dir>/tessera`, if the platform has one.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tessera"))
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
