//! Streamer error types.

use tessera_lod::LodError;
use tessera_mesh::MeshError;
use tessera_terrain::TerrainError;

/// Invalid streamer configuration.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("terrain settings: {0}")]
    Terrain(#[from] TerrainError),

    #[error("mesh settings: {0}")]
    Mesh(#[from] MeshError),

    #[error("detail levels: {0}")]
    Lod(#[from] LodError),

    /// Corner statistic name not one of "max", "min", "mean".
    #[error("unknown corner statistic {0:?} (expected \"max\", \"min\" or \"mean\")")]
    UnknownCornerStatistic(String),

    /// Border blend width must be less than half the tile size.
    #[error("border blend width {width} must be less than {limit}")]
    BorderBlendTooWide { width: usize, limit: usize },

    /// Stitch blend width must be at least 1 and less than the tile size.
    #[error("stitch blend width {width} must be in 1..{limit}")]
    InvalidStitchWidth { width: usize, limit: usize },

    #[error("viewer move threshold must be non-negative, got {0}")]
    InvalidMoveThreshold(f32),
}
