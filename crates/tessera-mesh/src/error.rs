//! Mesh building error types.

/// Configuration errors for mesh settings and LOD requests.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    /// Chunk size index outside the supported table.
    #[error("chunk size index {index} is out of range (0..{count})")]
    UnsupportedChunkSize { index: usize, count: usize },

    /// LOD index outside the supported range.
    #[error("lod {lod} is not supported (maximum {max})")]
    UnsupportedLod { lod: usize, max: usize },

    /// Mesh scale must be a positive finite number.
    #[error("mesh scale must be positive, got {0}")]
    InvalidMeshScale(f32),

    /// Mesh building needs a square heightfield.
    #[error("heightfield must be square, got {width}x{height}")]
    NonSquareHeightfield { width: usize, height: usize },

    /// Too few vertices per line for the border rings.
    #[error("heightfield needs at least 6 vertices per line, got {0}")]
    GridTooSmall(usize),

    /// The LOD skip increment does not divide the interior span.
    #[error("lod {lod} (skip {skip}) does not divide {vertices_per_line} - 5")]
    LodDoesNotDivide {
        lod: usize,
        skip: usize,
        vertices_per_line: usize,
    },
}
