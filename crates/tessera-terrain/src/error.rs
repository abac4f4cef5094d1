//! Terrain generation error types.

/// Errors produced while validating generation settings or exporting debug output.
#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
    /// Fractal noise needs at least one octave.
    #[error("octave count must be at least 1, got {0}")]
    InvalidOctaves(u32),

    /// Amplitude decay outside `[0, 1]` makes higher octaves dominate.
    #[error("persistence must lie in [0, 1], got {0}")]
    InvalidPersistence(f32),

    /// Frequency must not shrink between octaves.
    #[error("lacunarity must be at least 1, got {0}")]
    InvalidLacunarity(f32),

    /// A height curve was built without any keyframes.
    #[error("height curve needs at least one key")]
    EmptyCurve,

    /// Height curve keyframe times must be strictly increasing.
    #[error("height curve key {index} is not after the previous key")]
    UnsortedCurveKeys {
        /// Index of the first out-of-order key.
        index: usize,
    },

    /// Falloff exponents must be positive for the shaping curve to be defined.
    #[error("falloff exponents must be positive, got a={a}, b={b}")]
    InvalidFalloff {
        /// Steepness exponent.
        a: f32,
        /// Shift of the transition point.
        b: f32,
    },

    /// Failed to write a debug image to disk.
    #[error("failed to write debug image: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to encode a debug image as PNG.
    #[error("failed to encode debug image: {0}")]
    ImageEncode(#[from] png::EncodingError),
}
