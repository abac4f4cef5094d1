//! Procedural terrain: noise fields, heightmap pipeline, biome classification,
//! and seam stitching between adjacent tiles.
//!
//! Every generator here is a pure function of its inputs, so tiles can be
//! produced on worker threads and combined on the main thread.

mod curve;
mod error;
mod falloff;
mod heightfield;
mod heightmap;
mod noise_field;
mod seam;
mod skirt;
mod tile;

pub mod biome;
pub mod debug_viz;

pub use biome::{
    BiomeProfile, BiomeSample, BiomeTable, BiomeType, ClimateSampler, ClimateSettings,
    GeographyType, TileBiomes, adjust_temperature, classify, classify_geography,
};
pub use curve::{CurveInterpolation, HeightCurve};
pub use error::TerrainError;
pub use falloff::{
    DEFAULT_FALLOFF_A, DEFAULT_FALLOFF_B, FalloffMode, FalloffSettings, FalloffShape,
    falloff_curve, generate_falloff,
};
pub use heightfield::Heightfield;
pub use heightmap::{
    HeightmapSettings, NeighborhoodSettings, blend_neighbor_fields, generate, generate_blended,
};
pub use noise_field::{MIN_NOISE_SCALE, NoiseField, NoiseParameters, NormalizeMode, sample_noise};
pub use seam::{
    CornerStatistic, StitchSettings, TileCoordSet, TileSet, repair_all_corners, repair_corners,
    stitch_edge, stitch_tiles, stitch_tiles_touching, sync_border,
};
pub use skirt::add_skirt;
pub use tile::{Neighbor, Side, TileCoord};
