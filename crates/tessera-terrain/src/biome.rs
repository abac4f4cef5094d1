//! Biome classification, per-biome terrain profiles, and climate sampling.
//!
//! Classification is a pure decision table over height, temperature and
//! rainfall. Each [`BiomeType`] maps to a [`BiomeProfile`] through a
//! [`BiomeTable`] built once at startup and passed to whoever needs it.

mod classify;
mod sampler;
mod table;

pub use classify::{
    BiomeType, DEFAULT_COOLING_FACTOR, DEFAULT_SEA_LEVEL, GeographyType, SNOW_LINE,
    adjust_temperature, classify, classify_geography,
};
pub use sampler::{BiomeSample, ClimateSampler, ClimateSettings, TileBiomes};
pub use table::{BiomeProfile, BiomeTable, LayerBlend, TerrainLayer};
