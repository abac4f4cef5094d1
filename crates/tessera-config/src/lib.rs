//! Configuration for the terrain streamer.
//!
//! Settings persist to disk as `config.ron`, tolerate missing and unknown
//! fields, can be hot-reloaded, and accept command-line overrides via clap.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    ClimateConfig, Config, DebugConfig, LodConfig, MeshConfig, StreamConfig, TerrainConfig,
};
pub use error::ConfigError;
