//! Command-line overrides for the configuration file.

use std::path::PathBuf;

use clap::Args;

use crate::Config;

/// Configuration overrides shared by every binary.
///
/// Values given here win over those loaded from `config.ron`.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    /// World seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Index into the supported chunk sizes (0 = 48 cells ... 8 = 240 cells).
    #[arg(long)]
    pub chunk_size_index: Option<usize>,

    /// World units per heightfield cell.
    #[arg(long)]
    pub mesh_scale: Option<f32>,

    /// Worker threads for terrain generation (0 = automatic).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.terrain.seed = seed;
        }
        if let Some(index) = args.chunk_size_index {
            self.mesh.chunk_size_index = index;
        }
        if let Some(scale) = args.mesh_scale {
            self.mesh.mesh_scale = scale;
        }
        if let Some(workers) = args.workers {
            self.stream.workers = workers;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
