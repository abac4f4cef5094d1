//! Headless terrain streaming demo.
//!
//! Flies a viewer across the world for a fixed number of ticks, feeding every
//! mesh the streamer produces into a statistics sink, and prints a JSON summary.
//! Run with `cargo run -p tessera-demo -- --ticks 300 --export-dir out` to also
//! write debug PNGs of the tile under the viewer.

mod sink;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Parser;
use glam::Vec2;
use tessera_config::{CliArgs, Config};
use tessera_stream::{ChunkStreamer, StreamerSettings};
use tessera_terrain::{ClimateSampler, FalloffSettings, TileCoord, debug_viz};
use tracing::{error, info, warn};

use crate::sink::StatsSink;

#[derive(Parser, Debug)]
#[command(name = "tessera-demo", about = "Stream procedural terrain around a moving viewer")]
struct DemoArgs {
    #[command(flatten)]
    common: CliArgs,

    /// Number of streaming ticks to run.
    #[arg(long, default_value_t = 600)]
    ticks: u32,

    /// Viewer speed in world units per tick.
    #[arg(long, default_value_t = 2.0)]
    speed: f32,

    /// Sleep between ticks in milliseconds.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,

    /// Keep ticking after the flight until every chunk is displayed.
    #[arg(long)]
    settle: bool,

    /// Write debug PNGs into this directory.
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

/// Gentle S-curve along +x.
fn viewer_at(tick: u32, speed: f32) -> Vec2 {
    let x = tick as f32 * speed;
    Vec2::new(x, (x / 300.0).sin() * 120.0)
}

fn export_debug_images(
    dir: &Path,
    streamer: &ChunkStreamer,
    viewer: Vec2,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(dir)?;
    let settings = streamer.settings();
    let center = TileCoord::from_world(viewer, settings.mesh.mesh_world_size());

    match streamer.heightfield(center) {
        Some(field) => {
            debug_viz::render_heightfield(field).save_png(&dir.join("heightfield.png"))?;
        }
        None => warn!("No heightfield resident at {center}, skipping heightfield.png"),
    }

    let sampler = ClimateSampler::new(&settings.climate, settings.climate_tile_spacing)?;
    let radius = 16;
    debug_viz::render_biome_map(
        &sampler,
        center.offset(-radius, -radius),
        (radius * 2 + 1) as u32,
        (radius * 2 + 1) as u32,
        8,
    )
    .save_png(&dir.join("biomes.png"))?;

    let size = settings.mesh.core_size();
    debug_viz::render_falloff(size, size, &FalloffSettings::default())
        .save_png(&dir.join("falloff.png"))?;

    info!("Debug images written to {}", dir.display());
    Ok(())
}

fn main() {
    let args = DemoArgs::parse();

    let config_dir = args
        .common
        .config
        .clone()
        .or_else(Config::default_dir)
        .unwrap_or_else(|| PathBuf::from(".tessera"));

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args.common);

    let log_dir = config_dir.join("logs");
    tessera_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let settings = match StreamerSettings::from_config(&config) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Invalid streaming configuration: {e}");
            std::process::exit(1);
        }
    };
    info!(
        "Chunk size {} ({} world units), {} detail levels out to {}",
        settings.mesh.chunk_size(),
        settings.mesh.mesh_world_size(),
        settings.detail_levels.levels().len(),
        settings.detail_levels.max_view_distance()
    );

    let mut streamer = match ChunkStreamer::new(settings) {
        Ok(streamer) => streamer,
        Err(e) => {
            error!("Failed to start streamer: {e}");
            std::process::exit(1);
        }
    };
    let mut sink = StatsSink::default();

    let start = Instant::now();
    let mut viewer = Vec2::ZERO;
    let mut refreshes = 0;
    for tick in 0..args.ticks {
        viewer = viewer_at(tick, args.speed);
        let report = streamer.update(viewer, &mut sink);
        if report.refreshed {
            refreshes += 1;
        }
        std::thread::sleep(Duration::from_millis(args.tick_ms));
    }

    if args.settle {
        let deadline = Instant::now() + Duration::from_secs(300);
        while !streamer.is_settled() {
            if Instant::now() > deadline {
                warn!("Streamer did not settle: {:?}", streamer.stats());
                break;
            }
            streamer.update(viewer, &mut sink);
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    let stats = streamer.stats();
    info!(
        "Streamed {} ticks in {:.2?}: {} chunks resident, {} visible",
        stats.ticks,
        start.elapsed(),
        stats.chunks,
        stats.visible
    );

    if let Some(dir) = &args.export_dir {
        if let Err(e) = export_debug_images(dir, &streamer, viewer) {
            error!("Failed to export debug images: {e}");
        }
    }

    streamer.shutdown();

    let summary = serde_json::json!({
        "ticks": stats.ticks,
        "refreshes": refreshes,
        "viewer": [viewer.x, viewer.y],
        "chunks": stats.chunks,
        "visible": stats.visible,
        "pending_stitch": stats.pending_stitch,
        "failed": stats.failed,
        "cached_meshes": stats.cached_meshes,
        "uploads": sink.uploads,
        "releases": sink.releases,
        "uploaded_bytes": sink.uploaded_bytes,
        "visible_triangles": sink.visible_triangles(),
        "sink_visible": sink.visible_count(),
        "lods": sink.lod_histogram(),
        "biomes": sink.biome_histogram(),
    });
    match serde_json::to_string_pretty(&summary) {
        Ok(text) => println!("{text}"),
        Err(e) => error!("Failed to serialize summary: {e}"),
    }
}
