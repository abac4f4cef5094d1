//! The streaming loop: which tiles exist, what they need next, and what is shown.

use std::sync::Arc;

use glam::Vec2;
use rustc_hash::FxHashMap;
use tessera_lod::{RequestQueue, distance_to_tile_bounds, request_priority};
use tessera_mesh::{MeshData, MeshError, build_terrain_mesh};
use tessera_tasks::ComputeScheduler;
use tessera_terrain::{
    ClimateSampler, Heightfield, HeightmapSettings, Neighbor, NeighborhoodSettings, TerrainError,
    TileBiomes, TileCoord, TileCoordSet, TileSet, add_skirt, generate_blended,
    stitch_tiles_touching,
};
use tracing::{debug, error, trace};

use crate::chunk::{Chunk, ChunkPhase};
use crate::error::StreamError;
use crate::settings::StreamerSettings;
use crate::sink::MeshSink;

/// State mutated by task callbacks on the driving thread.
#[derive(Default)]
pub(crate) struct StreamState {
    chunks: FxHashMap<TileCoord, Chunk>,
    heights: TileSet,
    next_generation: u64,
}

impl StreamState {
    fn live_chunk(&mut self, coord: TileCoord, generation: u64, what: &str) -> Option<&mut Chunk> {
        let chunk = self
            .chunks
            .get_mut(&coord)
            .filter(|chunk| chunk.generation == generation);
        if chunk.is_none() {
            trace!(tile = %coord, generation, result = what, "discarding stale result");
        }
        chunk
    }

    fn on_climate(&mut self, coord: TileCoord, generation: u64, biomes: TileBiomes) {
        let Some(chunk) = self.live_chunk(coord, generation, "climate") else {
            return;
        };
        chunk.biomes = Some(biomes);
        chunk.phase = ChunkPhase::ClimateReady;
        chunk.task_in_flight = false;
    }

    fn on_heightfield(
        &mut self,
        coord: TileCoord,
        generation: u64,
        result: Result<Heightfield, TerrainError>,
    ) {
        let Some(chunk) = self.live_chunk(coord, generation, "heightfield") else {
            return;
        };
        chunk.task_in_flight = false;
        match result {
            Ok(field) => {
                chunk.phase = ChunkPhase::HeightfieldReady;
                chunk.pending_stitch = true;
                chunk.invalidate_meshes();
                self.heights.insert(coord, field);
            }
            Err(err) => {
                error!(tile = %coord, %err, "heightfield generation failed");
                chunk.phase = ChunkPhase::Failed;
            }
        }
    }

    fn on_mesh(
        &mut self,
        coord: TileCoord,
        generation: u64,
        heights_version: u64,
        lod: usize,
        result: Result<MeshData, MeshError>,
    ) {
        let Some(chunk) = self.live_chunk(coord, generation, "mesh") else {
            return;
        };
        if chunk.mesh_in_flight == Some((lod, heights_version)) {
            chunk.mesh_in_flight = None;
        }
        if heights_version != chunk.heights_version {
            trace!(tile = %coord, lod, heights_version, "discarding mesh of outdated heights");
            return;
        }
        match result {
            Ok(mesh) => {
                chunk.meshes.insert(lod, mesh);
                chunk.phase = ChunkPhase::MeshReady { lod };
            }
            Err(err) => {
                error!(tile = %coord, lod, %err, "mesh build failed");
                chunk.phase = ChunkPhase::Failed;
            }
        }
    }
}

/// What one [`ChunkStreamer::update`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Task results delivered this tick.
    pub delivered: usize,
    /// Whether the visible set was recomputed.
    pub refreshed: bool,
    /// Chunks added to the registry by the refresh.
    pub created: usize,
    /// Chunks dropped beyond the retention radius.
    pub evicted: usize,
    /// Tiles whose heights the stitch pass changed or whose skirts went stale.
    pub restitched: usize,
    /// Mesh builds submitted to the workers.
    pub meshes_requested: usize,
    /// Meshes handed to the sink.
    pub uploads: usize,
}

/// Snapshot of the registry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Calls to `update` so far.
    pub ticks: u64,
    /// Chunks in the registry, loaded or not.
    pub chunks: usize,
    pub visible: usize,
    /// Chunks whose fresh heights have not been stitched yet.
    pub pending_stitch: usize,
    /// Chunks whose generation or meshing failed.
    pub failed: usize,
    /// Meshes held across all chunks and LODs.
    pub cached_meshes: usize,
    /// Worker tasks submitted and not yet delivered.
    pub in_flight: u64,
}

/// Keeps the tiles around a moving viewer generated, stitched, meshed and
/// shown at the right LOD.
///
/// All registry mutation happens inside [`update`](Self::update) on the calling
/// thread; workers only run pure generation and meshing.
pub struct ChunkStreamer {
    settings: StreamerSettings,
    climate: Arc<ClimateSampler>,
    scheduler: ComputeScheduler<StreamState>,
    state: StreamState,
    requests: RequestQueue<TileCoord>,
    last_refresh: Option<Vec2>,
    ticks: u64,
}

impl ChunkStreamer {
    pub fn new(settings: StreamerSettings) -> Result<Self, StreamError> {
        settings.validate()?;
        let climate = ClimateSampler::new(&settings.climate, settings.climate_tile_spacing)?;
        let scheduler = ComputeScheduler::new(settings.workers);
        Ok(Self {
            settings,
            climate: Arc::new(climate),
            scheduler,
            state: StreamState::default(),
            requests: RequestQueue::new(),
            last_refresh: None,
            ticks: 0,
        })
    }

    pub fn settings(&self) -> &StreamerSettings {
        &self.settings
    }

    pub fn chunk(&self, coord: TileCoord) -> Option<&Chunk> {
        self.state.chunks.get(&coord)
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.state.chunks.values()
    }

    /// Stitched (or pending) heights of a loaded tile, without the skirt ring.
    pub fn heightfield(&self, coord: TileCoord) -> Option<&Heightfield> {
        self.state.heights.get(&coord)
    }

    /// Advance one tick with the viewer at `viewer` (world x, z).
    pub fn update(&mut self, viewer: Vec2, sink: &mut impl MeshSink) -> TickReport {
        self.ticks += 1;
        let mut report = TickReport {
            delivered: self
                .scheduler
                .drain(&mut self.state, self.settings.max_results_per_tick),
            ..TickReport::default()
        };

        let moved = self
            .last_refresh
            .is_none_or(|last| last.distance(viewer) > self.settings.viewer_move_threshold);
        if moved {
            self.last_refresh = Some(viewer);
            report.refreshed = true;
            let (created, evicted) = self.refresh_visible_set(viewer, sink);
            report.created = created;
            report.evicted = evicted;
        }

        self.request_heightfields();
        report.restitched = self.stitch_pending();
        report.meshes_requested = self.request_meshes();
        report.uploads = self.update_visibility(sink);

        if report.refreshed {
            let stats = self.stats();
            debug!(
                tick = self.ticks,
                viewer = ?viewer,
                chunks = stats.chunks,
                visible = stats.visible,
                created = report.created,
                evicted = report.evicted,
                in_flight = stats.in_flight,
                "visible set recomputed"
            );
        }
        report
    }

    /// No work in flight and every chunk in view shows its selected LOD.
    pub fn is_settled(&self) -> bool {
        self.scheduler.is_idle()
            && self.state.chunks.values().all(|chunk| {
                chunk.phase == ChunkPhase::Failed
                    || chunk.selected_lod.is_none()
                    || (chunk.is_up_to_date() && chunk.visible)
            })
    }

    pub fn stats(&self) -> StreamStats {
        let chunks = self.state.chunks.values();
        StreamStats {
            ticks: self.ticks,
            chunks: self.state.chunks.len(),
            visible: chunks.clone().filter(|c| c.visible).count(),
            pending_stitch: chunks.clone().filter(|c| c.pending_stitch).count(),
            failed: chunks.clone().filter(|c| c.phase == ChunkPhase::Failed).count(),
            cached_meshes: chunks.map(|c| c.meshes.len()).sum(),
            in_flight: self.scheduler.in_flight(),
        }
    }

    /// Stop the workers. Results still queued are dropped with the streamer.
    pub fn shutdown(&mut self) {
        self.scheduler.shutdown();
    }

    fn refresh_visible_set(&mut self, viewer: Vec2, sink: &mut impl MeshSink) -> (usize, usize) {
        let size = self.settings.mesh.mesh_world_size();
        let radius = self.settings.view_radius_tiles();
        let center = TileCoord::from_world(viewer, size);
        let keep = radius.unsigned_abs() + self.settings.retention_radius;

        let evicted: Vec<TileCoord> = self
            .state
            .chunks
            .keys()
            .filter(|coord| coord.chebyshev_distance(center) > keep)
            .copied()
            .collect();
        for coord in &evicted {
            if let Some(chunk) = self.state.chunks.remove(coord)
                && chunk.displayed.is_some()
            {
                sink.release(*coord);
            }
            self.state.heights.remove(coord);
            debug!(tile = %coord, "chunk evicted");
        }

        let mut created = 0;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let coord = center.offset(dx, dy);
                if self.state.chunks.contains_key(&coord) {
                    continue;
                }
                let generation = self.state.next_generation;
                self.state.next_generation += 1;
                self.state.chunks.insert(coord, Chunk::new(coord, generation));
                let distance = distance_to_tile_bounds(viewer, coord.world_center(size), size);
                let lod = self
                    .settings
                    .detail_levels
                    .select_lod(distance)
                    .unwrap_or_else(|| self.settings.detail_levels.max_lod());
                self.requests.push(coord, request_priority(distance, lod));
                created += 1;
                debug!(tile = %coord, generation, "chunk created");
            }
        }

        for chunk in self.state.chunks.values_mut() {
            let distance = distance_to_tile_bounds(viewer, chunk.coord.world_center(size), size);
            chunk.selected_lod = self.settings.detail_levels.select_lod(distance);
        }

        while let Some(coord) = self.requests.pop() {
            let Some(generation) = self.state.chunks.get(&coord).map(|c| c.generation) else {
                continue;
            };
            let sampler = Arc::clone(&self.climate);
            self.scheduler.submit(
                move || sampler.sample_neighborhood(coord),
                move |state: &mut StreamState, biomes| state.on_climate(coord, generation, biomes),
            );
        }

        (created, evicted.len())
    }

    fn request_heightfields(&mut self) {
        let core = self.settings.mesh.core_size();
        let stride = self.settings.tile_stride();
        let blend_width = self.settings.border_blend_width;
        let Self {
            settings,
            scheduler,
            state,
            ..
        } = self;

        for chunk in state.chunks.values_mut() {
            if chunk.phase != ChunkPhase::ClimateReady || chunk.task_in_flight {
                continue;
            }
            let Some(biomes) = chunk.biomes.as_ref() else {
                continue;
            };
            let center: HeightmapSettings = settings.biomes.heightmap(biomes.center.biome).clone();
            let neighbors: [HeightmapSettings; 8] = Neighbor::ALL
                .map(|n| settings.biomes.heightmap(biomes.neighbor(n).biome).clone());
            let coord = chunk.coord;
            let generation = chunk.generation;
            let sample_center = Vec2::new(coord.x as f32, coord.y as f32) * stride;

            chunk.task_in_flight = true;
            scheduler.submit(
                move || {
                    let neighborhood = NeighborhoodSettings {
                        center: &center,
                        neighbors: neighbors.each_ref(),
                    };
                    generate_blended(core, core, &neighborhood, sample_center, blend_width)
                },
                move |state: &mut StreamState, result| {
                    state.on_heightfield(coord, generation, result)
                },
            );
        }
    }

    /// Stitch freshly generated tiles into their loaded neighbours.
    fn stitch_pending(&mut self) -> usize {
        let dirty: TileCoordSet = self
            .state
            .chunks
            .values()
            .filter(|c| c.pending_stitch)
            .map(|c| c.coord)
            .collect();
        if dirty.is_empty() {
            return 0;
        }

        let mut changed = stitch_tiles_touching(&mut self.state.heights, &dirty, &self.settings.stitch);
        // A new neighbour also changes the skirt ring used for border normals.
        for coord in &dirty {
            for n in Neighbor::ALL {
                let neighbor = coord.neighbor(n);
                if self.state.heights.contains_key(&neighbor) {
                    changed.insert(neighbor);
                }
            }
        }

        for coord in dirty.union(&changed) {
            let Some(chunk) = self.state.chunks.get_mut(coord) else {
                continue;
            };
            if chunk.pending_stitch {
                chunk.pending_stitch = false;
                chunk.meshes.clear();
            } else {
                chunk.invalidate_meshes();
            }
            chunk.phase = ChunkPhase::Stitched;
        }
        debug!(dirty = dirty.len(), changed = changed.len(), "stitched new tiles");
        changed.len()
    }

    fn request_meshes(&mut self) -> usize {
        let chunks = &self.state.chunks;
        let candidates: Vec<(TileCoord, usize)> = chunks
            .values()
            .filter(|chunk| !chunk.pending_stitch && chunk.has_heights())
            .filter_map(|chunk| {
                let lod = chunk.selected_lod?;
                let wanted = (lod, chunk.heights_version);
                (!chunk.meshes.contains_key(&lod) && chunk.mesh_in_flight != Some(wanted))
                    .then_some((chunk.coord, lod))
            })
            .filter(|(coord, _)| {
                // Wait for loaded neighbours still generating so the skirt is final.
                Neighbor::ALL.iter().all(|&n| {
                    chunks
                        .get(&coord.neighbor(n))
                        .is_none_or(|c| c.has_heights() || c.phase == ChunkPhase::Failed)
                })
            })
            .collect();

        let size = self.settings.mesh.mesh_world_size();
        for &(coord, lod) in &candidates {
            let Some(core) = self.state.heights.get(&coord) else {
                continue;
            };
            let heights = &self.state.heights;
            let field = add_skirt(core, Neighbor::ALL.map(|n| heights.get(&coord.neighbor(n))));
            let Some(chunk) = self.state.chunks.get_mut(&coord) else {
                continue;
            };
            let generation = chunk.generation;
            let version = chunk.heights_version;
            chunk.mesh_in_flight = Some((lod, version));
            self.scheduler.submit(
                move || build_terrain_mesh(&field, size, lod),
                move |state: &mut StreamState, result| {
                    state.on_mesh(coord, generation, version, lod, result)
                },
            );
        }
        candidates.len()
    }

    fn update_visibility(&mut self, sink: &mut impl MeshSink) -> usize {
        let mut uploads = 0;
        for chunk in self.state.chunks.values_mut() {
            if let Some(lod) = chunk.selected_lod
                && !chunk.pending_stitch
                && chunk.displayed != Some((lod, chunk.heights_version))
                && let Some(mesh) = chunk.meshes.get(&lod)
                && let Some(biome) = chunk.biome()
            {
                sink.upload(chunk.coord, lod, mesh, biome);
                chunk.displayed = Some((lod, chunk.heights_version));
                uploads += 1;
            }

            let visible = chunk.can_show();
            if visible != chunk.visible {
                chunk.visible = visible;
                sink.set_visible(chunk.coord, visible);
                trace!(tile = %chunk.coord, visible, "visibility changed");
            }
        }
        uploads
    }
}

impl Drop for ChunkStreamer {
    fn drop(&mut self) {
        self.scheduler.shutdown();
    }
}
