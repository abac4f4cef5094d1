//! Per-tile streaming state.

use rustc_hash::FxHashMap;
use tessera_mesh::MeshData;
use tessera_terrain::{BiomeType, TileBiomes, TileCoord};

/// Where a chunk is in its generation lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkPhase {
    /// Climate sampling requested.
    Requested,
    /// Biomes known, heightfield requested or about to be.
    ClimateReady,
    /// Heightfield generated, waiting for the stitch pass.
    HeightfieldReady,
    /// Heights final for now; no mesh for them yet.
    Stitched,
    /// A mesh for the current heights exists at `lod`.
    MeshReady { lod: usize },
    /// Generation failed; the chunk stays empty until evicted.
    Failed,
}

/// One streamed tile.
///
/// Heights live in the streamer's tile set so the stitcher can see every
/// loaded tile at once; the chunk tracks everything else.
#[derive(Debug)]
pub struct Chunk {
    pub(crate) coord: TileCoord,
    pub(crate) generation: u64,
    pub(crate) phase: ChunkPhase,
    pub(crate) biomes: Option<TileBiomes>,
    pub(crate) heights_version: u64,
    pub(crate) pending_stitch: bool,
    pub(crate) task_in_flight: bool,
    /// Meshes built from the current `heights_version`, by LOD.
    pub(crate) meshes: FxHashMap<usize, MeshData>,
    pub(crate) mesh_in_flight: Option<(usize, u64)>,
    pub(crate) selected_lod: Option<usize>,
    /// `(lod, heights_version)` last handed to the sink.
    pub(crate) displayed: Option<(usize, u64)>,
    pub(crate) visible: bool,
}

impl Chunk {
    pub(crate) fn new(coord: TileCoord, generation: u64) -> Self {
        Self {
            coord,
            generation,
            phase: ChunkPhase::Requested,
            biomes: None,
            heights_version: 0,
            pending_stitch: false,
            task_in_flight: true,
            meshes: FxHashMap::default(),
            mesh_in_flight: None,
            selected_lod: None,
            displayed: None,
            visible: false,
        }
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    /// Unique per creation; results tagged with another value are stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> ChunkPhase {
        self.phase
    }

    pub fn biome(&self) -> Option<BiomeType> {
        self.biomes.as_ref().map(|b| b.center.biome)
    }

    pub fn biomes(&self) -> Option<&TileBiomes> {
        self.biomes.as_ref()
    }

    /// Bumped whenever the heights change.
    pub fn heights_version(&self) -> u64 {
        self.heights_version
    }

    pub fn is_pending_stitch(&self) -> bool {
        self.pending_stitch
    }

    /// LOD chosen for the viewer's distance, `None` when out of view.
    pub fn selected_lod(&self) -> Option<usize> {
        self.selected_lod
    }

    /// LOD of the mesh last uploaded to the sink.
    pub fn displayed_lod(&self) -> Option<usize> {
        self.displayed.map(|(lod, _)| lod)
    }

    /// The sink holds a mesh of the selected LOD built from the current heights.
    pub fn is_up_to_date(&self) -> bool {
        self.selected_lod
            .is_some_and(|lod| self.displayed == Some((lod, self.heights_version)))
    }

    /// Heights version of the mesh last uploaded to the sink.
    pub fn displayed_heights_version(&self) -> Option<u64> {
        self.displayed.map(|(_, version)| version)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn mesh(&self, lod: usize) -> Option<&MeshData> {
        self.meshes.get(&lod)
    }

    pub(crate) fn has_heights(&self) -> bool {
        matches!(
            self.phase,
            ChunkPhase::HeightfieldReady | ChunkPhase::Stitched | ChunkPhase::MeshReady { .. }
        )
    }

    /// In view, stitched, and the uploaded mesh was built from the current heights.
    ///
    /// A mesh of another LOD stays shown while the selected one builds; a mesh of
    /// outdated heights does not, since its border no longer matches the neighbours.
    pub(crate) fn can_show(&self) -> bool {
        self.selected_lod.is_some()
            && !self.pending_stitch
            && self.displayed_heights_version() == Some(self.heights_version)
    }

    /// New heights: drop meshes built from the old ones.
    pub(crate) fn invalidate_meshes(&mut self) {
        self.heights_version += 1;
        self.meshes.clear();
    }
}
