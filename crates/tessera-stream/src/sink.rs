//! Interface to whatever displays the streamed meshes.

use tessera_mesh::MeshData;
use tessera_terrain::{BiomeType, TileCoord};

/// Receives finished meshes and visibility changes from the streamer.
///
/// Called only from [`crate::ChunkStreamer::update`], on the thread that
/// drives the streamer.
pub trait MeshSink {
    /// Replace the mesh displayed for `coord`.
    fn upload(&mut self, coord: TileCoord, lod: usize, mesh: &MeshData, biome: BiomeType);

    fn set_visible(&mut self, coord: TileCoord, visible: bool);

    /// `coord` was evicted; called only for chunks that had a mesh uploaded.
    fn release(&mut self, coord: TileCoord);
}
