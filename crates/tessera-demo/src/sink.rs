//! Mesh sink that only keeps statistics.

use std::collections::{BTreeMap, HashMap};

use tessera_mesh::MeshData;
use tessera_stream::MeshSink;
use tessera_terrain::{BiomeType, TileCoord};

struct Resident {
    lod: usize,
    triangles: usize,
    biome: BiomeType,
    visible: bool,
}

/// Stands in for a renderer: tracks what would be on the GPU.
#[derive(Default)]
pub struct StatsSink {
    resident: HashMap<TileCoord, Resident>,
    pub uploads: usize,
    pub releases: usize,
    pub uploaded_bytes: usize,
}

impl MeshSink for StatsSink {
    fn upload(&mut self, coord: TileCoord, lod: usize, mesh: &MeshData, biome: BiomeType) {
        let visible = self.resident.get(&coord).is_some_and(|r| r.visible);
        self.uploaded_bytes += mesh.packed_vertices().len() * std::mem::size_of::<tessera_mesh::TerrainVertex>()
            + mesh.index_bytes().len();
        self.resident.insert(
            coord,
            Resident {
                lod,
                triangles: mesh.triangle_count(),
                biome,
                visible,
            },
        );
        self.uploads += 1;
    }

    fn set_visible(&mut self, coord: TileCoord, visible: bool) {
        if let Some(resident) = self.resident.get_mut(&coord) {
            resident.visible = visible;
        }
    }

    fn release(&mut self, coord: TileCoord) {
        self.resident.remove(&coord);
        self.releases += 1;
    }
}

impl StatsSink {
    pub fn visible_count(&self) -> usize {
        self.resident.values().filter(|r| r.visible).count()
    }

    pub fn visible_triangles(&self) -> usize {
        self.resident
            .values()
            .filter(|r| r.visible)
            .map(|r| r.triangles)
            .sum()
    }

    /// Visible chunk count per LOD.
    pub fn lod_histogram(&self) -> BTreeMap<usize, usize> {
        let mut histogram = BTreeMap::new();
        for resident in self.resident.values().filter(|r| r.visible) {
            *histogram.entry(resident.lod).or_insert(0) += 1;
        }
        histogram
    }

    /// Visible chunk count per biome name.
    pub fn biome_histogram(&self) -> BTreeMap<&'static str, usize> {
        let mut histogram = BTreeMap::new();
        for resident in self.resident.values().filter(|r| r.visible) {
            *histogram.entry(resident.biome.name()).or_insert(0) += 1;
        }
        histogram
    }
}
