//! Terrain chunk meshing: LOD grids, skirt-aware normals and packed vertices.

mod error;
mod lod_mesh;
mod mesh_data;
mod settings;
mod vertex;

pub use error::MeshError;
pub use lod_mesh::build_terrain_mesh;
pub use mesh_data::{MeshData, VertexKind};
pub use settings::{MeshSettings, NUM_SUPPORTED_LODS, SUPPORTED_CHUNK_SIZES, skip_increment};
pub use vertex::TerrainVertex;
