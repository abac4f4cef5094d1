//! Chunk size and LOD configuration for terrain meshes.

use crate::error::MeshError;

/// Supported chunk sizes in cells. Each is a multiple of 24, so every skip
/// increment of LOD 0..[`NUM_SUPPORTED_LODS`] divides it.
pub const SUPPORTED_CHUNK_SIZES: [usize; 9] = [48, 72, 96, 120, 144, 168, 192, 216, 240];

/// LODs `0..NUM_SUPPORTED_LODS` are valid.
pub const NUM_SUPPORTED_LODS: usize = 5;

/// Vertex stride of a LOD: 1 at LOD 0, otherwise `2 * lod`.
pub const fn skip_increment(lod: usize) -> usize {
    if lod == 0 { 1 } else { lod * 2 }
}

/// Mesh resolution and world scale of a terrain chunk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshSettings {
    /// World units per heightfield cell.
    pub mesh_scale: f32,
    /// Index into [`SUPPORTED_CHUNK_SIZES`].
    pub chunk_size_index: usize,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            mesh_scale: 2.5,
            chunk_size_index: 0,
        }
    }
}

impl MeshSettings {
    pub fn new(chunk_size_index: usize, mesh_scale: f32) -> Result<Self, MeshError> {
        let settings = Self {
            mesh_scale,
            chunk_size_index,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), MeshError> {
        if self.chunk_size_index >= SUPPORTED_CHUNK_SIZES.len() {
            return Err(MeshError::UnsupportedChunkSize {
                index: self.chunk_size_index,
                count: SUPPORTED_CHUNK_SIZES.len(),
            });
        }
        if !(self.mesh_scale > 0.0 && self.mesh_scale.is_finite()) {
            return Err(MeshError::InvalidMeshScale(self.mesh_scale));
        }
        Ok(())
    }

    pub fn chunk_size(&self) -> usize {
        SUPPORTED_CHUNK_SIZES[self.chunk_size_index.min(SUPPORTED_CHUNK_SIZES.len() - 1)]
    }

    /// Vertices per line of the mesh input, including the out-of-mesh ring.
    pub fn num_vertices_per_line(&self) -> usize {
        self.chunk_size() + 5
    }

    /// Side of the heightfield generated per tile before the skirt ring is added.
    /// Adjacent tiles share their first/last line.
    pub fn core_size(&self) -> usize {
        self.num_vertices_per_line() - 2
    }

    /// World-space side length of the rendered mesh.
    pub fn mesh_world_size(&self) -> f32 {
        (self.num_vertices_per_line() - 3) as f32 * self.mesh_scale
    }

    /// Check that `lod` is supported; returns its skip increment.
    pub fn validate_lod(&self, lod: usize) -> Result<usize, MeshError> {
        if lod >= NUM_SUPPORTED_LODS {
            return Err(MeshError::UnsupportedLod {
                lod,
                max: NUM_SUPPORTED_LODS - 1,
            });
        }
        Ok(skip_increment(lod))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_size_supports_every_lod() {
        for index in 0..SUPPORTED_CHUNK_SIZES.len() {
            let settings = MeshSettings::new(index, 1.0).unwrap();
            let span = settings.num_vertices_per_line() - 5;
            for lod in 0..NUM_SUPPORTED_LODS {
                let skip = settings.validate_lod(lod).unwrap();
                assert_eq!(span % skip, 0, "size {span} lod {lod}");
            }
        }
    }

    #[test]
    fn test_derived_sizes() {
        let settings = MeshSettings::new(0, 2.0).unwrap();
        assert_eq!(settings.num_vertices_per_line(), 53);
        assert_eq!(settings.core_size(), 51);
        assert_eq!(settings.mesh_world_size(), 100.0);
    }

    #[test]
    fn test_skip_increments() {
        assert_eq!(skip_increment(0), 1);
        assert_eq!(skip_increment(1), 2);
        assert_eq!(skip_increment(4), 8);
    }

    #[test]
    fn test_invalid_settings() {
        assert!(matches!(
            MeshSettings::new(9, 1.0),
            Err(MeshError::UnsupportedChunkSize { index: 9, .. })
        ));
        assert!(matches!(MeshSettings::new(0, 0.0), Err(MeshError::InvalidMeshScale(_))));
        assert!(matches!(
            MeshSettings::default().validate_lod(5),
            Err(MeshError::UnsupportedLod { lod: 5, max: 4 })
        ));
    }
}
