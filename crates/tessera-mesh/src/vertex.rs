//! GPU-ready vertex layout for terrain meshes.

/// Interleaved terrain vertex, 32 bytes.
///
/// | Offset | Field    |
/// |--------|----------|
/// | 0      | position |
/// | 12     | normal   |
/// | 24     | uv       |
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

static_assertions::assert_eq_size!(TerrainVertex, [u8; 32]);
static_assertions::const_assert_eq!(std::mem::offset_of!(TerrainVertex, normal), 12);
static_assertions::const_assert_eq!(std::mem::offset_of!(TerrainVertex, uv), 24);
