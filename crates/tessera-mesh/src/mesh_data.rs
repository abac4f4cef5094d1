//! Output of the LOD mesh builder.

use glam::{Vec2, Vec3};

use crate::vertex::TerrainVertex;

/// Role of a rendered vertex in the LOD grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertexKind {
    /// Outermost rendered ring, always full resolution.
    MeshEdge,
    /// Vertex on the LOD-strided grid.
    Main,
    /// Full-resolution vertex on the line just inside the mesh edge,
    /// with its height interpolated between the neighbouring main vertices.
    EdgeConnection,
}

/// Triangle mesh for one terrain chunk at one LOD.
///
/// Out-of-mesh vertices sit one cell outside the rendered area. They and the
/// triangles that touch them only feed normal calculation, so lighting matches
/// across chunk borders. Border triangle indices use `-1 - i` for out-of-mesh
/// vertex `i`.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub triangles: Vec<u32>,
    pub kinds: Vec<VertexKind>,
    pub out_of_mesh_positions: Vec<Vec3>,
    pub border_triangles: Vec<i32>,
    pub lod: usize,
}

impl MeshData {
    pub(crate) fn with_capacity(vertices: usize, out_of_mesh: usize, lod: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            uvs: Vec::with_capacity(vertices),
            normals: Vec::new(),
            triangles: Vec::with_capacity(vertices * 6),
            kinds: Vec::with_capacity(vertices),
            out_of_mesh_positions: Vec::with_capacity(out_of_mesh),
            border_triangles: Vec::with_capacity(out_of_mesh * 6),
            lod,
        }
    }

    /// Vertices must arrive in index order.
    pub(crate) fn add_vertex(&mut self, position: Vec3, uv: Vec2, index: i32, kind: Option<VertexKind>) {
        match kind {
            None => {
                debug_assert_eq!((-index - 1) as usize, self.out_of_mesh_positions.len());
                self.out_of_mesh_positions.push(position);
            }
            Some(kind) => {
                debug_assert_eq!(index as usize, self.positions.len());
                self.positions.push(position);
                self.uvs.push(uv);
                self.kinds.push(kind);
            }
        }
    }

    pub(crate) fn add_triangle(&mut self, a: i32, b: i32, c: i32) {
        if a < 0 || b < 0 || c < 0 {
            self.border_triangles.extend_from_slice(&[a, b, c]);
        } else {
            self.triangles.extend_from_slice(&[a as u32, b as u32, c as u32]);
        }
    }

    fn position(&self, index: i32) -> Vec3 {
        if index < 0 {
            self.out_of_mesh_positions[(-index - 1) as usize]
        } else {
            self.positions[index as usize]
        }
    }

    /// Smooth normals: the normalized sum of the unit face normals of every
    /// triangle touching a vertex, border triangles included.
    pub(crate) fn compute_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];

        for tri in self.triangles.chunks_exact(3) {
            let [a, b, c] = [tri[0] as i32, tri[1] as i32, tri[2] as i32];
            let face = self.face_normal(a, b, c);
            for index in [a, b, c] {
                normals[index as usize] += face;
            }
        }

        for tri in self.border_triangles.chunks_exact(3) {
            let face = self.face_normal(tri[0], tri[1], tri[2]);
            for &index in tri {
                if index >= 0 {
                    normals[index as usize] += face;
                }
            }
        }

        for normal in &mut normals {
            *normal = normal.normalize_or_zero();
        }
        self.normals = normals;
    }

    fn face_normal(&self, a: i32, b: i32, c: i32) -> Vec3 {
        let pa = self.position(a);
        let pb = self.position(b);
        let pc = self.position(c);
        (pb - pa).cross(pc - pa).normalize_or_zero()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn border_triangle_count(&self) -> usize {
        self.border_triangles.len() / 3
    }

    pub fn count_kind(&self, kind: VertexKind) -> usize {
        self.kinds.iter().filter(|&&k| k == kind).count()
    }

    /// Axis-aligned bounds of the rendered vertices.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.positions.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), &p| (min.min(p), max.max(p)),
        )
    }

    /// Interleave positions, normals and uvs for upload.
    pub fn packed_vertices(&self) -> Vec<TerrainVertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((p, n), uv)| TerrainVertex {
                position: p.to_array(),
                normal: n.to_array(),
                uv: uv.to_array(),
            })
            .collect()
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.triangles)
    }
}
