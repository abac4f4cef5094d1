//! Heightfield to triangle mesh conversion with seam-safe LOD reduction.
//!
//! Input grids carry one ring of out-of-mesh cells used only for normals.
//! Inside it, the mesh-edge ring and the edge-connection lines stay at full
//! resolution for every LOD, so chunks at different LODs meet without cracks.
//! Only the interior is decimated by the LOD skip increment.

use glam::{Vec2, Vec3};
use tessera_terrain::Heightfield;

use crate::error::MeshError;
use crate::mesh_data::{MeshData, VertexKind};
use crate::settings::{MeshSettings, NUM_SUPPORTED_LODS, skip_increment};

const SKIPPED: i32 = i32::MIN;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cell {
    OutOfMesh,
    Vertex(VertexKind),
}

fn classify(x: usize, y: usize, n: usize, skip: usize) -> Option<Cell> {
    if x == 0 || y == 0 || x == n - 1 || y == n - 1 {
        return Some(Cell::OutOfMesh);
    }
    if x == 1 || y == 1 || x == n - 2 || y == n - 2 {
        return Some(Cell::Vertex(VertexKind::MeshEdge));
    }
    if (x - 2) % skip == 0 && (y - 2) % skip == 0 {
        return Some(Cell::Vertex(VertexKind::Main));
    }
    if x == 2 || y == 2 || x == n - 3 || y == n - 3 {
        return Some(Cell::Vertex(VertexKind::EdgeConnection));
    }
    None
}

/// Height of an edge-connection vertex, linear between the main vertices
/// on either side of it along its line.
fn edge_connection_height(heightfield: &Heightfield, x: usize, y: usize, n: usize, skip: usize) -> f32 {
    let vertical = x == 2 || x == n - 3;
    let (offset, start, end) = if vertical {
        let offset = (y - 2) % skip;
        (offset, (x, y - offset), (x, y - offset + skip))
    } else {
        let offset = (x - 2) % skip;
        (offset, (x - offset, y), (x - offset + skip, y))
    };
    let t = offset as f32 / skip as f32;
    let a = heightfield.get(start.0, start.1);
    let b = heightfield.get(end.0, end.1);
    a + (b - a) * t
}

/// Build the mesh of a square heightfield.
///
/// The rendered area spans `mesh_world_size` on X and Z, centered on the
/// origin; grid `+y` maps to world `+z`. Heightfield values are used as Y
/// without further scaling.
pub fn build_terrain_mesh(
    heightfield: &Heightfield,
    mesh_world_size: f32,
    lod: usize,
) -> Result<MeshData, MeshError> {
    let (width, height) = heightfield.dimensions();
    if width != height {
        return Err(MeshError::NonSquareHeightfield { width, height });
    }
    let n = width;
    if n < 6 {
        return Err(MeshError::GridTooSmall(n));
    }
    if lod >= NUM_SUPPORTED_LODS {
        return Err(MeshError::UnsupportedLod {
            lod,
            max: NUM_SUPPORTED_LODS - 1,
        });
    }
    let skip = skip_increment(lod);
    if (n - 5) % skip != 0 {
        return Err(MeshError::LodDoesNotDivide {
            lod,
            skip,
            vertices_per_line: n,
        });
    }

    let mut index_map = vec![SKIPPED; n * n];
    let mut mesh_index = 0i32;
    let mut out_index = -1i32;
    for y in 0..n {
        for x in 0..n {
            index_map[y * n + x] = match classify(x, y, n, skip) {
                Some(Cell::OutOfMesh) => {
                    out_index -= 1;
                    out_index + 1
                }
                Some(Cell::Vertex(_)) => {
                    mesh_index += 1;
                    mesh_index - 1
                }
                None => SKIPPED,
            };
        }
    }

    let mut mesh = MeshData::with_capacity(mesh_index as usize, (-out_index - 1) as usize, lod);
    let cells = (n - 3) as f32;
    let index_at = |x: usize, y: usize| index_map[y * n + x];

    for y in 0..n {
        for x in 0..n {
            let Some(cell) = classify(x, y, n, skip) else {
                continue;
            };
            let index = index_at(x, y);

            let percent = Vec2::new((x as f32 - 1.0) / cells, (y as f32 - 1.0) / cells);
            let planar = (percent - Vec2::splat(0.5)) * mesh_world_size;
            let kind = match cell {
                Cell::OutOfMesh => None,
                Cell::Vertex(kind) => Some(kind),
            };
            let h = if kind == Some(VertexKind::EdgeConnection) {
                edge_connection_height(heightfield, x, y, n, skip)
            } else {
                heightfield.get(x, y)
            };
            mesh.add_vertex(Vec3::new(planar.x, h, planar.y), percent, index, kind);

            let is_connection = kind == Some(VertexKind::EdgeConnection);
            if x < n - 1 && y < n - 1 && (!is_connection || (x != 2 && y != 2)) {
                let inc = if kind == Some(VertexKind::Main) && x != n - 3 && y != n - 3 {
                    skip
                } else {
                    1
                };
                let a = index;
                let b = index_at(x + inc, y);
                let c = index_at(x, y + inc);
                let d = index_at(x + inc, y + inc);
                debug_assert!(b != SKIPPED && c != SKIPPED && d != SKIPPED);
                mesh.add_triangle(a, c, d);
                mesh.add_triangle(d, b, a);
            }
        }
    }

    mesh.compute_normals();
    Ok(mesh)
}

impl MeshSettings {
    /// Build a chunk mesh using these settings' world size after checking
    /// the heightfield matches the configured resolution.
    pub fn build_mesh(&self, heightfield: &Heightfield, lod: usize) -> Result<MeshData, MeshError> {
        self.validate()?;
        self.validate_lod(lod)?;
        build_terrain_mesh(heightfield, self.mesh_world_size(), lod)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(n: usize) -> Heightfield {
        Heightfield::filled(n, n, 0.0)
    }

    /// (main, edge connection, rendered vertices, triangles) per LOD.
    fn check_counts(n: usize, expected: &[(usize, usize, usize, usize)]) {
        let field = flat(n);
        for (lod, &(main, conn, verts, tris)) in expected.iter().enumerate() {
            let mesh = build_terrain_mesh(&field, 10.0, lod).unwrap();
            assert_eq!(mesh.count_kind(VertexKind::Main), main, "n={n} lod={lod} main");
            assert_eq!(
                mesh.count_kind(VertexKind::EdgeConnection),
                conn,
                "n={n} lod={lod} edge connection"
            );
            assert_eq!(
                mesh.count_kind(VertexKind::MeshEdge),
                4 * (n - 2) - 4,
                "n={n} lod={lod} mesh edge"
            );
            assert_eq!(mesh.vertex_count(), verts, "n={n} lod={lod} vertices");
            assert_eq!(mesh.triangle_count(), tris, "n={n} lod={lod} triangles");
            assert_eq!(mesh.out_of_mesh_positions.len(), 4 * n - 4);
            assert_eq!(mesh.border_triangle_count(), 8 * (n - 2));
        }
    }

    #[test]
    fn test_vertex_and_triangle_counts_small() {
        check_counts(
            29,
            &[
                (625, 0, 729, 1352),
                (169, 48, 321, 488),
                (49, 72, 225, 272),
                (25, 80, 209, 232),
                (16, 84, 204, 218),
            ],
        );
    }

    #[test]
    fn test_vertex_and_triangle_counts_smallest_chunk() {
        check_counts(
            53,
            &[
                (2401, 0, 2601, 5000),
                (625, 96, 921, 1544),
                (169, 144, 513, 680),
                (81, 160, 441, 520),
                (49, 168, 417, 464),
            ],
        );
    }

    #[test]
    fn test_triangle_indices_in_range() {
        let mesh = build_terrain_mesh(&flat(29), 10.0, 2).unwrap();
        let count = mesh.vertex_count() as u32;
        assert!(mesh.triangles.iter().all(|&i| i < count));
        let out = mesh.out_of_mesh_positions.len() as i32;
        assert!(
            mesh.border_triangles
                .iter()
                .all(|&i| (i >= 0 && i < count as i32) || (i < 0 && -i - 1 < out))
        );
    }

    #[test]
    fn test_flat_normals_point_up() {
        for lod in 0..NUM_SUPPORTED_LODS {
            let mesh = build_terrain_mesh(&flat(29), 26.0, lod).unwrap();
            for normal in &mesh.normals {
                assert!((*normal - Vec3::Y).length() < 1e-6, "lod {lod}: {normal}");
            }
        }
    }

    #[test]
    fn test_sloped_plane_normals() {
        let n = 29;
        // One world unit per cell, rising 0.5 per cell along +x.
        let field = Heightfield::from_fn(n, n, |x, _| x as f32 * 0.5);
        let expected = Vec3::new(-0.5, 1.0, 0.0).normalize();
        for lod in 0..NUM_SUPPORTED_LODS {
            let mesh = build_terrain_mesh(&field, (n - 3) as f32, lod).unwrap();
            for (i, normal) in mesh.normals.iter().enumerate() {
                assert!(
                    (*normal - expected).length() < 1e-4,
                    "lod {lod} vertex {i}: {normal}"
                );
            }
        }
    }

    #[test]
    fn test_positions_centered() {
        let mesh = build_terrain_mesh(&flat(29), 52.0, 0).unwrap();
        let (min, max) = mesh.bounds();
        assert!((min.x + 26.0).abs() < 1e-4 && (max.x - 26.0).abs() < 1e-4);
        assert!((min.z + 26.0).abs() < 1e-4 && (max.z - 26.0).abs() < 1e-4);
        // Out-of-mesh ring sits one cell outside.
        let out_min = mesh
            .out_of_mesh_positions
            .iter()
            .fold(f32::INFINITY, |m, p| m.min(p.x));
        assert!((out_min + 28.0).abs() < 1e-4);
    }

    #[test]
    fn test_mesh_edge_identical_across_lods() {
        let field = Heightfield::from_fn(29, 29, |x, y| ((x * 7 + y * 13) % 11) as f32);
        let edge = |lod: usize| -> Vec<Vec3> {
            let mesh = build_terrain_mesh(&field, 40.0, lod).unwrap();
            mesh.positions
                .iter()
                .zip(&mesh.kinds)
                .filter(|(_, k)| **k == VertexKind::MeshEdge)
                .map(|(p, _)| *p)
                .collect()
        };
        let base = edge(0);
        for lod in 1..NUM_SUPPORTED_LODS {
            assert_eq!(edge(lod), base, "lod {lod} mesh edge differs");
        }
    }

    #[test]
    fn test_edge_connection_heights_interpolated() {
        let n = 29;
        let field = Heightfield::from_fn(n, n, |x, y| ((x * 3 + y * 5) % 7) as f32);
        let mesh = build_terrain_mesh(&field, (n - 3) as f32, 1).unwrap();
        // Vertex (2, 3) lies between main vertices (2, 2) and (2, 4).
        let expected = (field.get(2, 2) + field.get(2, 4)) * 0.5;
        let target_z = (3.0 - 1.0) - (n - 3) as f32 * 0.5;
        let target_x = (2.0 - 1.0) - (n - 3) as f32 * 0.5;
        let vertex = mesh
            .positions
            .iter()
            .zip(&mesh.kinds)
            .find(|(p, k)| {
                **k == VertexKind::EdgeConnection
                    && (p.x - target_x).abs() < 1e-4
                    && (p.z - target_z).abs() < 1e-4
            })
            .map(|(p, _)| *p)
            .expect("edge connection vertex at (2, 3)");
        assert!((vertex.y - expected).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            build_terrain_mesh(&Heightfield::filled(29, 30, 0.0), 1.0, 0),
            Err(MeshError::NonSquareHeightfield { .. })
        ));
        assert!(matches!(
            build_terrain_mesh(&flat(5), 1.0, 0),
            Err(MeshError::GridTooSmall(5))
        ));
        assert!(matches!(
            build_terrain_mesh(&flat(27), 1.0, 3),
            Err(MeshError::LodDoesNotDivide { skip: 6, .. })
        ));
        assert!(matches!(
            build_terrain_mesh(&flat(29), 1.0, 5),
            Err(MeshError::UnsupportedLod { .. })
        ));
    }

    #[test]
    fn test_packed_vertices_match_mesh() {
        let settings = MeshSettings::default();
        let n = settings.num_vertices_per_line();
        let mesh = settings.build_mesh(&flat(n), 2).unwrap();
        let packed = mesh.packed_vertices();
        assert_eq!(packed.len(), mesh.vertex_count());
        assert_eq!(packed[5].position, mesh.positions[5].to_array());
        assert_eq!(mesh.index_bytes().len(), mesh.triangles.len() * 4);
        let bytes: &[u8] = bytemuck::cast_slice(&packed);
        assert_eq!(bytes.len(), packed.len() * 32);
    }
}
