//! Border ring around a tile for mesh normal calculation.

use crate::heightfield::Heightfield;
use crate::tile::Neighbor;

/// Surround `core` with one extra ring of cells.
///
/// Tiles share their border lines, so the ring cell west of column 0 is the west
/// neighbour's column `width - 2`. Where a neighbour is missing the ring is
/// extrapolated linearly from the two outermost core cells.
///
/// `neighbors` is indexed by [`Neighbor::index`].
///
/// # Panics
///
/// Panics if a neighbour's dimensions differ from `core`, or if `core` is
/// smaller than 2x2.
pub fn add_skirt(core: &Heightfield, neighbors: [Option<&Heightfield>; 8]) -> Heightfield {
    let (w, h) = core.dimensions();
    assert!(w >= 2 && h >= 2, "core {w}x{h} is too small for a skirt");
    for (n, field) in Neighbor::ALL.iter().zip(neighbors.iter()) {
        if let Some(field) = field {
            assert!(
                core.same_dimensions(field),
                "neighbor {:?} is {:?}, core is {:?}",
                n,
                field.dimensions(),
                core.dimensions()
            );
        }
    }

    let (wi, hi) = (w as i64, h as i64);
    Heightfield::from_fn(w + 2, h + 2, |px, py| {
        let cx = px as i64 - 1;
        let cy = py as i64 - 1;
        let dx: i32 = if cx < 0 { -1 } else if cx >= wi { 1 } else { 0 };
        let dy: i32 = if cy < 0 { -1 } else if cy >= hi { 1 } else { 0 };
        if dx == 0 && dy == 0 {
            return core.get(cx as usize, cy as usize);
        }

        let neighbor = Neighbor::from_offset(dx, dy).and_then(|n| neighbors[n.index()]);
        match neighbor {
            Some(field) => {
                let nx = match dx {
                    -1 => w - 2,
                    1 => 1,
                    _ => cx as usize,
                };
                let ny = match dy {
                    -1 => h - 2,
                    1 => 1,
                    _ => cy as usize,
                };
                field.get(nx, ny)
            }
            None => {
                let ex = cx.clamp(0, wi - 1);
                let ey = cy.clamp(0, hi - 1);
                let ix = ex - i64::from(dx);
                let iy = ey - i64::from(dy);
                2.0 * core.get(ex as usize, ey as usize) - core.get(ix as usize, iy as usize)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_is_copied() {
        let core = Heightfield::from_fn(4, 3, |x, y| (x + 10 * y) as f32);
        let padded = add_skirt(&core, [None; 8]);
        assert_eq!(padded.dimensions(), (6, 5));
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(padded.get(x + 1, y + 1), core.get(x, y));
            }
        }
    }

    #[test]
    fn test_missing_neighbors_extrapolate_planes() {
        let core = Heightfield::from_fn(5, 5, |x, y| x as f32 * 2.0 + y as f32);
        let padded = add_skirt(&core, [None; 8]);
        // Padded (px, py) is core (px - 1, py - 1) on the same plane.
        for py in 0..7 {
            for px in 0..7 {
                let expected = (px as f32 - 1.0) * 2.0 + (py as f32 - 1.0);
                assert!((padded.get(px, py) - expected).abs() < 1e-5, "({px}, {py})");
            }
        }
    }

    #[test]
    fn test_missing_corner_extrapolates_beside_loaded_edge() {
        let core = Heightfield::from_fn(4, 4, |x, y| (x * 3 + y) as f32);
        let north = Heightfield::filled(4, 4, 50.0);
        let mut neighbors = [None; 8];
        neighbors[Neighbor::North.index()] = Some(&north);
        let padded = add_skirt(&core, neighbors);

        // North ring comes from the neighbour, the north-east corner is extrapolated
        // diagonally from core (3, 0) and (2, 1).
        assert_eq!(padded.get(2, 0), 50.0);
        let expected = 2.0 * core.get(3, 0) - core.get(2, 1);
        assert_eq!(padded.get(5, 0), expected);
    }

    #[test]
    fn test_neighbor_cells_skip_shared_line() {
        let core = Heightfield::filled(5, 5, 0.0);
        let east = Heightfield::from_fn(5, 5, |x, y| (x * 100 + y) as f32);
        let south_west = Heightfield::from_fn(5, 5, |x, y| -((x * 100 + y) as f32));
        let mut neighbors = [None; 8];
        neighbors[Neighbor::East.index()] = Some(&east);
        neighbors[Neighbor::SouthWest.index()] = Some(&south_west);
        let padded = add_skirt(&core, neighbors);

        assert_eq!(padded.get(6, 3), east.get(1, 2));
        assert_eq!(padded.get(0, 6), south_west.get(3, 1));
    }
}
