//! Heightmap pipeline: noise, curve, falloff and cross-tile border blending.

use glam::Vec2;

use crate::curve::HeightCurve;
use crate::error::TerrainError;
use crate::falloff::{FalloffSettings, generate_falloff};
use crate::heightfield::Heightfield;
use crate::noise_field::{NoiseField, NoiseParameters};
use crate::tile::Neighbor;

/// Everything needed to turn a noise window into tile heights.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightmapSettings {
    pub noise: NoiseParameters,
    /// Scale applied after the curve.
    pub height_multiplier: f32,
    pub curve: HeightCurve,
    /// Optional island mask.
    pub falloff: Option<FalloffSettings>,
}

impl Default for HeightmapSettings {
    fn default() -> Self {
        Self {
            noise: NoiseParameters::default(),
            height_multiplier: 1.0,
            curve: HeightCurve::linear(),
            falloff: None,
        }
    }
}

impl HeightmapSettings {
    pub fn validate(&self) -> Result<(), TerrainError> {
        self.noise.validate()?;
        if let Some(falloff) = &self.falloff {
            falloff.validate()?;
        }
        Ok(())
    }

    /// Height produced by a noise value of 0 (before falloff).
    pub fn min_height(&self) -> f32 {
        self.height_multiplier * self.curve.evaluate(0.0)
    }

    /// Height produced by a noise value of 1 (before falloff).
    pub fn max_height(&self) -> f32 {
        self.height_multiplier * self.curve.evaluate(1.0)
    }
}

/// Generate one tile's heights.
///
/// `sample_center` is the tile's offset in noise cells. Tiles that share a border
/// line are `width - 1` (or `height - 1`) cells apart.
pub fn generate(
    width: usize,
    height: usize,
    settings: &HeightmapSettings,
    sample_center: Vec2,
) -> Result<Heightfield, TerrainError> {
    settings.validate()?;
    let noise = NoiseField::new(settings.noise.clone())?;
    let mut field = noise.sample(width, height, sample_center);

    let multiplier = settings.height_multiplier;
    let falloff = settings
        .falloff
        .map(|falloff| (falloff, generate_falloff(width, height, &falloff)));

    field.map_in_place(|x, y, value| {
        let shaped = settings.curve.evaluate(value) * multiplier;
        match &falloff {
            Some((falloff, mask)) => falloff.apply(shaped, mask.get(x, y), multiplier),
            None => shaped,
        }
    });
    Ok(field)
}

/// Settings for a tile and its eight neighbours, indexed by [`Neighbor::index`].
#[derive(Clone, Copy, Debug)]
pub struct NeighborhoodSettings<'a> {
    pub center: &'a HeightmapSettings,
    pub neighbors: [&'a HeightmapSettings; 8],
}

impl<'a> NeighborhoodSettings<'a> {
    /// Every tile uses the same settings.
    pub fn uniform(settings: &'a HeightmapSettings) -> Self {
        Self {
            center: settings,
            neighbors: [settings; 8],
        }
    }

    pub fn neighbor(&self, neighbor: Neighbor) -> &'a HeightmapSettings {
        self.neighbors[neighbor.index()]
    }
}

/// Generate a tile whose borders blend toward its neighbours' terrain.
///
/// Each neighbour is generated with its own settings over its own window, then
/// [`blend_neighbor_fields`] mixes the results within `blend_width` cells of the edges.
/// Two tiles that agree on each other's settings produce identical shared borders.
pub fn generate_blended(
    width: usize,
    height: usize,
    settings: &NeighborhoodSettings<'_>,
    sample_center: Vec2,
    blend_width: usize,
) -> Result<Heightfield, TerrainError> {
    let center = generate(width, height, settings.center, sample_center)?;
    if blend_width == 0 {
        return Ok(center);
    }

    let stride = Vec2::new((width - 1) as f32, (height - 1) as f32);
    let neighbors = Neighbor::ALL
        .iter()
        .map(|&n| {
            let (dx, dy) = n.offset();
            let offset = sample_center + Vec2::new(dx as f32, dy as f32) * stride;
            generate(width, height, settings.neighbor(n), offset)
        })
        .collect::<Result<Vec<_>, _>>()?;
    let refs: [&Heightfield; 8] = std::array::from_fn(|i| &neighbors[i]);

    Ok(blend_neighbor_fields(&center, refs, blend_width))
}

/// Blend `center` toward its neighbours near the edges.
///
/// For a cell at distance `d < k` from the nearer edge (vertical edge on ties), the
/// neighbour across that edge is read at the mirrored cell and mixed in with
/// weight `0.5 * (1 - d / k)`. Exact tile corners take the mean of the four tiles
/// meeting there, summed in a fixed north-west, north-east, south-west,
/// south-east order so every tile computes the same value.
///
/// # Panics
///
/// Panics if any neighbour's dimensions differ from `center`, or if
/// `2 * blend_width` is not smaller than both dimensions.
pub fn blend_neighbor_fields(
    center: &Heightfield,
    neighbors: [&Heightfield; 8],
    blend_width: usize,
) -> Heightfield {
    for (n, field) in Neighbor::ALL.iter().zip(neighbors.iter()) {
        assert!(
            center.same_dimensions(field),
            "neighbor {:?} is {:?}, center is {:?}",
            n,
            field.dimensions(),
            center.dimensions()
        );
    }
    let (w, h) = center.dimensions();
    let k = blend_width;
    assert!(
        2 * k < w && 2 * k < h,
        "blend width {k} must be less than half of {w}x{h}"
    );
    if k == 0 {
        return center.clone();
    }

    Heightfield::from_fn(w, h, |x, y| {
        let base = center.get(x, y);
        let (dist_x, side_x) = if x <= w - 1 - x { (x, -1) } else { (w - 1 - x, 1) };
        let (dist_y, side_y) = if y <= h - 1 - y { (y, -1) } else { (h - 1 - y, 1) };

        if dist_x >= k && dist_y >= k {
            return base;
        }

        if dist_x == 0 && dist_y == 0 {
            let cols = if side_x < 0 { [-1, 0] } else { [0, 1] };
            let rows = if side_y < 0 { [-1, 0] } else { [0, 1] };
            let mut sum = 0.0;
            for (ri, &oy) in rows.iter().enumerate() {
                for (ci, &ox) in cols.iter().enumerate() {
                    let cx = if ci == 0 { w - 1 } else { 0 };
                    let cy = if ri == 0 { h - 1 } else { 0 };
                    sum += tile_field(center, &neighbors, ox, oy).get(cx, cy);
                }
            }
            return sum * 0.25;
        }

        if dist_x <= dist_y {
            let weight = 0.5 * (1.0 - dist_x as f32 / k as f32);
            let other = tile_field(center, &neighbors, side_x, 0).get(w - 1 - x, y);
            (1.0 - weight) * base + weight * other
        } else {
            let weight = 0.5 * (1.0 - dist_y as f32 / k as f32);
            let other = tile_field(center, &neighbors, 0, side_y).get(x, h - 1 - y);
            (1.0 - weight) * base + weight * other
        }
    })
}

fn tile_field<'a>(
    center: &'a Heightfield,
    neighbors: &[&'a Heightfield; 8],
    dx: i32,
    dy: i32,
) -> &'a Heightfield {
    Neighbor::from_offset(dx, dy).map_or(center, |n| neighbors[n.index()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::falloff::FalloffSettings;
    use crate::tile::TileCoord;

    fn settings(seed: u64, scale: f32, multiplier: f32) -> HeightmapSettings {
        HeightmapSettings {
            noise: NoiseParameters {
                seed,
                scale,
                octaves: 4,
                persistence: 0.5,
                lacunarity: 2.0,
                ..Default::default()
            },
            height_multiplier: multiplier,
            ..Default::default()
        }
    }

    #[test]
    fn test_bounds_enclose_every_cell() {
        let field = generate(40, 40, &settings(1, 30.0, 25.0), Vec2::new(13.0, 7.0)).unwrap();
        assert!(field.bounds_hold());
        assert!(field.min_value() >= 0.0 && field.max_value() <= 25.0);
    }

    #[test]
    fn test_curve_and_multiplier_applied() {
        let mut s = settings(2, 30.0, 10.0);
        s.curve = HeightCurve::sea_floor(0.99);
        let field = generate(16, 16, &s, Vec2::ZERO).unwrap();
        // Nearly everything is below the flat part of the curve.
        assert!(field.max_value() <= 10.0 * 0.02 + 1e-4);
        assert_eq!(s.max_height(), 10.0);
        assert_eq!(s.min_height(), 0.0);
    }

    #[test]
    fn test_falloff_suppresses_corners() {
        let mut s = settings(3, 30.0, 10.0);
        s.falloff = Some(FalloffSettings::default());
        let field = generate(33, 33, &s, Vec2::ZERO).unwrap();
        assert!(field.get(0, 0).abs() < 0.01, "corner {}", field.get(0, 0));
        assert!(field.get(32, 32).abs() < 0.01);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut s = settings(4, 30.0, 1.0);
        s.noise.octaves = 0;
        assert!(generate(8, 8, &s, Vec2::ZERO).is_err());
    }

    #[test]
    fn test_zero_blend_width_matches_generate() {
        let s = settings(5, 20.0, 4.0);
        let plain = generate(21, 21, &s, Vec2::new(20.0, 0.0)).unwrap();
        let blended =
            generate_blended(21, 21, &NeighborhoodSettings::uniform(&s), Vec2::new(20.0, 0.0), 0)
                .unwrap();
        assert_eq!(plain, blended);
    }

    #[test]
    fn test_blended_tiles_agree_on_borders() {
        let size = 21;
        let stride = (size - 1) as f32;
        let palette = [
            settings(10, 15.0, 5.0),
            settings(20, 40.0, 30.0),
            settings(30, 8.0, 12.0),
        ];
        let pick = |c: TileCoord| &palette[((c.x * 7 + c.y * 13).rem_euclid(3)) as usize];

        let mut tiles = std::collections::HashMap::new();
        for y in 0..2 {
            for x in 0..2 {
                let coord = TileCoord::new(x, y);
                let neighborhood = NeighborhoodSettings {
                    center: pick(coord),
                    neighbors: Neighbor::ALL.map(|n| pick(coord.neighbor(n))),
                };
                let center = Vec2::new(x as f32, y as f32) * stride;
                let field = generate_blended(size, size, &neighborhood, center, 4).unwrap();
                assert!(field.bounds_hold());
                tiles.insert(coord, field);
            }
        }

        let a = &tiles[&TileCoord::new(0, 0)];
        let east = &tiles[&TileCoord::new(1, 0)];
        let south = &tiles[&TileCoord::new(0, 1)];
        let diagonal = &tiles[&TileCoord::new(1, 1)];
        for i in 0..size {
            assert_eq!(a.get(size - 1, i), east.get(0, i), "east border row {i}");
            assert_eq!(a.get(i, size - 1), south.get(i, 0), "south border column {i}");
        }
        let corner = a.get(size - 1, size - 1);
        assert_eq!(corner, east.get(0, size - 1));
        assert_eq!(corner, south.get(size - 1, 0));
        assert_eq!(corner, diagonal.get(0, 0));
    }

    #[test]
    #[should_panic(expected = "neighbor")]
    fn test_blend_rejects_mismatched_dimensions() {
        let center = Heightfield::filled(9, 9, 0.0);
        let other = Heightfield::filled(9, 8, 0.0);
        let mut neighbors = [&center; 8];
        neighbors[2] = &other;
        let _ = blend_neighbor_fields(&center, neighbors, 2);
    }

    #[test]
    #[should_panic(expected = "blend width")]
    fn test_blend_rejects_wide_blend() {
        let center = Heightfield::filled(9, 9, 0.0);
        let _ = blend_neighbor_fields(&center, [&center; 8], 5);
    }

    #[test]
    fn test_blend_ramps_toward_neighbor() {
        let center = Heightfield::filled(11, 11, 0.0);
        let east = Heightfield::filled(11, 11, 1.0);
        let mut neighbors = [&center; 8];
        neighbors[Neighbor::East.index()] = &east;
        let blended = blend_neighbor_fields(&center, neighbors, 4);

        assert_eq!(blended.get(10, 5), 0.5, "border is the midpoint");
        assert_eq!(blended.get(9, 5), 0.375);
        assert_eq!(blended.get(6, 5), 0.0, "unchanged at the blend width");
        assert_eq!(blended.get(0, 5), 0.0);
    }
}
