//! Renderers for terrain debug images.

use super::image::DebugImage;
use crate::biome::{BiomeType, ClimateSampler};
use crate::falloff::{FalloffSettings, generate_falloff};
use crate::heightfield::Heightfield;
use crate::tile::TileCoord;

/// Grayscale image mapping `lo..=hi` to black..white.
pub fn render_heightfield_range(field: &Heightfield, lo: f32, hi: f32) -> DebugImage {
    let (w, h) = field.dimensions();
    let mut image = DebugImage::new(w as u32, h as u32);
    let range = hi - lo;
    for y in 0..h {
        for x in 0..w {
            let t = if range > 0.0 {
                ((field.get(x, y) - lo) / range).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let v = (t * 255.0).round() as u8;
            image.set_pixel(x as u32, y as u32, [v, v, v, 255]);
        }
    }
    image
}

/// Grayscale image over the field's own bounds.
pub fn render_heightfield(field: &Heightfield) -> DebugImage {
    render_heightfield_range(field, field.min_value(), field.max_value())
}

/// Falloff mask where white is full suppression.
pub fn render_falloff(width: usize, height: usize, settings: &FalloffSettings) -> DebugImage {
    render_heightfield_range(&generate_falloff(width, height, settings), 0.0, 1.0)
}

/// Display colour of a biome.
pub fn biome_color(biome: BiomeType) -> [u8; 3] {
    match biome {
        BiomeType::DeepOcean => [10, 30, 110],
        BiomeType::Ocean => [30, 80, 200],
        BiomeType::Grassland => [110, 180, 70],
        BiomeType::TemperateForest => [40, 110, 50],
        BiomeType::Jungle => [20, 140, 60],
        BiomeType::Desert => [220, 200, 130],
        BiomeType::Mountains => [130, 115, 100],
        BiomeType::SnowyPeaks => [245, 245, 250],
    }
}

/// One block of `pixels_per_tile` pixels per tile, coloured by the tile's biome.
///
/// Covers `tiles_wide x tiles_high` tiles starting at `origin`.
pub fn render_biome_map(
    sampler: &ClimateSampler,
    origin: TileCoord,
    tiles_wide: u32,
    tiles_high: u32,
    pixels_per_tile: u32,
) -> DebugImage {
    let ppt = pixels_per_tile.max(1);
    let mut image = DebugImage::new(tiles_wide * ppt, tiles_high * ppt);
    for ty in 0..tiles_high {
        for tx in 0..tiles_wide {
            let coord = origin.offset(tx as i32, ty as i32);
            let [r, g, b] = biome_color(sampler.sample_tile(coord).biome);
            for py in 0..ppt {
                for px in 0..ppt {
                    image.set_pixel(tx * ppt + px, ty * ppt + py, [r, g, b, 255]);
                }
            }
        }
    }
    image
}
