//! Debug images of heightfields, biome maps and falloff masks.
//!
//! Rendered into an RGBA [`DebugImage`] that can be encoded as PNG for
//! offline inspection of generation and stitching results.

mod image;
mod renderers;

pub use self::image::DebugImage;
pub use renderers::{
    biome_color, render_biome_map, render_falloff, render_heightfield, render_heightfield_range,
};
