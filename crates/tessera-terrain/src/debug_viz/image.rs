//! RGBA pixel buffer with PNG export.

use std::io::Write;
use std::path::Path;

use crate::error::TerrainError;

/// Row-major RGBA image.
#[derive(Clone, Debug, PartialEq)]
pub struct DebugImage {
    pub width: u32,
    pub height: u32,
    /// `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl DebugImage {
    /// Transparent black image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    /// # Panics
    ///
    /// Panics if the pixel is outside the image.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let idx = ((y * self.width + x) * 4) as usize;
        self.pixels[idx..idx + 4].copy_from_slice(&rgba);
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Encode as an 8-bit RGBA PNG into `writer`.
    pub fn write_png<W: Write>(&self, writer: W) -> Result<(), TerrainError> {
        let mut encoder = png::Encoder::new(writer, self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut png_writer = encoder.write_header()?;
        png_writer.write_image_data(&self.pixels)?;
        png_writer.finish()?;
        Ok(())
    }

    /// Encode as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>, TerrainError> {
        let mut buf = Vec::new();
        self.write_png(&mut buf)?;
        Ok(buf)
    }

    /// Encode and write to `path`.
    pub fn save_png(&self, path: &Path) -> Result<(), TerrainError> {
        let file = std::fs::File::create(path)?;
        self.write_png(std::io::BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_pixel() {
        let mut image = DebugImage::new(4, 3);
        image.set_pixel(3, 2, [1, 2, 3, 4]);
        assert_eq!(image.get_pixel(3, 2), [1, 2, 3, 4]);
        assert_eq!(image.get_pixel(0, 0), [0, 0, 0, 0]);
        assert_eq!(image.pixels.len(), 4 * 3 * 4);
    }

    #[test]
    fn test_png_has_signature() {
        let image = DebugImage::new(2, 2);
        let bytes = image.to_png().unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_png_decodes_to_same_pixels() {
        let mut image = DebugImage::new(3, 2);
        image.set_pixel(1, 1, [200, 100, 50, 255]);
        let bytes = image.to_png().unwrap();

        let decoder = png::Decoder::new(std::io::Cursor::new(bytes));
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        assert_eq!((info.width, info.height), (3, 2));
        assert_eq!(&buf[..info.buffer_size()], image.pixels.as_slice());
    }
}
