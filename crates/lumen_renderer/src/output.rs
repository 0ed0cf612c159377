//! Final 8-bit RGB frame.

use std::path::Path;

use lumen_math::Color;

use crate::error::RenderResult;

/// Quantize a linear color: clamp each channel to `[0, 1]` and scale to 8 bits.
#[inline]
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    let c = color.clamp(Color::ZERO, Color::ONE) * 255.0;
    [c.x as u8, c.y as u8, c.z as u8]
}

/// Row-major, top-left origin, interleaved RGB bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl FrameBuffer {
    /// A black frame.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 3],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// RGB of the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> [u8; 3] {
        let i = self.offset(x, y);
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }

    pub fn set(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let i = self.offset(x, y);
        self.pixels[i..i + 3].copy_from_slice(&rgb);
    }

    /// Set the pixel with linear row-major index `index`.
    pub fn set_index(&mut self, index: usize, rgb: [u8; 3]) {
        let i = index * 3;
        self.pixels[i..i + 3].copy_from_slice(&rgb);
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 3
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Write the frame to disk; the format follows the file extension
    /// (`.ppm` writes binary P6, `.png` works as well).
    pub fn save<P: AsRef<Path>>(&self, path: P) -> RenderResult<()> {
        image::save_buffer(
            path.as_ref(),
            &self.pixels,
            self.width,
            self.height,
            image::ColorType::Rgb8,
        )?;
        log::info!("Saved {}x{} image to {}", self.width, self.height, path.as_ref().display());
        Ok(())
    }
}
