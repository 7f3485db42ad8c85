//! Frame buffer for render output.
//!
//! Pixels are stored as linear RGB floats in row-major order. Gamma
//! correction and 8-bit quantization only happen when the image is encoded,
//! so averaging and tests operate on linear radiance.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use skytrace_math::{Color, Interval};
use thiserror::Error;

/// Display gamma applied when encoding.
pub const DISPLAY_GAMMA: f32 = 2.2;

/// Errors that can occur while writing an image.
#[derive(Error, Debug)]
pub enum FrameBufferError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
}

pub type FrameBufferResult<T> = Result<T, FrameBufferError>;

/// A pixel color accepted by [`FrameBuffer::set_pixel`].
///
/// Float colors are taken as linear radiance. 8-bit colors are display
/// values and are linearized so they encode back to the same bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelColor(pub Color);

impl From<Color> for PixelColor {
    fn from(color: Color) -> Self {
        Self(color)
    }
}

impl From<[u8; 3]> for PixelColor {
    fn from(rgb: [u8; 3]) -> Self {
        let linear = |c: u8| (c as f32 / 255.0).powf(DISPLAY_GAMMA);
        Self(Color::new(linear(rgb[0]), linear(rgb[1]), linear(rgb[2])))
    }
}

/// Convert a linear component to a display byte.
#[inline]
pub fn linear_to_display(linear: f32) -> u8 {
    let gamma = if linear > 0.0 {
        linear.powf(1.0 / DISPLAY_GAMMA)
    } else {
        0.0
    };
    (256.0 * Interval::new(0.0, 0.999).clamp(gamma)) as u8
}

/// Linear RGB image, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl FrameBuffer {
    /// Create a new frame buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// All pixels in row-major order.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    #[inline]
    fn index(&self, row: u32, col: u32) -> usize {
        debug_assert!(row < self.height && col < self.width);
        row as usize * self.width as usize + col as usize
    }

    /// Get the linear color at (row, col).
    pub fn get(&self, row: u32, col: u32) -> Color {
        self.pixels[self.index(row, col)]
    }

    /// Set the pixel at (row, col) from a linear float or 8-bit color.
    pub fn set_pixel(&mut self, row: u32, col: u32, color: impl Into<PixelColor>) {
        let index = self.index(row, col);
        self.pixels[index] = color.into().0;
    }

    /// Gamma-corrected 8-bit RGB pixels.
    pub fn to_rgb8(&self) -> Vec<[u8; 3]> {
        self.pixels
            .iter()
            .map(|c| [linear_to_display(c.x), linear_to_display(c.y), linear_to_display(c.z)])
            .collect()
    }

    /// Write the image, picking the format from the file extension.
    ///
    /// `.png` is encoded with the `image` crate, `.ppm` as plain-text P3.
    pub fn save(&self, path: impl AsRef<Path>) -> FrameBufferResult<()> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "png" => self.save_png(path),
            "ppm" => self.save_ppm(path),
            other => Err(FrameBufferError::UnsupportedFormat(other.to_string())),
        }?;

        log::info!(
            "Saved {}x{} image to {}",
            self.width,
            self.height,
            path.display()
        );
        Ok(())
    }

    fn save_png(&self, path: &Path) -> FrameBufferResult<()> {
        let rgb = self.to_rgb8();
        image::save_buffer_with_format(
            path,
            bytemuck::cast_slice(&rgb),
            self.width,
            self.height,
            image::ColorType::Rgb8,
            image::ImageFormat::Png,
        )?;
        Ok(())
    }

    fn save_ppm(&self, path: &Path) -> FrameBufferResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_ppm(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the image as plain-text PPM (P3).
    pub fn write_ppm(&self, writer: &mut impl Write) -> std::io::Result<()> {
        writeln!(writer, "P3")?;
        writeln!(writer, "{} {}", self.width, self.height)?;
        writeln!(writer, "255")?;

        for [r, g, b] in self.to_rgb8() {
            writeln!(writer, "{r} {g} {b}")?;
        }
        Ok(())
    }
}
