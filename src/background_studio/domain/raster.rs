use super::error::DomainError;
use image::{Rgba, RgbaImage};

/// Decoded RGBA8 image, row-major without padding.
///
/// Width and height are always non-zero. A `Raster` is never mutated once built;
/// every transform hands back a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pixels: RgbaImage,
}

impl Raster {
    pub fn new(pixels: RgbaImage) -> Result<Self, DomainError> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(DomainError::InvalidRaster(format!(
                "dimensions must be non-zero, got {}x{}",
                pixels.width(),
                pixels.height()
            )));
        }
        Ok(Self { pixels })
    }

    /// A raster of the given size where every pixel is `fill`.
    pub fn solid(width: u32, height: u32, fill: Rgba<u8>) -> Result<Self, DomainError> {
        Self::new(RgbaImage::from_pixel(width, height, fill))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// True when at least one pixel is not fully opaque.
    pub fn has_transparency(&self) -> bool {
        self.pixels.pixels().any(|p| p[3] < 255)
    }
}
