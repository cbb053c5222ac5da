use crate::domain::color::Color;
use crate::domain::compositor;
use crate::domain::dimension::Dimension;
use crate::domain::error::TransformError;
use crate::domain::image_processor_trait::ImageProcessor;
use crate::domain::raster::Raster;
use crate::domain::resizer;
use super::error::InfrastructureError;
use image::io::{Limits, Reader as ImageReader};
use image::ImageFormat;
use std::io::Cursor;

// 出力は常に PNG (可逆・アルファ保持)
const OUTPUT_FORMAT: ImageFormat = ImageFormat::Png;
const OUTPUT_CONTENT_TYPE: &str = "image/png";

pub struct DefaultImageProcessor {
    max_dimension: u32,
}

impl DefaultImageProcessor {
    pub fn new(max_dimension: u32) -> Self {
        Self { max_dimension }
    }
}

impl ImageProcessor for DefaultImageProcessor {
    fn decode(&self, bytes: &[u8]) -> Result<Raster, InfrastructureError> {
        let mut reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(InfrastructureError::IoError)?;
        if reader.format().is_none() {
            return Err(InfrastructureError::DecodingError(
                "unrecognized image format".to_string(),
            ));
        }
        log::debug!("Decoding {:?} image ({} bytes)", reader.format(), bytes.len());

        let mut limits = Limits::default();
        limits.max_image_width = Some(self.max_dimension);
        limits.max_image_height = Some(self.max_dimension);
        reader.limits(limits);

        // アルファなしの画像は alpha=255 で埋まる
        let pixels = reader.decode().map_err(InfrastructureError::ImageLibError)?.to_rgba8();
        Raster::new(pixels).map_err(|e| InfrastructureError::DecodingError(e.to_string()))
    }

    fn encode(&self, raster: &Raster) -> Result<Vec<u8>, InfrastructureError> {
        let mut buffer = Cursor::new(Vec::new());
        raster
            .pixels()
            .write_to(&mut buffer, OUTPUT_FORMAT)
            .map_err(InfrastructureError::ImageLibError)?;
        Ok(buffer.into_inner())
    }

    fn content_type(&self) -> &'static str {
        OUTPUT_CONTENT_TYPE
    }

    fn composite(&self, foreground: &Raster, background: &Raster) -> Result<Raster, TransformError> {
        compositor::composite(foreground, background)
    }

    fn apply_solid_background(&self, foreground: &Raster, color: Color) -> Result<Raster, TransformError> {
        compositor::apply_solid_background(foreground, color)
    }

    fn resize(&self, source: &Raster, width: Dimension, height: Dimension) -> Result<Raster, TransformError> {
        resizer::resize(source, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage, Rgba, RgbaImage};

    fn processor() -> DefaultImageProcessor {
        DefaultImageProcessor::new(10_000)
    }

    fn encode_dynamic(image: DynamicImage, format: ImageOutputFormat) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, format).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_encode_decode_round_trip_is_lossless() {
        let pixels = RgbaImage::from_fn(13, 7, |x, y| {
            Rgba([(x * 19) as u8, (y * 31) as u8, ((x * y) % 256) as u8, ((x + y) * 17 % 256) as u8])
        });
        let raster = Raster::new(pixels).unwrap();

        let bytes = processor().encode(&raster).unwrap();
        assert_eq!(processor().decode(&bytes).unwrap(), raster);
    }

    #[test]
    fn test_encode_emits_png() {
        let raster = Raster::solid(2, 2, Rgba([0, 0, 0, 0])).unwrap();
        let bytes = processor().encode(&raster).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);
        assert_eq!(processor().content_type(), "image/png");
    }

    #[test]
    fn test_decode_without_alpha_becomes_opaque() {
        let rgb = RgbImage::from_pixel(4, 3, Rgb([10, 20, 30]));
        let bytes = encode_dynamic(DynamicImage::ImageRgb8(rgb), ImageOutputFormat::Png);

        let raster = processor().decode(&bytes).unwrap();
        assert_eq!(raster.dimensions(), (4, 3));
        assert!(raster.pixels().pixels().all(|p| *p == Rgba([10, 20, 30, 255])));
    }

    #[test]
    fn test_decode_accepts_jpeg() {
        let rgb = RgbImage::from_pixel(16, 8, Rgb([200, 100, 50]));
        let bytes = encode_dynamic(DynamicImage::ImageRgb8(rgb), ImageOutputFormat::Jpeg(90));

        let raster = processor().decode(&bytes).unwrap();
        assert_eq!(raster.dimensions(), (16, 8));
        assert!(!raster.has_transparency());
    }

    #[test]
    fn test_decode_invalid_image_data() {
        let result = processor().decode(&[1, 2, 3, 4]); // 明らかに不正な画像データ
        match result {
            Err(InfrastructureError::DecodingError(_)) | Err(InfrastructureError::ImageLibError(_)) => {}
            other => panic!("Expected a decoding error, got {:?}", other),
        }
        assert!(processor().decode(b"").is_err());
        assert!(processor().decode(b"<html>not an image</html>").is_err());
    }

    #[test]
    fn test_decode_truncated_png_fails() {
        let raster = Raster::solid(32, 32, Rgba([1, 2, 3, 4])).unwrap();
        let bytes = processor().encode(&raster).unwrap();
        assert!(processor().decode(&bytes[..bytes.len() / 2]).is_err());
    }

    #[test]
    fn test_decode_respects_dimension_limit() {
        let raster = Raster::solid(64, 8, Rgba([1, 2, 3, 255])).unwrap();
        let bytes = processor().encode(&raster).unwrap();
        assert!(DefaultImageProcessor::new(32).decode(&bytes).is_err());
        assert!(DefaultImageProcessor::new(64).decode(&bytes).is_ok());
    }
}
