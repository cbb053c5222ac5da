use super::dimension::Dimension;
use super::error::TransformError;
use super::raster::Raster;
use image::imageops::{self, FilterType};
use image::Rgba;

// 高品質リサンプリング (nearest / box は使わない)
const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

/// Resolves the output size for a resize request.
///
/// Returns `None` when both axes are `Auto`, meaning the source is kept as is.
/// A single `Auto` axis follows the source aspect ratio, rounded to the nearest
/// pixel and never below 1. Two concrete axes are used verbatim.
pub fn target_dimensions(
    source: (u32, u32),
    width: Dimension,
    height: Dimension,
) -> Option<(u32, u32)> {
    let (source_width, source_height) = source;
    match (width, height) {
        (Dimension::Auto, Dimension::Auto) => None,
        (Dimension::Auto, Dimension::Pixels(h)) => {
            Some((scale_axis(h, source_width, source_height), h))
        }
        (Dimension::Pixels(w), Dimension::Auto) => {
            Some((w, scale_axis(w, source_height, source_width)))
        }
        (Dimension::Pixels(w), Dimension::Pixels(h)) => Some((w, h)),
    }
}

fn scale_axis(known: u32, numerator: u32, denominator: u32) -> u32 {
    let derived = known as f64 * (numerator as f64 / denominator as f64);
    (derived.round() as u32).max(1)
}

pub fn resize(source: &Raster, width: Dimension, height: Dimension) -> Result<Raster, TransformError> {
    match target_dimensions(source.dimensions(), width, height) {
        None => Ok(source.clone()),
        Some((w, h)) => resample(source, w, h),
    }
}

/// Resamples `source` to exactly `width`x`height`, ignoring aspect ratio.
pub fn resample(source: &Raster, width: u32, height: u32) -> Result<Raster, TransformError> {
    if width == 0 || height == 0 {
        return Err(TransformError::EmptyTarget(width, height));
    }
    // 透明部分の RGB が縁に滲まないよう premultiplied で補間する
    let mut premultiplied = source.pixels().clone();
    premultiplied.pixels_mut().for_each(|p| *p = premultiply(*p));
    let mut resized = imageops::resize(&premultiplied, width, height, RESAMPLE_FILTER);
    resized.pixels_mut().for_each(|p| *p = unpremultiply(*p));
    Ok(Raster::new(resized)?)
}

fn premultiply(pixel: Rgba<u8>) -> Rgba<u8> {
    let alpha = pixel[3] as u32;
    if alpha == 255 {
        return pixel;
    }
    let scale = |c: u8| ((c as u32 * alpha + 127) / 255) as u8;
    Rgba([scale(pixel[0]), scale(pixel[1]), scale(pixel[2]), pixel[3]])
}

fn unpremultiply(pixel: Rgba<u8>) -> Rgba<u8> {
    let alpha = pixel[3] as u32;
    match alpha {
        255 => pixel,
        0 => Rgba([0, 0, 0, 0]),
        _ => {
            let scale = |c: u8| ((c as u32 * 255 + alpha / 2) / alpha).min(255) as u8;
            Rgba([scale(pixel[0]), scale(pixel[1]), scale(pixel[2]), pixel[3]])
        }
    }
}
