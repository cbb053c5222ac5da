use super::color::Color;
use super::error::TransformError;
use super::raster::Raster;
use super::resizer;
use image::Rgba;

/// Places `foreground` over `background` with the "over" operator.
///
/// A background of a different size is first resampled to the foreground size.
pub fn composite(foreground: &Raster, background: &Raster) -> Result<Raster, TransformError> {
    if background.dimensions() == foreground.dimensions() {
        return blend(foreground, background);
    }
    let fitted = resizer::resample(background, foreground.width(), foreground.height())?;
    blend(foreground, &fitted)
}

/// Flattens `foreground` onto an opaque `color`.
///
/// Goes through [`composite`] like any other background.
pub fn apply_solid_background(foreground: &Raster, color: Color) -> Result<Raster, TransformError> {
    let background = Raster::solid(foreground.width(), foreground.height(), color.to_rgba())?;
    composite(foreground, &background)
}

fn blend(foreground: &Raster, background: &Raster) -> Result<Raster, TransformError> {
    if foreground.dimensions() != background.dimensions() {
        return Err(TransformError::SizeMismatch {
            foreground: foreground.dimensions(),
            background: background.dimensions(),
        });
    }

    let mut out = foreground.pixels().clone();
    for (dst, bg) in out.pixels_mut().zip(background.pixels().pixels()) {
        *dst = over(*dst, *bg);
    }
    Ok(Raster::new(out)?)
}

/// Per-pixel "over" on straight-alpha RGBA8.
///
/// `out.a = fg.a + bg.a(1 - fg.a)` and the premultiplied colour
/// `fg.rgb*fg.a + bg.rgb*bg.a(1 - fg.a)` is divided back by `out.a`.
pub fn over(fg: Rgba<u8>, bg: Rgba<u8>) -> Rgba<u8> {
    match fg[3] {
        255 => return fg,
        0 => return bg,
        _ => {}
    }

    let fg_alpha = unit(fg[3]);
    let bg_alpha = unit(bg[3]);
    let bg_weight = bg_alpha * (1.0 - fg_alpha);
    // fg_alpha > 0 here, so out_alpha > 0
    let out_alpha = fg_alpha + bg_weight;

    let mut out = [0u8; 4];
    for channel in 0..3 {
        let premultiplied = unit(fg[channel]) * fg_alpha + unit(bg[channel]) * bg_weight;
        out[channel] = to_channel(premultiplied / out_alpha);
    }
    out[3] = to_channel(out_alpha);
    Rgba(out)
}

fn unit(value: u8) -> f32 {
    value as f32 / 255.0
}

fn to_channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn gradient(width: u32, height: u32, alpha: impl Fn(u32, u32) -> u8) -> Raster {
        let pixels = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 37 % 256) as u8, (y * 53 % 256) as u8, ((x + y) * 11 % 256) as u8, alpha(x, y)])
        });
        Raster::new(pixels).unwrap()
    }

    #[test]
    fn test_opaque_over_opaque_is_foreground() {
        let fg = gradient(8, 5, |_, _| 255);
        let bg = Raster::solid(8, 5, Rgba([3, 200, 90, 255])).unwrap();
        assert_eq!(composite(&fg, &bg).unwrap(), fg);
    }

    #[test]
    fn test_transparent_foreground_yields_background() {
        let fg = gradient(6, 6, |_, _| 0);
        let bg = gradient(6, 6, |x, y| ((x * 40 + y) % 256) as u8);
        assert_eq!(composite(&fg, &bg).unwrap(), bg);
    }

    #[test]
    fn test_half_alpha_over_white_rounds_not_truncates() {
        let fg = Raster::solid(1, 1, Rgba([255, 0, 0, 128])).unwrap();
        let out = apply_solid_background(&fg, Color::new(255, 255, 255)).unwrap();
        // g = (1 - 128/255) * 255 = 127.0
        assert_eq!(out.pixels().get_pixel(0, 0), &Rgba([255, 127, 127, 255]));
    }

    #[test]
    fn test_over_semi_transparent_background() {
        // fg.a = 0.5, bg.a = 0.5 -> out.a = 0.75
        let out = over(Rgba([255, 0, 0, 127]), Rgba([0, 0, 255, 127]));
        assert_eq!(out[3], 191);
        assert!(out[0] > out[2], "foreground should dominate: {:?}", out);
        assert_eq!(out[1], 0);
    }

    #[test]
    fn test_solid_background_matches_composite_with_synthetic_raster() {
        let fg = gradient(9, 4, |x, _| (x * 30) as u8);
        let red = Raster::solid(9, 4, Rgba([255, 0, 0, 255])).unwrap();
        let color = "#FF0000".parse::<Color>().unwrap();
        assert_eq!(
            apply_solid_background(&fg, color).unwrap(),
            composite(&fg, &red).unwrap()
        );
    }

    #[test]
    fn test_opaque_background_gives_opaque_result() {
        let fg = gradient(5, 5, |x, y| ((x + y) * 25) as u8);
        let out = apply_solid_background(&fg, Color::new(10, 20, 30)).unwrap();
        assert!(!out.has_transparency());
    }

    #[test]
    fn test_background_is_resampled_to_foreground_size() {
        let fg = gradient(10, 6, |_, _| 0);
        let bg = Raster::solid(40, 40, Rgba([0, 128, 0, 255])).unwrap();
        let out = composite(&fg, &bg).unwrap();
        assert_eq!(out.dimensions(), (10, 6));
        for p in out.pixels().pixels() {
            assert!(p[0] <= 1 && p[2] <= 1, "{:?}", p);
            assert!((127..=129).contains(&p[1]), "{:?}", p);
            assert!(p[3] >= 254, "{:?}", p);
        }
    }

    #[test]
    fn test_inputs_are_left_untouched() {
        let fg = gradient(4, 4, |_, _| 100);
        let bg = gradient(4, 4, |_, _| 255);
        let (fg_before, bg_before) = (fg.clone(), bg.clone());
        let _ = composite(&fg, &bg).unwrap();
        assert_eq!(fg, fg_before);
        assert_eq!(bg, bg_before);
    }
}
