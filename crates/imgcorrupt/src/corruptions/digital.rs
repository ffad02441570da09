//! Color and compression corruptions. All of them are severity-only.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageFormat};

use crate::canvas::Canvas;
use crate::color::{hsv_to_rgb, rgb_to_hsv};
use crate::error::{CorruptError, Result};
use crate::filters;
use crate::severity::Severity;

const CONTRAST: [f64; 5] = [0.4, 0.3, 0.2, 0.1, 0.05];
const BRIGHTNESS: [f64; 5] = [0.1, 0.2, 0.3, 0.4, 0.5];
/// (saturation scale, saturation offset)
const SATURATE: [(f64, f64); 5] = [(0.3, 0.0), (0.1, 0.0), (2.0, 0.0), (5.0, 0.1), (20.0, 0.2)];
const JPEG_QUALITY: [u8; 5] = [25, 18, 15, 10, 7];
const PIXELATE: [f64; 5] = [0.6, 0.5, 0.4, 0.3, 0.25];

/// Pull every channel toward its spatial mean.
pub(super) fn contrast(x: &Canvas, severity: Severity, _seed: u32) -> Result<Canvas> {
    let factor = severity.pick(&CONTRAST);
    let means: Vec<f64> = (0..3).map(|c| x.channel(c).mean()).collect();

    let mut out = x.clone();
    for px in out.data.chunks_exact_mut(3) {
        for (v, mean) in px.iter_mut().zip(&means) {
            *v = (*v - mean) * factor + mean;
        }
    }
    out.clip();
    Ok(out)
}

pub(super) fn brightness(x: &Canvas, severity: Severity, _seed: u32) -> Result<Canvas> {
    let shift = severity.pick(&BRIGHTNESS);
    Ok(map_hsv(x, |h, s, v| (h, s, (v + shift).clamp(0.0, 1.0))))
}

/// Rescale HSV saturation. Gray pixels have zero saturation and hue 0, so
/// any offset only tints them toward red while their value stays put; a
/// grayscale image demoted back to one channel comes out unchanged.
pub(super) fn saturate(x: &Canvas, severity: Severity, _seed: u32) -> Result<Canvas> {
    let (scale, offset) = severity.pick(&SATURATE);
    Ok(map_hsv(x, |h, s, v| (h, (s * scale + offset).clamp(0.0, 1.0), v)))
}

fn map_hsv(x: &Canvas, f: impl Fn(f64, f64, f64) -> (f64, f64, f64)) -> Canvas {
    let mut out = x.clone();
    for px in out.data.chunks_exact_mut(3) {
        let (h, s, v) = rgb_to_hsv([px[0], px[1], px[2]]);
        let (h, s, v) = f(h, s, v);
        px.copy_from_slice(&hsv_to_rgb(h, s, v));
    }
    out.clip();
    out
}

/// Round-trip through an in-memory JPEG at a low quality.
pub(super) fn jpeg_compression(x: &Canvas, severity: Severity, _seed: u32) -> Result<Canvas> {
    let quality = severity.pick(&JPEG_QUALITY);
    let width = u32::try_from(x.width)
        .map_err(|_| CorruptError::InvalidArgument("image too wide for JPEG".to_string()))?;
    let height = u32::try_from(x.height)
        .map_err(|_| CorruptError::InvalidArgument("image too tall for JPEG".to_string()))?;

    let rgb: Vec<u8> = x
        .data
        .iter()
        .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect();

    let mut encoded = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut encoded, quality).encode(
        &rgb,
        width,
        height,
        ExtendedColorType::Rgb8,
    )?;

    let decoded = image::load_from_memory_with_format(encoded.get_ref(), ImageFormat::Jpeg)?;
    let decoded = decoded.to_rgb8();

    Ok(Canvas {
        width: x.width,
        height: x.height,
        data: decoded.as_raw().iter().map(|&b| b as f64 / 255.0).collect(),
    })
}

/// Box-downsample, then blow back up with nearest-neighbour sampling.
pub(super) fn pixelate(x: &Canvas, severity: Severity, _seed: u32) -> Result<Canvas> {
    let factor = severity.pick(&PIXELATE);
    let small_w = ((x.width as f64 * factor) as usize).max(1);
    let small_h = ((x.height as f64 * factor) as usize).max(1);

    let mut out = x.map_channels(|plane| {
        let small = filters::resize_area(plane, small_w, small_h);
        filters::resize_nearest(&small, x.width, x.height)
    });
    out.clip();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Image;

    fn card() -> Canvas {
        Canvas::from_image(&Image::test_card(32, 32)).unwrap().0
    }

    fn sev(v: u8) -> Severity {
        Severity::new(v).unwrap()
    }

    fn spread(c: &Canvas) -> f64 {
        let p = c.channel(1);
        let mean = p.mean();
        p.data.iter().map(|v| (v - mean).abs()).sum::<f64>()
    }

    #[test]
    fn test_contrast_shrinks_spread_keeps_mean() {
        let src = card();
        let out = contrast(&src, sev(1), 0).unwrap();
        assert!(spread(&out) < spread(&src));
        assert!((out.channel(0).mean() - src.channel(0).mean()).abs() < 1e-9);
    }

    #[test]
    fn test_brightness_raises_value() {
        let src = Canvas::new(4, 4, 0.3);
        let out = brightness(&src, sev(2), 0).unwrap();
        assert!(out.data.iter().all(|v| (v - 0.5).abs() < 1e-9));
    }

    #[test]
    fn test_saturate_desaturates_at_low_severity() {
        let mut src = Canvas::new(2, 2, 0.0);
        for y in 0..2 {
            for x in 0..2 {
                src.set_pixel(x, y, [0.8, 0.2, 0.2]);
            }
        }
        let out = saturate(&src, sev(2), 0).unwrap();
        let [r, g, _] = out.pixel(0, 0);
        assert!(r - g < 0.6 * 0.5);
    }

    #[test]
    fn test_saturate_keeps_gray_value() {
        let src = Canvas::new(3, 3, 0.4);
        for s in 1..=5 {
            let out = saturate(&src, sev(s), 0).unwrap();
            assert!(out.channel(0).data.iter().all(|v| (v - 0.4).abs() < 1e-9));
        }
    }

    #[test]
    fn test_jpeg_round_trip_keeps_size() {
        let src = card();
        let out = jpeg_compression(&src, sev(5), 0).unwrap();
        assert_eq!((out.width, out.height), (32, 32));
        assert_eq!(out.data.len(), src.data.len());
        assert_ne!(out.data, src.data);
    }

    #[test]
    fn test_pixelate_makes_blocks() {
        let src = card();
        let out = pixelate(&src, sev(5), 0).unwrap();
        // 32 * 0.25 = 8 cells, each 4 pixels wide.
        assert_eq!(out.get(0, 0, 0), out.get(3, 0, 0));
        assert_eq!(out.get(0, 0, 0), out.get(0, 3, 0));
    }
}
