//! Optical blurs. All of them are severity-only.

use super::{severity_rng, Corruption};
use crate::canvas::Canvas;
use crate::error::Result;
use crate::filters;
use crate::severity::Severity;

const GAUSSIAN_SIGMA: [f64; 5] = [1.0, 2.0, 3.0, 4.0, 6.0];

/// (sigma, max pixel offset, swap passes)
const GLASS: [(f64, usize, usize); 5] = [
    (0.7, 1, 2),
    (0.9, 2, 1),
    (1.0, 2, 3),
    (1.1, 3, 2),
    (1.5, 4, 2),
];

/// (disk radius, alias blur)
const DEFOCUS: [(f64, f64); 5] = [(3.0, 0.1), (4.0, 0.5), (6.0, 0.5), (8.0, 0.5), (10.0, 0.5)];

/// (streak radius, streak sigma)
const MOTION: [(usize, f64); 5] = [(10, 3.0), (15, 5.0), (15, 8.0), (15, 12.0), (20, 15.0)];

/// (zoom step, number of zoom levels starting at 1.0)
const ZOOM: [(f64, usize); 5] = [(0.01, 11), (0.01, 16), (0.02, 11), (0.02, 13), (0.03, 11)];

pub(super) fn gaussian_blur(x: &Canvas, severity: Severity, _seed: u32) -> Result<Canvas> {
    let mut out = filters::gaussian_blur_canvas(x, severity.pick(&GAUSSIAN_SIGMA));
    out.clip();
    Ok(out)
}

/// Blur, jitter pixels by swapping them with nearby neighbours, blur again.
pub(super) fn glass_blur(x: &Canvas, severity: Severity, _seed: u32) -> Result<Canvas> {
    let (sigma, max_delta, passes) = severity.pick(&GLASS);
    let mut rng = severity_rng(Corruption::GlassBlur, severity);
    let mut img = filters::gaussian_blur_canvas(x, sigma);
    img.clip();

    let (w, h) = (img.width, img.height);
    let md = max_delta as isize;
    for _ in 0..passes {
        // Walk bottom-right to top-left so swapped pixels can move again.
        for y in ((max_delta + 1)..=h.saturating_sub(max_delta)).rev() {
            for x in ((max_delta + 1)..=w.saturating_sub(max_delta)).rev() {
                let dx = rng.gen_range(-md..md);
                let dy = rng.gen_range(-md..md);
                let (sx, sy) = ((x as isize + dx) as usize, (y as isize + dy) as usize);
                if x >= w || y >= h || sx >= w || sy >= h {
                    continue;
                }
                let a = img.pixel(x, y);
                let b = img.pixel(sx, sy);
                img.set_pixel(x, y, b);
                img.set_pixel(sx, sy, a);
            }
        }
    }

    let mut out = filters::gaussian_blur_canvas(&img, sigma);
    out.clip();
    Ok(out)
}

pub(super) fn defocus_blur(x: &Canvas, severity: Severity, _seed: u32) -> Result<Canvas> {
    let (radius, alias_blur) = severity.pick(&DEFOCUS);
    let kernel = filters::disk_kernel(radius, alias_blur);
    let mut out = x.map_channels(|plane| filters::convolve2d(plane, &kernel));
    out.clip();
    Ok(out)
}

pub(super) fn motion_blur(x: &Canvas, severity: Severity, _seed: u32) -> Result<Canvas> {
    let (radius, sigma) = severity.pick(&MOTION);
    let angle = severity_rng(Corruption::MotionBlur, severity).gen_range(-45.0..45.0);
    let mut out = x.map_channels(|plane| filters::motion_blur(plane, radius, sigma, angle));
    out.clip();
    Ok(out)
}

/// Average the image with progressively stronger center zooms of itself.
pub(super) fn zoom_blur(x: &Canvas, severity: Severity, _seed: u32) -> Result<Canvas> {
    let (step, levels) = severity.pick(&ZOOM);
    let mut acc = Canvas::new(x.width, x.height, 0.0);
    for i in 0..levels {
        let factor = 1.0 + i as f64 * step;
        let zoomed = x.map_channels(|plane| filters::center_zoom(plane, factor));
        for (a, z) in acc.data.iter_mut().zip(&zoomed.data) {
            *a += z.clamp(0.0, 1.0);
        }
    }

    let mut out = x.clone();
    for (o, a) in out.data.iter_mut().zip(&acc.data) {
        *o = (*o + a) / (levels + 1) as f64;
    }
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

    fn total_variation(c: &Canvas) -> f64 {
        let p = c.channel(0);
        let mut tv = 0.0;
        for y in 0..p.height {
            for x in 1..p.width {
                tv += (p.get(x, y) - p.get(x - 1, y)).abs();
            }
        }
        tv
    }

    #[test]
    fn test_blurs_smooth_the_card() {
        let src = card();
        let before = total_variation(&src);
        for kernel in [gaussian_blur, defocus_blur, zoom_blur] {
            let out = kernel(&src, sev(3), 0).unwrap();
            assert!(total_variation(&out) < before);
        }
    }

    #[test]
    fn test_constant_image_is_fixed_point() {
        let flat = Canvas::new(64, 64, 0.25);
        for kernel in [gaussian_blur, defocus_blur, motion_blur, zoom_blur, glass_blur] {
            let out = kernel(&flat, sev(4), 0).unwrap();
            assert!(out.data.iter().all(|v| (v - 0.25).abs() < 1e-9));
        }
    }

    #[test]
    fn test_glass_blur_ignores_seed() {
        let src = card();
        let a = glass_blur(&src, sev(5), 1).unwrap();
        let b = glass_blur(&src, sev(5), 2).unwrap();
        assert_eq!(a.data, b.data);
    }

    #[test]
    fn test_glass_blur_tiny_image_skips_swaps() {
        let src = Canvas::new(3, 3, 0.6);
        let out = glass_blur(&src, sev(5), 0).unwrap();
        assert_eq!(out.width, 3);
    }
}
