//! Weather overlays: fog, frost, snow and spatter.

use super::{severity_rng, Corruption};
use crate::ambient::with_temporary_seed;
use crate::canvas::{Canvas, Plane};
use crate::error::Result;
use crate::filters;
use crate::noise::plasma_fractal;
use crate::rng::DeterministicRng;
use crate::severity::Severity;

/// (fog strength, plasma wibble decay)
const FOG: [(f64, f64); 5] = [(1.5, 2.0), (2.0, 2.0), (2.5, 1.7), (2.5, 1.5), (3.0, 1.4)];

/// (image weight, frost weight)
const FROST: [(f64, f64); 5] = [(1.0, 0.4), (0.8, 0.6), (0.7, 0.7), (0.65, 0.7), (0.6, 0.75)];

/// Frost crystal cell size in pixels.
const FROST_CELL: f64 = 24.0;

/// Bluish tint of the ice texture.
const FROST_TINT: [f64; 3] = [0.82, 0.9, 0.98];

/// Octaves of the frosted haze under the crystals.
const HAZE_OCTAVES: usize = 4;

#[derive(Debug, Clone, Copy)]
struct SnowParams {
    mean: f64,
    std: f64,
    zoom: f64,
    threshold: f64,
    blur_radius: usize,
    blur_sigma: f64,
    blend: f64,
}

const fn snow_params(
    mean: f64,
    std: f64,
    zoom: f64,
    threshold: f64,
    blur_radius: usize,
    blur_sigma: f64,
    blend: f64,
) -> SnowParams {
    SnowParams {
        mean,
        std,
        zoom,
        threshold,
        blur_radius,
        blur_sigma,
        blend,
    }
}

const SNOW: [SnowParams; 5] = [
    snow_params(0.1, 0.3, 3.0, 0.5, 10, 4.0, 0.8),
    snow_params(0.2, 0.3, 2.0, 0.5, 12, 4.0, 0.7),
    snow_params(0.55, 0.3, 4.0, 0.9, 12, 8.0, 0.7),
    snow_params(0.55, 0.3, 4.5, 0.85, 12, 8.0, 0.65),
    snow_params(0.55, 0.3, 2.5, 0.85, 12, 12.0, 0.55),
];

#[derive(Debug, Clone, Copy)]
enum Liquid {
    Water,
    Mud,
}

#[derive(Debug, Clone, Copy)]
struct SpatterParams {
    mean: f64,
    std: f64,
    sigma: f64,
    threshold: f64,
    /// Highlight intensity for water, mask blur sigma for mud.
    intensity: f64,
    liquid: Liquid,
}

const SPATTER: [SpatterParams; 5] = [
    SpatterParams {
        mean: 0.65,
        std: 0.3,
        sigma: 4.0,
        threshold: 0.69,
        intensity: 0.6,
        liquid: Liquid::Water,
    },
    SpatterParams {
        mean: 0.65,
        std: 0.3,
        sigma: 3.0,
        threshold: 0.68,
        intensity: 0.6,
        liquid: Liquid::Water,
    },
    SpatterParams {
        mean: 0.65,
        std: 0.3,
        sigma: 2.0,
        threshold: 0.68,
        intensity: 0.5,
        liquid: Liquid::Water,
    },
    SpatterParams {
        mean: 0.65,
        std: 0.3,
        sigma: 1.0,
        threshold: 0.65,
        intensity: 1.5,
        liquid: Liquid::Mud,
    },
    SpatterParams {
        mean: 0.67,
        std: 0.4,
        sigma: 1.0,
        threshold: 0.65,
        intensity: 1.5,
        liquid: Liquid::Mud,
    },
];

const WATER_COLOR: [f64; 3] = [238.0 / 255.0, 238.0 / 255.0, 175.0 / 255.0];
const MUD_COLOR: [f64; 3] = [63.0 / 255.0, 42.0 / 255.0, 20.0 / 255.0];

/// Emboss kernel giving water drops their lit rim.
const EMBOSS: [f64; 9] = [-2.0, -1.0, 0.0, -1.0, 1.0, 1.0, 0.0, 1.0, 2.0];

/// Add a plasma cloud layer and rescale to keep the original peak.
///
/// The plasma fractal draws from the ambient RNG, scoped to `seed`.
pub(super) fn fog(x: &Canvas, severity: Severity, seed: u32) -> Result<Canvas> {
    let (strength, decay) = severity.pick(&FOG);
    let mapsize = x.width.max(x.height);
    let cloud = with_temporary_seed(seed, || plasma_fractal(mapsize, decay))?;

    let max = x.max_value();
    let mut out = x.clone();
    for y in 0..x.height {
        for px in 0..x.width {
            let haze = strength * cloud.get(px, y);
            for c in 0..3 {
                let v = (x.get(px, y, c) + haze) * max / (max + strength);
                out.set(px, y, c, v);
            }
        }
    }
    out.clip();
    Ok(out)
}

/// Blend with a procedural ice texture fixed per severity.
pub(super) fn frost(x: &Canvas, severity: Severity, _seed: u32) -> Result<Canvas> {
    let (image_weight, frost_weight) = severity.pick(&FROST);
    let ice = frost_texture(x.width, x.height, severity);

    let mut out = x.clone();
    for y in 0..x.height {
        for px in 0..x.width {
            let i = ice.get(px, y);
            for (c, tint) in FROST_TINT.iter().enumerate() {
                let v = image_weight * x.get(px, y, c) + frost_weight * tint * i;
                out.set(px, y, c, v);
            }
        }
    }
    out.clip();
    Ok(out)
}

/// Ice intensity in `[0, 1]`: bright crystal boundaries over a frosted haze.
fn frost_texture(width: usize, height: usize, severity: Severity) -> Plane {
    let mut rng = severity_rng(Corruption::Frost, severity);
    let crystals = CrystalGrid::new(width, height, &mut rng);
    let haze = haze_layer(width, height, &mut rng);

    let mut ice = Plane::new(width, height, 0.0);
    for y in 0..height {
        for x in 0..width {
            let gap = crystals.edge_gap(x as f64 / FROST_CELL, y as f64 / FROST_CELL);
            let edge = 1.0 - (gap / 0.25).min(1.0);
            let v = 0.6 * edge * edge + 0.4 * haze.get(x, y);
            ice.set(x, y, v.clamp(0.0, 1.0));
        }
    }
    ice
}

/// One jittered crystal seed per `FROST_CELL` square, covering the image.
struct CrystalGrid {
    cols: usize,
    rows: usize,
    points: Vec<(f64, f64)>,
}

impl CrystalGrid {
    fn new(width: usize, height: usize, rng: &mut DeterministicRng) -> Self {
        let cols = (width as f64 / FROST_CELL).ceil() as usize + 1;
        let rows = (height as f64 / FROST_CELL).ceil() as usize + 1;
        let points = (0..cols * rows)
            .map(|i| {
                let (cx, cy) = ((i % cols) as f64, (i / cols) as f64);
                (cx + 0.05 + 0.9 * rng.gen_f64(), cy + 0.05 + 0.9 * rng.gen_f64())
            })
            .collect();
        Self { cols, rows, points }
    }

    /// Second-nearest minus nearest seed distance at `(u, v)`, in cell units.
    /// Zero on the boundary between two crystals.
    fn edge_gap(&self, u: f64, v: f64) -> f64 {
        let (cx, cy) = (u.floor() as usize, v.floor() as usize);
        let (mut f1, mut f2) = (f64::MAX, f64::MAX);
        for ny in cy.saturating_sub(1)..=(cy + 1).min(self.rows - 1) {
            for nx in cx.saturating_sub(1)..=(cx + 1).min(self.cols - 1) {
                let (px, py) = self.points[ny * self.cols + nx];
                let d = (px - u).hypot(py - v);
                if d < f1 {
                    f2 = f1;
                    f1 = d;
                } else if d < f2 {
                    f2 = d;
                }
            }
        }
        f2 - f1
    }
}

/// Summed octaves of bilinear value noise, normalized to `[0, 1]`.
fn haze_layer(width: usize, height: usize, rng: &mut DeterministicRng) -> Plane {
    let mut haze = Plane::new(width, height, 0.0);
    let mut cell = FROST_CELL / 2.0;
    let mut amplitude = 1.0;
    let mut total = 0.0;

    for _ in 0..HAZE_OCTAVES {
        let cols = (width as f64 / cell).ceil() as usize + 2;
        let rows = (height as f64 / cell).ceil() as usize + 2;
        let lattice: Vec<f64> = (0..cols * rows).map(|_| rng.gen_f64()).collect();
        let at = |gx: usize, gy: usize| lattice[gy * cols + gx];

        for y in 0..height {
            let v = y as f64 / cell;
            let gy = v as usize;
            let ty = smoothstep(v - gy as f64);
            for x in 0..width {
                let u = x as f64 / cell;
                let gx = u as usize;
                let tx = smoothstep(u - gx as f64);
                let top = at(gx, gy) + (at(gx + 1, gy) - at(gx, gy)) * tx;
                let bottom = at(gx, gy + 1) + (at(gx + 1, gy + 1) - at(gx, gy + 1)) * tx;
                haze.data[y * width + x] += amplitude * (top + (bottom - top) * ty);
            }
        }

        total += amplitude;
        amplitude *= 0.55;
        cell = (cell / 2.0).max(1.0);
    }

    for v in &mut haze.data {
        *v /= total;
    }
    haze
}

fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

/// Zoomed, thresholded flakes streaked by a downward motion blur.
pub(super) fn snow(x: &Canvas, severity: Severity, seed: u32) -> Result<Canvas> {
    let p = severity.pick(&SNOW);
    let mut rng = DeterministicRng::new(seed);

    let mut layer = normal_plane(x.width, x.height, p.mean, p.std, &mut rng);
    layer = filters::center_zoom(&layer, p.zoom);
    for v in &mut layer.data {
        *v = if *v < p.threshold { 0.0 } else { v.clamp(0.0, 1.0) };
    }
    let angle = rng.gen_range(-135.0..-45.0);
    let flakes = filters::motion_blur(&layer, p.blur_radius, p.blur_sigma, angle);
    let flipped = flakes.rotate_180();

    let gray = x.luma();
    let mut out = x.clone();
    for y in 0..x.height {
        for px in 0..x.width {
            let i = y * x.width + px;
            let lifted = gray.data[i] * 1.5 + 0.5;
            let flake = quantize(flakes.data[i]) + quantize(flipped.data[i]);
            for c in 0..3 {
                let v = x.get(px, y, c);
                let base = p.blend * v + (1.0 - p.blend) * v.max(lifted);
                out.set(px, y, c, base + flake);
            }
        }
    }
    out.clip();
    Ok(out)
}

/// Snap to the 8-bit grid the flake layer is stored on.
fn quantize(v: f64) -> f64 {
    (v * 255.0).round() / 255.0
}

/// Water drops or mud splashes from a blurred, thresholded noise layer.
pub(super) fn spatter(x: &Canvas, severity: Severity, seed: u32) -> Result<Canvas> {
    let p = severity.pick(&SPATTER);
    let mut rng = DeterministicRng::new(seed);

    let mut liquid = normal_plane(x.width, x.height, p.mean, p.std, &mut rng);
    liquid = filters::gaussian_blur(&liquid, p.sigma);
    for v in &mut liquid.data {
        if *v < p.threshold {
            *v = 0.0;
        }
    }

    let mut out = x.clone();
    match p.liquid {
        Liquid::Water => {
            let mask = water_mask(&liquid, p.intensity);
            for (i, px) in out.data.chunks_exact_mut(3).enumerate() {
                for (v, color) in px.iter_mut().zip(WATER_COLOR) {
                    *v += mask.data[i] * color;
                }
            }
        }
        Liquid::Mud => {
            let hard = Plane {
                width: liquid.width,
                height: liquid.height,
                data: liquid
                    .data
                    .iter()
                    .map(|&v| if v > p.threshold { 1.0 } else { 0.0 })
                    .collect(),
            };
            let mut mask = filters::gaussian_blur(&hard, p.intensity);
            for v in &mut mask.data {
                if *v < 0.8 {
                    *v = 0.0;
                }
            }
            for (i, px) in out.data.chunks_exact_mut(3).enumerate() {
                let m = mask.data[i];
                for (v, color) in px.iter_mut().zip(MUD_COLOR) {
                    *v = *v * (1.0 - m) + color * m;
                }
            }
        }
    }
    out.clip();
    Ok(out)
}

/// Drop highlights: distance from the drop outlines, embossed, weighted by
/// the liquid layer and normalized to peak at `intensity`.
fn water_mask(liquid: &Plane, intensity: f64) -> Plane {
    let (w, h) = (liquid.width, liquid.height);
    let quantized = Plane {
        width: w,
        height: h,
        data: liquid.data.iter().map(|v| v.clamp(0.0, 1.0)).collect(),
    };
    let edges: Vec<bool> = filters::sobel_magnitude(&quantized)
        .data
        .iter()
        .map(|&g| g > 0.5)
        .collect();

    let mut dist = filters::distance_transform(&edges, w, h);
    for v in &mut dist.data {
        *v = v.min(20.0);
    }
    dist = filters::box_blur3(&dist);
    stretch(&mut dist);

    let emboss = filters::Kernel {
        size: 3,
        data: EMBOSS.to_vec(),
    };
    let mut relief = filters::convolve2d(&dist, &emboss);
    for v in &mut relief.data {
        *v = v.clamp(0.0, 1.0);
    }
    relief = filters::box_blur3(&relief);

    let mut mask = Plane::new(w, h, 0.0);
    for (m, (l, r)) in mask
        .data
        .iter_mut()
        .zip(quantized.data.iter().zip(&relief.data))
    {
        *m = l * r;
    }
    let peak = mask.data.iter().copied().fold(0.0, f64::max);
    if peak > 0.0 {
        for v in &mut mask.data {
            *v = *v / peak * intensity;
        }
    }
    mask
}

/// Linear contrast stretch to `[0, 1]`.
fn stretch(plane: &mut Plane) {
    let lo = plane.data.iter().copied().fold(f64::MAX, f64::min);
    let hi = plane.data.iter().copied().fold(f64::MIN, f64::max);
    let span = hi - lo;
    for v in &mut plane.data {
        *v = if span > 0.0 { (*v - lo) / span } else { 0.0 };
    }
}

fn normal_plane(
    width: usize,
    height: usize,
    mean: f64,
    std: f64,
    rng: &mut DeterministicRng,
) -> Plane {
    Plane {
        width,
        height,
        data: (0..width * height)
            .map(|_| rng.gen_normal(mean, std))
            .collect(),
    }
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

    #[test]
    fn test_fog_is_seeded_and_scoped() {
        let src = card();
        let a = fog(&src, sev(3), 1).unwrap();
        let b = fog(&src, sev(3), 1).unwrap();
        let c = fog(&src, sev(3), 2).unwrap();
        assert_eq!(a.data, b.data);
        assert_ne!(a.data, c.data);
    }

    #[test]
    fn test_frost_ignores_seed_but_not_severity() {
        let src = card();
        let a = frost(&src, sev(2), 1).unwrap();
        let b = frost(&src, sev(2), 99).unwrap();
        let c = frost(&src, sev(4), 1).unwrap();
        assert_eq!(a.data, b.data);
        assert_ne!(a.data, c.data);
    }

    #[test]
    fn test_frost_texture_in_range() {
        let ice = frost_texture(40, 30, sev(1));
        assert!(ice.data.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(ice.data.iter().any(|&v| v > 0.3));
    }

    #[test]
    fn test_crystal_gap_vanishes_between_seeds() {
        let mut rng = DeterministicRng::new(3);
        let grid = CrystalGrid::new(48, 48, &mut rng);
        let (sx, sy) = grid.points[0];
        assert!(grid.edge_gap(sx, sy) > 0.0);

        let mut min_gap = f64::MAX;
        for j in 0..200 {
            for i in 0..200 {
                let gap = grid.edge_gap(i as f64 * 0.01, j as f64 * 0.01);
                assert!(gap >= 0.0);
                min_gap = min_gap.min(gap);
            }
        }
        assert!(min_gap < 0.05);
    }

    #[test]
    fn test_haze_layer_normalized() {
        let mut rng = DeterministicRng::new(9);
        let haze = haze_layer(37, 21, &mut rng);
        assert!(haze.data.iter().all(|v| (0.0..=1.0).contains(v)));
        let spread = haze.data.iter().copied().fold(0.0, f64::max)
            - haze.data.iter().copied().fold(1.0, f64::min);
        assert!(spread > 0.05);
    }

    #[test]
    fn test_snow_brightens() {
        let src = Canvas::new(32, 32, 0.2);
        let out = snow(&src, sev(5), 7).unwrap();
        let mean = |c: &Canvas| c.data.iter().sum::<f64>() / c.data.len() as f64;
        assert!(mean(&out) > mean(&src));
    }

    #[test]
    fn test_spatter_modes_follow_severity() {
        let src = card();
        for s in 1..=5 {
            let out = spatter(&src, sev(s), 3).unwrap();
            assert!(out.data.iter().all(|v| (0.0..=1.0).contains(v)));
        }
        assert!(matches!(SPATTER[2].liquid, Liquid::Water));
        assert!(matches!(SPATTER[3].liquid, Liquid::Mud));
    }

    #[test]
    fn test_stretch_flat_plane() {
        let mut p = Plane::new(3, 3, 5.0);
        stretch(&mut p);
        assert!(p.data.iter().all(|&v| v == 0.0));
    }
}
