//! Image processing kernels shared by the corruption catalog.

use crate::canvas::{Canvas, Plane};

/// Square convolution kernel with odd side length.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    /// Side length.
    pub size: usize,
    /// Weights, row-major.
    pub data: Vec<f64>,
}

impl Kernel {
    /// Scale the weights so they sum to one.
    pub fn normalized(mut self) -> Self {
        let sum: f64 = self.data.iter().sum();
        if sum > 0.0 {
            for w in &mut self.data {
                *w /= sum;
            }
        }
        self
    }
}

/// Sampled 1-D Gaussian of the given side length, normalized.
pub fn gaussian_weights(size: usize, sigma: f64) -> Vec<f64> {
    let center = (size as f64 - 1.0) / 2.0;
    let denom = 2.0 * sigma * sigma;
    let mut weights: Vec<f64> = (0..size)
        .map(|i| {
            let d = i as f64 - center;
            (-(d * d) / denom).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    weights
}

/// 1-D Gaussian truncated at four standard deviations.
pub fn gaussian_kernel_1d(sigma: f64) -> Vec<f64> {
    let radius = (4.0 * sigma + 0.5) as usize;
    gaussian_weights(2 * radius + 1, sigma)
}

/// Separable convolution with a symmetric 1-D kernel along both axes.
///
/// Border pixels are replicated.
pub fn convolve_separable(input: &Plane, weights: &[f64]) -> Plane {
    let r = (weights.len() / 2) as isize;
    let (w, h) = (input.width, input.height);

    // Horizontal pass
    let mut tmp = Plane::new(w, h, 0.0);
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0.0;
            for (k, &wt) in weights.iter().enumerate() {
                sum += wt * input.get_clamped(x as isize + k as isize - r, y as isize);
            }
            tmp.set(x, y, sum);
        }
    }

    // Vertical pass
    let mut out = Plane::new(w, h, 0.0);
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0.0;
            for (k, &wt) in weights.iter().enumerate() {
                sum += wt * tmp.get_clamped(x as isize, y as isize + k as isize - r);
            }
            out.set(x, y, sum);
        }
    }

    out
}

/// Gaussian blur of a single plane.
pub fn gaussian_blur(input: &Plane, sigma: f64) -> Plane {
    if sigma <= 0.0 {
        return input.clone();
    }
    convolve_separable(input, &gaussian_kernel_1d(sigma))
}

/// Gaussian blur of every channel of a canvas.
pub fn gaussian_blur_canvas(input: &Canvas, sigma: f64) -> Canvas {
    let weights = gaussian_kernel_1d(sigma);
    input.map_channels(|plane| convolve_separable(plane, &weights))
}

/// Full 2-D convolution with mirrored borders.
pub fn convolve2d(input: &Plane, kernel: &Kernel) -> Plane {
    let r = (kernel.size / 2) as isize;
    let mut out = Plane::new(input.width, input.height, 0.0);

    for y in 0..input.height {
        for x in 0..input.width {
            let mut sum = 0.0;
            for ky in 0..kernel.size {
                for kx in 0..kernel.size {
                    let wt = kernel.data[ky * kernel.size + kx];
                    if wt == 0.0 {
                        continue;
                    }
                    let sx = x as isize + kx as isize - r;
                    let sy = y as isize + ky as isize - r;
                    sum += wt * input.get_reflected(sx, sy);
                }
            }
            out.set(x, y, sum);
        }
    }

    out
}

/// Anti-aliased disk used to simulate an out-of-focus lens.
///
/// The disk is rasterized on a grid of at least 17x17, normalized, softened
/// with a small Gaussian (3 taps up to radius 8, 5 taps beyond) and
/// normalized again.
pub fn disk_kernel(radius: f64, alias_blur: f64) -> Kernel {
    let half = radius.ceil().max(8.0) as isize;
    let size = (2 * half + 1) as usize;
    let r2 = radius * radius;

    let mut data = Vec::with_capacity(size * size);
    for y in -half..=half {
        for x in -half..=half {
            let d2 = (x * x + y * y) as f64;
            data.push(if d2 <= r2 { 1.0 } else { 0.0 });
        }
    }
    let disk = Plane {
        width: size,
        height: size,
        data,
    };

    let taps = if radius <= 8.0 { 3 } else { 5 };
    let softened = convolve_separable(&disk, &gaussian_weights(taps, alias_blur));

    Kernel {
        size,
        data: softened.data,
    }
    .normalized()
}

/// Streak blur along a direction.
///
/// Sums `2 * radius + 1` copies of the input shifted progressively along
/// `angle_deg`, weighted by a one-sided Gaussian of width `sigma`, so the
/// streak trails behind each pixel. Shifts replicate edge pixels.
pub fn motion_blur(input: &Plane, radius: usize, sigma: f64, angle_deg: f64) -> Plane {
    let width = radius * 2 + 1;
    let weights: Vec<f64> = {
        let raw: Vec<f64> = (0..width)
            .map(|i| (-((i * i) as f64) / (2.0 * sigma * sigma)).exp())
            .collect();
        let sum: f64 = raw.iter().sum();
        raw.into_iter().map(|w| w / sum).collect()
    };

    let angle = angle_deg.to_radians();
    let (py, px) = (width as f64 * angle.sin(), width as f64 * angle.cos());
    let hypot = px.hypot(py);

    let mut out = Plane::new(input.width, input.height, 0.0);
    for (i, &wt) in weights.iter().enumerate() {
        let dy = -((i as f64 * py) / hypot - 0.5).ceil() as isize;
        let dx = -((i as f64 * px) / hypot - 0.5).ceil() as isize;
        if dy.unsigned_abs() >= input.height || dx.unsigned_abs() >= input.width {
            break;
        }
        for y in 0..input.height {
            for x in 0..input.width {
                let v = input.get_clamped(x as isize - dx, y as isize - dy);
                out.data[y * input.width + x] += wt * v;
            }
        }
    }

    out
}

/// Zoom into the center of a plane by `factor`, keeping its size.
pub fn center_zoom(input: &Plane, factor: f64) -> Plane {
    let cx = (input.width as f64 - 1.0) / 2.0;
    let cy = (input.height as f64 - 1.0) / 2.0;
    let mut out = Plane::new(input.width, input.height, 0.0);

    for y in 0..input.height {
        for x in 0..input.width {
            let sx = cx + (x as f64 - cx) / factor;
            let sy = cy + (y as f64 - cy) / factor;
            out.set(x, y, input.sample_bilinear(sx, sy));
        }
    }

    out
}

/// Area-weighted resize, valid for both down- and upsampling.
pub fn resize_area(input: &Plane, new_width: usize, new_height: usize) -> Plane {
    let new_width = new_width.max(1);
    let new_height = new_height.max(1);

    let horizontal = resample_axis(input.width, new_width);
    let mut tmp = Plane::new(new_width, input.height, 0.0);
    for y in 0..input.height {
        for (ox, taps) in horizontal.iter().enumerate() {
            let v = taps.iter().map(|&(ix, wt)| wt * input.get(ix, y)).sum();
            tmp.set(ox, y, v);
        }
    }

    let vertical = resample_axis(input.height, new_height);
    let mut out = Plane::new(new_width, new_height, 0.0);
    for (oy, taps) in vertical.iter().enumerate() {
        for x in 0..new_width {
            let v = taps.iter().map(|&(iy, wt)| wt * tmp.get(x, iy)).sum();
            out.set(x, oy, v);
        }
    }

    out
}

/// Source taps (index, weight) for each output sample of an area resize.
fn resample_axis(src_len: usize, dst_len: usize) -> Vec<Vec<(usize, f64)>> {
    let scale = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|o| {
            let start = o as f64 * scale;
            let end = (o + 1) as f64 * scale;
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(src_len);

            let mut taps: Vec<(usize, f64)> = (first..last)
                .filter_map(|i| {
                    let cover = (end.min(i as f64 + 1.0) - start.max(i as f64)).max(0.0);
                    (cover > 0.0).then_some((i, cover))
                })
                .collect();
            let total: f64 = taps.iter().map(|&(_, w)| w).sum();
            for tap in &mut taps {
                tap.1 /= total;
            }
            taps
        })
        .collect()
}

/// Nearest-neighbour resize.
pub fn resize_nearest(input: &Plane, new_width: usize, new_height: usize) -> Plane {
    let new_width = new_width.max(1);
    let new_height = new_height.max(1);
    let mut out = Plane::new(new_width, new_height, 0.0);
    for y in 0..new_height {
        let sy = (y * input.height / new_height).min(input.height - 1);
        for x in 0..new_width {
            let sx = (x * input.width / new_width).min(input.width - 1);
            out.set(x, y, input.get(sx, sy));
        }
    }
    out
}

/// 3x3 mean filter with mirrored borders.
pub fn box_blur3(input: &Plane) -> Plane {
    let kernel = Kernel {
        size: 3,
        data: vec![1.0 / 9.0; 9],
    };
    convolve2d(input, &kernel)
}

/// Sobel gradient magnitude.
pub fn sobel_magnitude(input: &Plane) -> Plane {
    let mut out = Plane::new(input.width, input.height, 0.0);
    for y in 0..input.height as isize {
        for x in 0..input.width as isize {
            let p = |dx: isize, dy: isize| input.get_reflected(x + dx, y + dy);
            let gx = (p(1, -1) + 2.0 * p(1, 0) + p(1, 1)) - (p(-1, -1) + 2.0 * p(-1, 0) + p(-1, 1));
            let gy = (p(-1, 1) + 2.0 * p(0, 1) + p(1, 1)) - (p(-1, -1) + 2.0 * p(0, -1) + p(1, -1));
            out.set(x as usize, y as usize, gx.hypot(gy));
        }
    }
    out
}

/// Approximate Euclidean distance to the nearest `true` cell.
///
/// Two-pass chamfer transform with 3-4 weights scaled to pixel units. With
/// no seed cells every distance saturates at `width + height`.
pub fn distance_transform(seeds: &[bool], width: usize, height: usize) -> Plane {
    const ORTHO: f64 = 1.0;
    const DIAG: f64 = 4.0 / 3.0;
    let far = (width + height) as f64;
    let mut d = Plane {
        width,
        height,
        data: seeds.iter().map(|&s| if s { 0.0 } else { far }).collect(),
    };

    let relax = |d: &mut Plane, x: usize, y: usize, nx: isize, ny: isize, cost: f64| {
        if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
            return;
        }
        let candidate = d.get(nx as usize, ny as usize) + cost;
        if candidate < d.get(x, y) {
            d.set(x, y, candidate);
        }
    };

    for y in 0..height {
        for x in 0..width {
            let (xi, yi) = (x as isize, y as isize);
            relax(&mut d, x, y, xi - 1, yi, ORTHO);
            relax(&mut d, x, y, xi, yi - 1, ORTHO);
            relax(&mut d, x, y, xi - 1, yi - 1, DIAG);
            relax(&mut d, x, y, xi + 1, yi - 1, DIAG);
        }
    }
    for y in (0..height).rev() {
        for x in (0..width).rev() {
            let (xi, yi) = (x as isize, y as isize);
            relax(&mut d, x, y, xi + 1, yi, ORTHO);
            relax(&mut d, x, y, xi, yi + 1, ORTHO);
            relax(&mut d, x, y, xi + 1, yi + 1, DIAG);
            relax(&mut d, x, y, xi - 1, yi + 1, DIAG);
        }
    }

    d.data.iter_mut().for_each(|v| *v = v.min(far));
    d
}

/// Warp a plane by per-pixel displacements, sampling bilinearly.
pub fn displace(input: &Plane, dx: &Plane, dy: &Plane) -> Plane {
    let mut out = Plane::new(input.width, input.height, 0.0);
    for y in 0..input.height {
        for x in 0..input.width {
            let sx = x as f64 + dx.get(x, y);
            let sy = y as f64 + dy.get(x, y);
            let rx = reflect_coord(sx, input.width);
            let ry = reflect_coord(sy, input.height);
            out.set(x, y, input.sample_bilinear(rx, ry));
        }
    }
    out
}

/// Mirror a continuous coordinate into `[0, n - 1]`.
fn reflect_coord(v: f64, n: usize) -> f64 {
    if n == 1 {
        return 0.0;
    }
    let last = (n - 1) as f64;
    let m = v.rem_euclid(2.0 * last);
    if m > last {
        2.0 * last - m
    } else {
        m
    }
}
