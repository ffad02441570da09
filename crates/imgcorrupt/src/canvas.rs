//! Working buffers the corruption kernels operate on.
//!
//! Every corruption converts its input into an RGB [`Canvas`] of `f64` values
//! in `[0, 1]`, runs its math, and converts back with [`Canvas::into_image`].
//! Grayscale images are promoted by replicating their single channel and
//! demoted by keeping the first channel. A fourth (alpha) channel is carried
//! through untouched.

use crate::error::{CorruptError, Result};
use crate::image::{Dtype, Image, ImageData};

/// How to restore a canvas to the caller's shape and dtype.
#[derive(Debug, Clone)]
pub struct Layout {
    channels: Option<usize>,
    dtype: Dtype,
    /// Alpha values in `[0, 1]` for 4-channel inputs.
    alpha: Option<Vec<f64>>,
}

impl Layout {
    /// Element type of the original image.
    pub fn dtype(&self) -> Dtype {
        self.dtype
    }
}

/// RGB working buffer, row-major, interleaved, values nominally in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct Canvas {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Pixel data (3 values per pixel).
    pub data: Vec<f64>,
}

impl Canvas {
    /// Create a canvas filled with a value.
    pub fn new(width: usize, height: usize, fill: f64) -> Self {
        Self {
            width,
            height,
            data: vec![fill; width * height * 3],
        }
    }

    /// Normalize an image into a canvas plus the layout needed to undo it.
    pub fn from_image(image: &Image) -> Result<(Canvas, Layout)> {
        let channels = image.channels();
        if !matches!(channels, 1 | 3 | 4) {
            return Err(CorruptError::InvalidArgument(format!(
                "expected 1, 3 or 4 channels, got {}",
                channels
            )));
        }

        let (w, h) = (image.width(), image.height());
        let scale = 1.0 / image.dtype().max_value();
        let src = image.data();

        let mut data = Vec::with_capacity(w * h * 3);
        let mut alpha = (channels == 4).then(|| Vec::with_capacity(w * h));
        for p in 0..w * h {
            let base = p * channels;
            if channels == 1 {
                let v = src.get_f64(base) * scale;
                data.extend_from_slice(&[v, v, v]);
            } else {
                for c in 0..3 {
                    data.push(src.get_f64(base + c) * scale);
                }
            }
            if let Some(alpha) = alpha.as_mut() {
                alpha.push(src.get_f64(base + 3) * scale);
            }
        }

        let layout = Layout {
            channels: image.channel_axis(),
            dtype: image.dtype(),
            alpha,
        };
        Ok((
            Canvas {
                width: w,
                height: h,
                data,
            },
            layout,
        ))
    }

    /// Clip to `[0, 1]` and encode back into the original shape and dtype.
    pub fn into_image(self, layout: &Layout) -> Image {
        let channels = layout.channels.unwrap_or(1);
        let pixels = self.width * self.height;
        let data = &self.data;

        let values = (0..pixels * channels).map(|i| {
            let (p, c) = (i / channels, i % channels);
            match (channels, c) {
                (1, _) => data[p * 3],
                (4, 3) => layout.alpha.as_ref().map_or(1.0, |a| a[p]),
                _ => data[p * 3 + c],
            }
        });
        let encoded = ImageData::from_unit_values(layout.dtype, values);

        Image::from_parts(self.height, self.width, layout.channels, encoded)
    }

    /// Get a value.
    #[inline]
    pub fn get(&self, x: usize, y: usize, c: usize) -> f64 {
        self.data[(y * self.width + x) * 3 + c]
    }

    /// Set a value.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, c: usize, value: f64) {
        self.data[(y * self.width + x) * 3 + c] = value;
    }

    /// Get an RGB pixel.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [f64; 3] {
        let i = (y * self.width + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Set an RGB pixel.
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: [f64; 3]) {
        let i = (y * self.width + x) * 3;
        self.data[i..i + 3].copy_from_slice(&rgb);
    }

    /// Copy one channel out as a plane.
    pub fn channel(&self, c: usize) -> Plane {
        Plane {
            width: self.width,
            height: self.height,
            data: self.data.iter().skip(c).step_by(3).copied().collect(),
        }
    }

    /// Overwrite one channel from a plane of the same size.
    pub fn set_channel(&mut self, c: usize, plane: &Plane) {
        for (dst, &src) in self.data.iter_mut().skip(c).step_by(3).zip(&plane.data) {
            *dst = src;
        }
    }

    /// Apply a plane-to-plane function to each channel.
    pub fn map_channels(&self, mut f: impl FnMut(&Plane) -> Plane) -> Canvas {
        let mut out = self.clone();
        for c in 0..3 {
            let plane = f(&self.channel(c));
            out.set_channel(c, &plane);
        }
        out
    }

    /// Clip every value to `[0, 1]`.
    pub fn clip(&mut self) {
        for v in &mut self.data {
            *v = v.clamp(0.0, 1.0);
        }
    }

    /// Largest value in the canvas.
    pub fn max_value(&self) -> f64 {
        self.data.iter().copied().fold(f64::MIN, f64::max)
    }

    /// Per-pixel luma (ITU-R 601), as used for gray conversion.
    pub fn luma(&self) -> Plane {
        let mut out = Plane::new(self.width, self.height, 0.0);
        for (dst, px) in out.data.iter_mut().zip(self.data.chunks_exact(3)) {
            *dst = 0.299 * px[0] + 0.587 * px[1] + 0.114 * px[2];
        }
        out
    }
}

/// Single-channel working buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Pixel data (single channel, row-major).
    pub data: Vec<f64>,
}

impl Plane {
    /// Create a plane filled with a value.
    pub fn new(width: usize, height: usize, fill: f64) -> Self {
        Self {
            width,
            height,
            data: vec![fill; width * height],
        }
    }

    /// Get a value.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.width + x]
    }

    /// Set a value.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        self.data[y * self.width + x] = value;
    }

    /// Get a value with coordinates clamped to the edge.
    #[inline]
    pub fn get_clamped(&self, x: isize, y: isize) -> f64 {
        let cx = x.clamp(0, self.width as isize - 1) as usize;
        let cy = y.clamp(0, self.height as isize - 1) as usize;
        self.get(cx, cy)
    }

    /// Get a value with mirrored coordinates (edge pixel not repeated).
    #[inline]
    pub fn get_reflected(&self, x: isize, y: isize) -> f64 {
        self.get(reflect_101(x, self.width), reflect_101(y, self.height))
    }

    /// Sample with bilinear interpolation at pixel coordinates, clamping at the edges.
    pub fn sample_bilinear(&self, x: f64, y: f64) -> f64 {
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (xi, yi) = (x0 as isize, y0 as isize);

        let top = lerp(self.get_clamped(xi, yi), self.get_clamped(xi + 1, yi), fx);
        let bottom = lerp(
            self.get_clamped(xi, yi + 1),
            self.get_clamped(xi + 1, yi + 1),
            fx,
        );
        lerp(top, bottom, fy)
    }

    /// Mean of all values.
    pub fn mean(&self) -> f64 {
        self.data.iter().sum::<f64>() / self.data.len().max(1) as f64
    }

    /// Rotate by 180 degrees.
    pub fn rotate_180(&self) -> Plane {
        let mut data = self.data.clone();
        data.reverse();
        Plane {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

/// Linear interpolation.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Mirror an index into `[0, n)` without repeating the edge ("reflect 101").
#[inline]
pub fn reflect_101(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    let period = 2 * (n - 1);
    let m = i.rem_euclid(period);
    (if m < n { m } else { period - m }) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_gray_promotion_and_demotion() {
        let img = Image::from_u8(2, 2, None, vec![0, 51, 102, 255]).unwrap();
        let (canvas, layout) = Canvas::from_image(&img).unwrap();
        assert!(canvas.pixel(1, 0).iter().all(|&v| approx_eq(v, 0.2)));
        assert_eq!(canvas.into_image(&layout), img);
    }

    #[test]
    fn test_alpha_is_carried_through() {
        let img = Image::from_u8(1, 2, Some(4), vec![10, 20, 30, 40, 50, 60, 70, 80]).unwrap();
        let (mut canvas, layout) = Canvas::from_image(&img).unwrap();
        for v in &mut canvas.data {
            *v = 0.0;
        }
        let out = canvas.into_image(&layout);
        assert_eq!(out.as_u8().unwrap(), &[0, 0, 0, 40, 0, 0, 0, 80]);
    }

    #[test]
    fn test_unsupported_channel_count() {
        let img = Image::from_u8(1, 1, Some(2), vec![1, 2]).unwrap();
        assert!(Canvas::from_image(&img).is_err());
    }

    #[test]
    fn test_float_round_trip_clips() {
        // Dyadic values survive the f32 -> f64 -> f32 trip exactly.
        let img = Image::from_f32(1, 1, Some(3), vec![0.25, 0.5, 0.75]).unwrap();
        let (mut canvas, layout) = Canvas::from_image(&img).unwrap();
        canvas.data[0] = 2.0;
        let out = canvas.into_image(&layout);
        assert_eq!(out.data(), &ImageData::F32(vec![1.0, 0.5, 0.75]));
    }

    #[test]
    fn test_reflect_101() {
        assert_eq!(reflect_101(-1, 4), 1);
        assert_eq!(reflect_101(-2, 4), 2);
        assert_eq!(reflect_101(4, 4), 2);
        assert_eq!(reflect_101(5, 4), 1);
        assert_eq!(reflect_101(7, 1), 0);
    }

    #[test]
    fn test_bilinear_center_is_average() {
        let plane = Plane {
            width: 2,
            height: 2,
            data: vec![0.0, 1.0, 1.0, 0.0],
        };
        assert!(approx_eq(plane.sample_bilinear(0.5, 0.5), 0.5));
        assert!(approx_eq(plane.sample_bilinear(-3.0, 0.0), 0.0));
    }

    #[test]
    fn test_channel_round_trip() {
        let img = Image::test_card(4, 4);
        let (canvas, _) = Canvas::from_image(&img).unwrap();
        let mut copy = Canvas::new(4, 4, 0.0);
        for c in 0..3 {
            copy.set_channel(c, &canvas.channel(c));
        }
        assert_eq!(copy.data, canvas.data);
    }
}
