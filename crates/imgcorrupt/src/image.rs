//! Owned image buffers accepted and returned by every corruption.
//!
//! An [`Image`] is either 2-D (H, W) or 3-D (H, W, C), row-major with
//! interleaved channels. Integer dtypes cover `[0, MAX]`, float dtypes cover
//! `[0.0, 1.0]`.

use crate::error::{CorruptError, Result};

/// Element type of an image buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dtype {
    U8,
    U16,
    F32,
    F64,
}

impl Dtype {
    /// Returns the numpy-style dtype name.
    pub fn name(&self) -> &'static str {
        match self {
            Dtype::U8 => "uint8",
            Dtype::U16 => "uint16",
            Dtype::F32 => "float32",
            Dtype::F64 => "float64",
        }
    }

    /// Whether this dtype belongs to the unsigned integer family.
    pub fn is_integer(&self) -> bool {
        matches!(self, Dtype::U8 | Dtype::U16)
    }

    /// Whether this dtype belongs to the floating point family.
    pub fn is_float(&self) -> bool {
        !self.is_integer()
    }

    /// Upper end of the value domain (`1.0` for floats).
    pub fn max_value(&self) -> f64 {
        match self {
            Dtype::U8 => u8::MAX as f64,
            Dtype::U16 => u16::MAX as f64,
            Dtype::F32 | Dtype::F64 => 1.0,
        }
    }
}

impl std::fmt::Display for Dtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed element storage.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageData {
    U8(Vec<u8>),
    U16(Vec<u16>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl ImageData {
    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            ImageData::U8(v) => v.len(),
            ImageData::U16(v) => v.len(),
            ImageData::F32(v) => v.len(),
            ImageData::F64(v) => v.len(),
        }
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the first NaN or infinite element, if any.
    pub fn first_non_finite(&self) -> Option<usize> {
        match self {
            ImageData::U8(_) | ImageData::U16(_) => None,
            ImageData::F32(v) => v.iter().position(|x| !x.is_finite()),
            ImageData::F64(v) => v.iter().position(|x| !x.is_finite()),
        }
    }

    /// Element type of the buffer.
    pub fn dtype(&self) -> Dtype {
        match self {
            ImageData::U8(_) => Dtype::U8,
            ImageData::U16(_) => Dtype::U16,
            ImageData::F32(_) => Dtype::F32,
            ImageData::F64(_) => Dtype::F64,
        }
    }

    /// Read one element as `f64`, in the dtype's own domain.
    #[inline]
    pub fn get_f64(&self, idx: usize) -> f64 {
        match self {
            ImageData::U8(v) => v[idx] as f64,
            ImageData::U16(v) => v[idx] as f64,
            ImageData::F32(v) => v[idx] as f64,
            ImageData::F64(v) => v[idx],
        }
    }

    /// Encode values in `[0, 1]` into a buffer of the given dtype.
    ///
    /// Values are clipped to `[0, 1]`; integer dtypes are scaled to their
    /// domain and rounded to nearest.
    pub fn from_unit_values(dtype: Dtype, values: impl Iterator<Item = f64>) -> Self {
        let max = dtype.max_value();
        match dtype {
            Dtype::U8 => ImageData::U8(
                values
                    .map(|v| (v.clamp(0.0, 1.0) * max).round() as u8)
                    .collect(),
            ),
            Dtype::U16 => ImageData::U16(
                values
                    .map(|v| (v.clamp(0.0, 1.0) * max).round() as u16)
                    .collect(),
            ),
            Dtype::F32 => ImageData::F32(values.map(|v| v.clamp(0.0, 1.0) as f32).collect()),
            Dtype::F64 => ImageData::F64(values.map(|v| v.clamp(0.0, 1.0)).collect()),
        }
    }
}

/// An image of shape (H, W) or (H, W, C).
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    height: usize,
    width: usize,
    /// `None` for a 2-D image.
    channels: Option<usize>,
    data: ImageData,
}

impl Image {
    /// Create an image, validating that the buffer matches the shape.
    pub fn new(
        height: usize,
        width: usize,
        channels: Option<usize>,
        data: ImageData,
    ) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(CorruptError::InvalidArgument(format!(
                "image must have non-zero height and width, got {}x{}",
                height, width
            )));
        }
        if channels == Some(0) {
            return Err(CorruptError::InvalidArgument(
                "image channel axis must not be empty".to_string(),
            ));
        }

        let expected = height * width * channels.unwrap_or(1);
        if data.len() != expected {
            return Err(CorruptError::InvalidArgument(format!(
                "expected {} elements for shape {:?}, got {}",
                expected,
                shape_of(height, width, channels),
                data.len()
            )));
        }
        if let Some(idx) = data.first_non_finite() {
            return Err(CorruptError::InvalidArgument(format!(
                "float image element {} is not finite",
                idx
            )));
        }

        Ok(Self {
            height,
            width,
            channels,
            data,
        })
    }

    /// Create an 8-bit image.
    pub fn from_u8(
        height: usize,
        width: usize,
        channels: Option<usize>,
        data: Vec<u8>,
    ) -> Result<Self> {
        Self::new(height, width, channels, ImageData::U8(data))
    }

    /// Create a 32-bit float image.
    pub fn from_f32(
        height: usize,
        width: usize,
        channels: Option<usize>,
        data: Vec<f32>,
    ) -> Result<Self> {
        Self::new(height, width, channels, ImageData::F32(data))
    }

    /// The (H, W, C) test card: a `uint8` image whose flattened elements are
    /// `i mod 256`.
    pub fn test_card(height: usize, width: usize) -> Self {
        let (height, width) = (height.max(1), width.max(1));
        let data = (0..height * width * 3).map(|i| (i % 256) as u8).collect();
        Self {
            height,
            width,
            channels: Some(3),
            data: ImageData::U8(data),
        }
    }

    /// Assemble an image whose layout the caller has already validated.
    pub(crate) fn from_parts(
        height: usize,
        width: usize,
        channels: Option<usize>,
        data: ImageData,
    ) -> Self {
        debug_assert_eq!(data.len(), height * width * channels.unwrap_or(1));
        Self {
            height,
            width,
            channels,
            data,
        }
    }

    /// Image height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Image width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Channel axis length, or `None` for a 2-D image.
    pub fn channel_axis(&self) -> Option<usize> {
        self.channels
    }

    /// Number of channels (1 for a 2-D image).
    pub fn channels(&self) -> usize {
        self.channels.unwrap_or(1)
    }

    /// Whether the image is 2-D.
    pub fn is_2d(&self) -> bool {
        self.channels.is_none()
    }

    /// Shape as `[H, W]` or `[H, W, C]`.
    pub fn shape(&self) -> Vec<usize> {
        shape_of(self.height, self.width, self.channels)
    }

    /// Element type.
    pub fn dtype(&self) -> Dtype {
        self.data.dtype()
    }

    /// Typed element storage.
    pub fn data(&self) -> &ImageData {
        &self.data
    }

    /// Consume the image and return its storage.
    pub fn into_data(self) -> ImageData {
        self.data
    }

    /// 8-bit elements, if this is a `uint8` image.
    pub fn as_u8(&self) -> Option<&[u8]> {
        match &self.data {
            ImageData::U8(v) => Some(v),
            _ => None,
        }
    }

    /// Read the element at (y, x, c) as `f64` in the dtype's own domain.
    #[inline]
    pub fn get_f64(&self, y: usize, x: usize, c: usize) -> f64 {
        let ch = self.channels();
        self.data.get_f64((y * self.width + x) * ch + c)
    }

    /// Sum of all elements, used to detect in-place modification.
    pub fn checksum(&self) -> f64 {
        (0..self.data.len()).map(|i| self.data.get_f64(i)).sum()
    }

    /// Whether two images have the same shape and dtype.
    pub fn same_layout(&self, other: &Image) -> bool {
        self.shape() == other.shape() && self.dtype() == other.dtype()
    }
}

fn shape_of(height: usize, width: usize, channels: Option<usize>) -> Vec<usize> {
    match channels {
        Some(c) => vec![height, width, c],
        None => vec![height, width],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_mismatched_buffer() {
        let err = Image::from_u8(2, 2, Some(3), vec![0; 11]).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(Image::from_u8(0, 2, None, vec![]).is_err());
        assert!(Image::from_u8(2, 2, Some(0), vec![]).is_err());
    }

    #[test]
    fn test_new_rejects_non_finite_floats() {
        for bad in [f32::INFINITY, f32::NEG_INFINITY, f32::NAN] {
            let err = Image::from_f32(1, 2, Some(3), vec![bad, 0.5, 0.5, 0.5, 0.5, 0.5])
                .unwrap_err();
            assert!(err.is_invalid_argument());
        }
        let err = Image::new(1, 1, None, ImageData::F64(vec![f64::INFINITY])).unwrap_err();
        assert!(err.to_string().contains("element 0"));
        assert!(Image::from_f32(1, 1, None, vec![1e30]).is_ok());
    }

    #[test]
    fn test_shape_and_dtype() {
        let gray = Image::from_u8(4, 5, None, vec![0; 20]).unwrap();
        assert_eq!(gray.shape(), vec![4, 5]);
        assert!(gray.is_2d());
        assert_eq!(gray.channels(), 1);

        let rgb = Image::from_f32(4, 5, Some(3), vec![0.5; 60]).unwrap();
        assert_eq!(rgb.shape(), vec![4, 5, 3]);
        assert_eq!(rgb.dtype(), Dtype::F32);
        assert!(rgb.dtype().is_float());
        assert!(!gray.same_layout(&rgb));
    }

    #[test]
    fn test_test_card_values() {
        let card = Image::test_card(32, 32);
        assert_eq!(card.shape(), vec![32, 32, 3]);
        let data = card.as_u8().unwrap();
        assert_eq!(data[0], 0);
        assert_eq!(data[255], 255);
        assert_eq!(data[256], 0);
        assert_eq!(card.get_f64(0, 1, 0), 3.0);
    }

    #[test]
    fn test_from_unit_values_clips_and_rounds() {
        let data = ImageData::from_unit_values(Dtype::U8, [-0.5, 0.5, 1.5].into_iter());
        assert_eq!(data, ImageData::U8(vec![0, 128, 255]));

        let data = ImageData::from_unit_values(Dtype::F32, [-0.5, 0.25].into_iter());
        assert_eq!(data, ImageData::F32(vec![0.0, 0.25]));
    }

    #[test]
    fn test_checksum() {
        let img = Image::from_u8(1, 3, None, vec![1, 2, 3]).unwrap();
        assert_eq!(img.checksum(), 6.0);
    }
}
