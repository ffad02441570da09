//! Image loading and deterministic PNG output.
//!
//! PNG files are written with fixed compression and filter settings, so the
//! same image always produces the same bytes and the same BLAKE3 digest.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use image::{ColorType as DecodedColor, DynamicImage};
use imgcorrupt::{Image, ImageData};
use png::{BitDepth, ColorType, Compression, Encoder, FilterType};

/// PNG export configuration for deterministic output.
#[derive(Debug, Clone)]
pub struct PngConfig {
    /// Compression level. Use a fixed value for determinism.
    pub compression: Compression,
    /// Filter type. Use a fixed value for determinism.
    pub filter: FilterType,
}

impl Default for PngConfig {
    fn default() -> Self {
        Self {
            compression: Compression::Default,
            filter: FilterType::NoFilter,
        }
    }
}

/// Decode an image file, keeping grayscale, alpha and 16-bit depth.
pub fn load_image(path: &Path) -> Result<Image> {
    let decoded =
        image::open(path).with_context(|| format!("Failed to decode image: {}", path.display()))?;
    from_dynamic(decoded)
}

fn from_dynamic(decoded: DynamicImage) -> Result<Image> {
    let (w, h) = (decoded.width() as usize, decoded.height() as usize);
    let image = match decoded.color() {
        DecodedColor::L8 => Image::from_u8(h, w, None, decoded.to_luma8().into_raw()),
        DecodedColor::L16 => Image::new(
            h,
            w,
            None,
            ImageData::U16(decoded.to_luma16().into_raw()),
        ),
        // Gray plus alpha stays two-channel; corrupting it fails with a clear error.
        DecodedColor::La8 => Image::from_u8(h, w, Some(2), decoded.to_luma_alpha8().into_raw()),
        DecodedColor::La16 => Image::new(
            h,
            w,
            Some(2),
            ImageData::U16(decoded.to_luma_alpha16().into_raw()),
        ),
        DecodedColor::Rgba8 => Image::from_u8(h, w, Some(4), decoded.to_rgba8().into_raw()),
        DecodedColor::Rgb16 => {
            Image::new(h, w, Some(3), ImageData::U16(decoded.to_rgb16().into_raw()))
        }
        DecodedColor::Rgba16 => {
            Image::new(h, w, Some(4), ImageData::U16(decoded.to_rgba16().into_raw()))
        }
        DecodedColor::Rgb32F => Image::from_f32(h, w, Some(3), decoded.to_rgb32f().into_raw()),
        DecodedColor::Rgba32F => {
            Image::from_f32(h, w, Some(4), decoded.to_rgba32f().into_raw())
        }
        _ => Image::from_u8(h, w, Some(3), decoded.to_rgb8().into_raw()),
    };
    Ok(image?)
}

/// Encode an image as PNG bytes.
///
/// 16-bit images keep their depth; float images are quantized to 8 bits.
pub fn encode_png(image: &Image, config: &PngConfig) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    write_png_to_writer(image, &mut bytes, config)?;
    Ok(bytes)
}

/// Write an image as PNG to any writer.
pub fn write_png_to_writer<W: Write>(image: &Image, writer: W, config: &PngConfig) -> Result<()> {
    let color = match image.channels() {
        1 => ColorType::Grayscale,
        3 => ColorType::Rgb,
        4 => ColorType::Rgba,
        n => bail!("Cannot write a {}-channel image as PNG", n),
    };
    let width = u32::try_from(image.width()).context("Image too wide for PNG")?;
    let height = u32::try_from(image.height()).context("Image too tall for PNG")?;

    let (depth, data) = match image.data() {
        ImageData::U8(v) => (BitDepth::Eight, v.clone()),
        ImageData::U16(v) => (
            BitDepth::Sixteen,
            v.iter().flat_map(|s| s.to_be_bytes()).collect(),
        ),
        ImageData::F32(v) => (BitDepth::Eight, v.iter().map(|&f| unit_to_u8(f as f64)).collect()),
        ImageData::F64(v) => (BitDepth::Eight, v.iter().map(|&f| unit_to_u8(f)).collect()),
    };

    let mut encoder = Encoder::new(writer, width, height);
    encoder.set_color(color);
    encoder.set_depth(depth);
    encoder.set_compression(config.compression);
    encoder.set_filter(config.filter);

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&data)?;

    Ok(())
}

/// Write an image to a PNG file and return the BLAKE3 hex digest of its bytes.
pub fn write_png(image: &Image, path: &Path, config: &PngConfig) -> Result<String> {
    let bytes = encode_png(image, config)?;
    fs::write(path, &bytes).with_context(|| format!("Failed to write: {}", path.display()))?;
    Ok(digest(&bytes))
}

/// BLAKE3 hex digest.
pub fn digest(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

fn unit_to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
