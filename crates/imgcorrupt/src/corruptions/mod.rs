//! The corruption catalog.
//!
//! Each entry is a pure function `apply_<name>(image, severity, seed)` that
//! validates its arguments, converts the image to a [`Canvas`], runs one
//! degradation, and converts back to the input's shape and dtype. The input
//! is never modified.
//!
//! Seed-dependent corruptions (the noise family, fog, snow, spatter and
//! elastic_transform) source every random draw from `seed`. The others are
//! severity-only: the seed is accepted but has no effect on the output.

mod blur;
mod digital;
mod geometric;
mod noise;
mod weather;

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::canvas::Canvas;
use crate::error::{CorruptError, Result};
use crate::image::Image;
use crate::rng::DeterministicRng;
use crate::severity::Severity;

/// Signature shared by every catalog function.
pub type CorruptionFn = fn(&Image, u8, u32) -> Result<Image>;

/// Kernel operating on the normalized working form.
type Kernel = fn(&Canvas, Severity, u32) -> Result<Canvas>;

/// Corruption family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Noise,
    Blur,
    Weather,
    Digital,
    Geometric,
}

impl Family {
    /// Returns the family name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Noise => "noise",
            Family::Blur => "blur",
            Family::Weather => "weather",
            Family::Digital => "digital",
            Family::Geometric => "geometric",
        }
    }
}

/// A named entry of the corruption catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corruption {
    GaussianNoise,
    ShotNoise,
    ImpulseNoise,
    SpeckleNoise,
    GaussianBlur,
    GlassBlur,
    DefocusBlur,
    MotionBlur,
    ZoomBlur,
    Fog,
    Frost,
    Snow,
    Spatter,
    Contrast,
    Brightness,
    Saturate,
    JpegCompression,
    Pixelate,
    ElasticTransform,
}

impl Corruption {
    /// Every corruption, in catalog order.
    pub const ALL: [Corruption; 19] = [
        Corruption::GaussianNoise,
        Corruption::ShotNoise,
        Corruption::ImpulseNoise,
        Corruption::SpeckleNoise,
        Corruption::GaussianBlur,
        Corruption::GlassBlur,
        Corruption::DefocusBlur,
        Corruption::MotionBlur,
        Corruption::ZoomBlur,
        Corruption::Fog,
        Corruption::Frost,
        Corruption::Snow,
        Corruption::Spatter,
        Corruption::Contrast,
        Corruption::Brightness,
        Corruption::Saturate,
        Corruption::JpegCompression,
        Corruption::Pixelate,
        Corruption::ElasticTransform,
    ];

    /// Returns the catalog name.
    pub fn name(&self) -> &'static str {
        match self {
            Corruption::GaussianNoise => "gaussian_noise",
            Corruption::ShotNoise => "shot_noise",
            Corruption::ImpulseNoise => "impulse_noise",
            Corruption::SpeckleNoise => "speckle_noise",
            Corruption::GaussianBlur => "gaussian_blur",
            Corruption::GlassBlur => "glass_blur",
            Corruption::DefocusBlur => "defocus_blur",
            Corruption::MotionBlur => "motion_blur",
            Corruption::ZoomBlur => "zoom_blur",
            Corruption::Fog => "fog",
            Corruption::Frost => "frost",
            Corruption::Snow => "snow",
            Corruption::Spatter => "spatter",
            Corruption::Contrast => "contrast",
            Corruption::Brightness => "brightness",
            Corruption::Saturate => "saturate",
            Corruption::JpegCompression => "jpeg_compression",
            Corruption::Pixelate => "pixelate",
            Corruption::ElasticTransform => "elastic_transform",
        }
    }

    /// Look a corruption up by catalog name.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name() == name)
            .ok_or_else(|| CorruptError::UnknownCorruption(name.to_string()))
    }

    /// Returns the family this corruption belongs to.
    pub fn family(&self) -> Family {
        match self {
            Corruption::GaussianNoise
            | Corruption::ShotNoise
            | Corruption::ImpulseNoise
            | Corruption::SpeckleNoise => Family::Noise,
            Corruption::GaussianBlur
            | Corruption::GlassBlur
            | Corruption::DefocusBlur
            | Corruption::MotionBlur
            | Corruption::ZoomBlur => Family::Blur,
            Corruption::Fog | Corruption::Frost | Corruption::Snow | Corruption::Spatter => {
                Family::Weather
            }
            Corruption::Contrast
            | Corruption::Brightness
            | Corruption::Saturate
            | Corruption::JpegCompression
            | Corruption::Pixelate => Family::Digital,
            Corruption::ElasticTransform => Family::Geometric,
        }
    }

    /// Whether the output varies with the seed at a fixed severity.
    pub fn is_seed_dependent(&self) -> bool {
        match self.family() {
            Family::Noise | Family::Geometric => true,
            Family::Blur | Family::Digital => false,
            Family::Weather => !matches!(self, Corruption::Frost),
        }
    }

    /// The canonical catalog function for this corruption.
    pub fn func(&self) -> CorruptionFn {
        match self {
            Corruption::GaussianNoise => apply_gaussian_noise,
            Corruption::ShotNoise => apply_shot_noise,
            Corruption::ImpulseNoise => apply_impulse_noise,
            Corruption::SpeckleNoise => apply_speckle_noise,
            Corruption::GaussianBlur => apply_gaussian_blur,
            Corruption::GlassBlur => apply_glass_blur,
            Corruption::DefocusBlur => apply_defocus_blur,
            Corruption::MotionBlur => apply_motion_blur,
            Corruption::ZoomBlur => apply_zoom_blur,
            Corruption::Fog => apply_fog,
            Corruption::Frost => apply_frost,
            Corruption::Snow => apply_snow,
            Corruption::Spatter => apply_spatter,
            Corruption::Contrast => apply_contrast,
            Corruption::Brightness => apply_brightness,
            Corruption::Saturate => apply_saturate,
            Corruption::JpegCompression => apply_jpeg_compression,
            Corruption::Pixelate => apply_pixelate,
            Corruption::ElasticTransform => apply_elastic_transform,
        }
    }

    /// Apply this corruption.
    pub fn apply(&self, image: &Image, severity: u8, seed: u32) -> Result<Image> {
        (self.func())(image, severity, seed)
    }

    fn kernel(&self) -> Kernel {
        match self {
            Corruption::GaussianNoise => noise::gaussian_noise,
            Corruption::ShotNoise => noise::shot_noise,
            Corruption::ImpulseNoise => noise::impulse_noise,
            Corruption::SpeckleNoise => noise::speckle_noise,
            Corruption::GaussianBlur => blur::gaussian_blur,
            Corruption::GlassBlur => blur::glass_blur,
            Corruption::DefocusBlur => blur::defocus_blur,
            Corruption::MotionBlur => blur::motion_blur,
            Corruption::ZoomBlur => blur::zoom_blur,
            Corruption::Fog => weather::fog,
            Corruption::Frost => weather::frost,
            Corruption::Snow => weather::snow,
            Corruption::Spatter => weather::spatter,
            Corruption::Contrast => digital::contrast,
            Corruption::Brightness => digital::brightness,
            Corruption::Saturate => digital::saturate,
            Corruption::JpegCompression => digital::jpeg_compression,
            Corruption::Pixelate => digital::pixelate,
            Corruption::ElasticTransform => geometric::elastic_transform,
        }
    }
}

impl FromStr for Corruption {
    type Err = CorruptError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl std::fmt::Display for Corruption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Apply a corruption selected by catalog name.
pub fn corrupt(image: &Image, corruption_name: &str, severity: u8, seed: u32) -> Result<Image> {
    Corruption::from_name(corruption_name)?.apply(image, severity, seed)
}

/// Validate, normalize, run the kernel and restore the caller's layout.
fn run(corruption: Corruption, image: &Image, severity: u8, seed: u32) -> Result<Image> {
    let severity = Severity::new(severity)?;
    let (canvas, layout) = Canvas::from_image(image)?;

    debug!(
        corruption = corruption.name(),
        severity = severity.get(),
        seed,
        shape = ?image.shape(),
        dtype = %layout.dtype(),
        "applying corruption"
    );

    let out = (corruption.kernel())(&canvas, severity, seed)?;
    Ok(out.into_image(&layout))
}

/// RNG for severity-only corruptions whose math is stochastic.
///
/// Seeded from the corruption name and severity alone, never from the
/// caller's seed.
pub(crate) fn severity_rng(corruption: Corruption, severity: Severity) -> DeterministicRng {
    DeterministicRng::new(DeterministicRng::derive_variant_seed(
        severity.get() as u32,
        corruption.name(),
    ))
}

/// Additive Gaussian noise.
pub fn apply_gaussian_noise(image: &Image, severity: u8, seed: u32) -> Result<Image> {
    run(Corruption::GaussianNoise, image, severity, seed)
}

/// Poisson photon noise.
pub fn apply_shot_noise(image: &Image, severity: u8, seed: u32) -> Result<Image> {
    run(Corruption::ShotNoise, image, severity, seed)
}

/// Salt-and-pepper noise.
pub fn apply_impulse_noise(image: &Image, severity: u8, seed: u32) -> Result<Image> {
    run(Corruption::ImpulseNoise, image, severity, seed)
}

/// Multiplicative Gaussian noise.
pub fn apply_speckle_noise(image: &Image, severity: u8, seed: u32) -> Result<Image> {
    run(Corruption::SpeckleNoise, image, severity, seed)
}

/// Gaussian blur. Severity-only.
pub fn apply_gaussian_blur(image: &Image, severity: u8, seed: u32) -> Result<Image> {
    run(Corruption::GaussianBlur, image, severity, seed)
}

/// Frosted-glass blur. Severity-only.
pub fn apply_glass_blur(image: &Image, severity: u8, seed: u32) -> Result<Image> {
    run(Corruption::GlassBlur, image, severity, seed)
}

/// Out-of-focus lens blur. Severity-only.
pub fn apply_defocus_blur(image: &Image, severity: u8, seed: u32) -> Result<Image> {
    run(Corruption::DefocusBlur, image, severity, seed)
}

/// Directional camera-shake blur. Severity-only.
pub fn apply_motion_blur(image: &Image, severity: u8, seed: u32) -> Result<Image> {
    run(Corruption::MotionBlur, image, severity, seed)
}

/// Radial zoom blur. Severity-only.
pub fn apply_zoom_blur(image: &Image, severity: u8, seed: u32) -> Result<Image> {
    run(Corruption::ZoomBlur, image, severity, seed)
}

/// Plasma-fractal fog.
pub fn apply_fog(image: &Image, severity: u8, seed: u32) -> Result<Image> {
    run(Corruption::Fog, image, severity, seed)
}

/// Frost overlay. Severity-only.
pub fn apply_frost(image: &Image, severity: u8, seed: u32) -> Result<Image> {
    run(Corruption::Frost, image, severity, seed)
}

/// Falling snow.
pub fn apply_snow(image: &Image, severity: u8, seed: u32) -> Result<Image> {
    run(Corruption::Snow, image, severity, seed)
}

/// Water or mud splashes.
pub fn apply_spatter(image: &Image, severity: u8, seed: u32) -> Result<Image> {
    run(Corruption::Spatter, image, severity, seed)
}

/// Contrast reduction. Severity-only.
pub fn apply_contrast(image: &Image, severity: u8, seed: u32) -> Result<Image> {
    run(Corruption::Contrast, image, severity, seed)
}

/// Brightness increase. Severity-only.
pub fn apply_brightness(image: &Image, severity: u8, seed: u32) -> Result<Image> {
    run(Corruption::Brightness, image, severity, seed)
}

/// Saturation change. Severity-only.
///
/// Grayscale inputs (2-D or one channel) are returned unchanged at every
/// severity, since gray pixels carry no saturation to rescale.
pub fn apply_saturate(image: &Image, severity: u8, seed: u32) -> Result<Image> {
    run(Corruption::Saturate, image, severity, seed)
}

/// JPEG compression artifacts. Severity-only.
pub fn apply_jpeg_compression(image: &Image, severity: u8, seed: u32) -> Result<Image> {
    run(Corruption::JpegCompression, image, severity, seed)
}

/// Pixelation. Severity-only.
pub fn apply_pixelate(image: &Image, severity: u8, seed: u32) -> Result<Image> {
    run(Corruption::Pixelate, image, severity, seed)
}

/// Elastic warp.
pub fn apply_elastic_transform(image: &Image, severity: u8, seed: u32) -> Result<Image> {
    run(Corruption::ElasticTransform, image, severity, seed)
}
