//! Reproducible Image Corruptions
//!
//! This crate provides a catalog of severity-parameterized image corruptions
//! (noise, blur, weather, digital and geometric) that replay bit-for-bit
//! given the same image, severity and seed.
//!
//! # Features
//!
//! - **Catalog**: nineteen pure functions `apply_<name>(image, severity, seed)`
//! - **Subsets**: the `common`, `validation` and `all` groups
//! - **Augmenters**: a stateful adapter that draws severities and seeds from
//!   a [`RandomState`] and forwards them to the wrapped function
//! - **Seed scopes**: [`with_temporary_seed`] for kernels that draw from
//!   ambient randomness
//!
//! # Example
//!
//! ```
//! use imgcorrupt::{apply_gaussian_noise, Image};
//!
//! let img = Image::test_card(32, 32);
//! let a = apply_gaussian_noise(&img, 5, 1).unwrap();
//! let b = apply_gaussian_noise(&img, 5, 1).unwrap();
//! assert_eq!(a, b);
//! assert_ne!(a, img);
//! ```
//!
//! # Determinism
//!
//! - Same image + same severity + same seed = identical output
//! - PCG32 is used for every random draw
//! - Severity-only corruptions ignore the seed entirely
//! - Inputs are never modified

pub mod ambient;
pub mod augmenter;
pub mod canvas;
pub mod color;
pub mod corruptions;
pub mod error;
pub mod filters;
pub mod image;
pub mod noise;
pub mod rng;
pub mod severity;
pub mod subset;

pub use ambient::{with_ambient_rng, with_temporary_seed};
pub use augmenter::{AugmenterConfig, CorruptionAugmenter, RandomStateArg, SeverityParam};
pub use corruptions::{
    apply_brightness, apply_contrast, apply_defocus_blur, apply_elastic_transform, apply_fog,
    apply_frost, apply_gaussian_blur, apply_gaussian_noise, apply_glass_blur, apply_impulse_noise,
    apply_jpeg_compression, apply_motion_blur, apply_pixelate, apply_saturate, apply_shot_noise,
    apply_snow, apply_spatter, apply_speckle_noise, apply_zoom_blur, corrupt, Corruption,
    CorruptionFn, Family,
};
pub use error::{CorruptError, Result};
pub use crate::image::{Dtype, Image, ImageData};
pub use rng::{DeterministicRng, RandomState};
pub use severity::Severity;
pub use subset::{get_corruption_names, resolve, Subset};
