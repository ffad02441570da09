//! Augmenter adapter over the corruption catalog.
//!
//! A [`CorruptionAugmenter`] binds one catalog function to a severity policy
//! and a random state. Each call draws the severity, derives a seed from the
//! state and forwards both to the wrapped function, so
//! `augmenter.augment_image(img)` is exactly
//! `apply_<name>(img, severity, seed)` for the drawn values.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tracing::debug;

use crate::corruptions::{Corruption, CorruptionFn};
use crate::error::{CorruptError, Result};
use crate::image::Image;
use crate::rng::RandomState;
use crate::severity::Severity;

/// How an augmenter picks the severity for each image.
///
/// Deserializes from a bare integer (`Fixed`), a list (`Choice`) or a
/// `{"low": .., "high": ..}` object (`Uniform`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeverityParam {
    /// Always the same severity. Draws nothing from the random state.
    Fixed(u8),
    /// Uniformly one of the listed severities.
    Choice(Vec<u8>),
    /// Uniformly in `low..=high`.
    Uniform { low: u8, high: u8 },
}

impl Default for SeverityParam {
    fn default() -> Self {
        SeverityParam::Uniform {
            low: Severity::MIN,
            high: Severity::MAX,
        }
    }
}

impl From<Severity> for SeverityParam {
    fn from(severity: Severity) -> Self {
        SeverityParam::Fixed(severity.get())
    }
}

impl From<u8> for SeverityParam {
    fn from(severity: u8) -> Self {
        SeverityParam::Fixed(severity)
    }
}

impl From<Vec<u8>> for SeverityParam {
    fn from(options: Vec<u8>) -> Self {
        SeverityParam::Choice(options)
    }
}

impl From<RangeInclusive<u8>> for SeverityParam {
    fn from(range: RangeInclusive<u8>) -> Self {
        SeverityParam::Uniform {
            low: *range.start(),
            high: *range.end(),
        }
    }
}

impl SeverityParam {
    /// Check that every severity this parameter can produce is valid.
    pub fn validate(&self) -> Result<()> {
        match self {
            SeverityParam::Fixed(s) => Severity::new(*s).map(|_| ()),
            SeverityParam::Choice(options) => {
                if options.is_empty() {
                    return Err(CorruptError::InvalidArgument(
                        "severity choice list is empty".to_string(),
                    ));
                }
                options.iter().try_for_each(|s| Severity::new(*s).map(|_| ()))
            }
            SeverityParam::Uniform { low, high } => {
                Severity::new(*low)?;
                Severity::new(*high)?;
                if low > high {
                    return Err(CorruptError::InvalidArgument(format!(
                        "severity range {}..={} is empty",
                        low, high
                    )));
                }
                Ok(())
            }
        }
    }

    /// Draw one severity.
    fn draw(&self, state: &mut RandomState) -> u8 {
        match self {
            SeverityParam::Fixed(s) => *s,
            SeverityParam::Choice(options) => {
                options[state.rng_mut().gen_range(0..options.len())]
            }
            SeverityParam::Uniform { low, high } => state.rng_mut().gen_range(*low..=*high),
        }
    }
}

/// Where an augmenter's randomness comes from.
#[derive(Debug, Clone, Default)]
pub enum RandomStateArg {
    /// A state rooted at this seed.
    Seed(u32),
    /// An existing state, taken over by the augmenter.
    State(RandomState),
    /// Fresh operating system entropy. Not reproducible.
    #[default]
    Unseeded,
}

impl RandomStateArg {
    fn into_state(self) -> RandomState {
        match self {
            RandomStateArg::Seed(seed) => RandomState::new(seed),
            RandomStateArg::State(state) => state,
            RandomStateArg::Unseeded => RandomState::from_entropy(),
        }
    }
}

impl From<u32> for RandomStateArg {
    fn from(seed: u32) -> Self {
        RandomStateArg::Seed(seed)
    }
}

impl From<RandomState> for RandomStateArg {
    fn from(state: RandomState) -> Self {
        RandomStateArg::State(state)
    }
}

/// A catalog function wrapped with a severity policy and a random state.
#[derive(Debug, Clone)]
pub struct CorruptionAugmenter {
    corruption: Corruption,
    severity: SeverityParam,
    state: RandomState,
    name: String,
    deterministic: bool,
}

impl CorruptionAugmenter {
    /// Wrap a corruption with the default severity range and an unseeded state.
    pub fn new(corruption: Corruption) -> Self {
        Self {
            corruption,
            severity: SeverityParam::default(),
            state: RandomState::from_entropy(),
            name: default_name(corruption),
            deterministic: false,
        }
    }

    /// Set the severity policy.
    pub fn with_severity(mut self, severity: impl Into<SeverityParam>) -> Result<Self> {
        let severity = severity.into();
        severity.validate()?;
        self.severity = severity;
        Ok(self)
    }

    /// Set the random state.
    pub fn with_random_state(mut self, random_state: impl Into<RandomStateArg>) -> Self {
        self.state = random_state.into().into_state();
        self
    }

    /// Set the augmenter's name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The wrapped catalog function, identical to `apply_<name>`.
    pub fn func(&self) -> CorruptionFn {
        self.corruption.func()
    }

    /// The wrapped corruption.
    pub fn corruption(&self) -> Corruption {
        self.corruption
    }

    /// The augmenter's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The severity policy.
    pub fn severity(&self) -> &SeverityParam {
        &self.severity
    }

    /// Whether every call replays the same draws.
    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    /// Corrupt one image.
    pub fn augment_image(&mut self, image: &Image) -> Result<Image> {
        let mut out = self.augment_images(std::slice::from_ref(image))?;
        out.pop().ok_or_else(|| {
            CorruptError::InvalidArgument("augmenter produced no output".to_string())
        })
    }

    /// Corrupt a batch. All severities are drawn first, then all seeds, then
    /// the images are processed in order.
    pub fn augment_images(&mut self, images: &[Image]) -> Result<Vec<Image>> {
        let mut frozen;
        let state = if self.deterministic {
            frozen = self.state.duplicate();
            &mut frozen
        } else {
            &mut self.state
        };

        let severities: Vec<u8> = (0..images.len())
            .map(|_| self.severity.draw(state))
            .collect();
        let seeds = state.derive_seeds(images.len());

        let func = self.corruption.func();
        images
            .iter()
            .zip(severities.iter().zip(&seeds))
            .map(|(image, (&severity, &seed))| {
                debug!(
                    augmenter = %self.name,
                    corruption = self.corruption.name(),
                    severity,
                    seed,
                    "augmenter draw"
                );
                func(image, severity, seed)
            })
            .collect()
    }

    /// A copy that replays the same draws on every call.
    ///
    /// The copy owns a child state derived from this augmenter's state, so
    /// this augmenter's cursor advances once.
    pub fn to_deterministic(&mut self) -> CorruptionAugmenter {
        CorruptionAugmenter {
            corruption: self.corruption,
            severity: self.severity.clone(),
            state: self.state.derive_child(),
            name: self.name.clone(),
            deterministic: true,
        }
    }
}

/// `"Unnamed"` followed by the CamelCase corruption name.
fn default_name(corruption: Corruption) -> String {
    let camel: String = corruption
        .name()
        .split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    format!("Unnamed{}", camel)
}

/// Serializable augmenter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AugmenterConfig {
    /// Catalog name of the corruption.
    pub corruption: String,
    /// Severity policy; the full range when absent.
    #[serde(default)]
    pub severity: SeverityParam,
    /// Root seed; unseeded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
    /// Augmenter name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl AugmenterConfig {
    /// Build the configured augmenter.
    pub fn build(&self) -> Result<CorruptionAugmenter> {
        let corruption = Corruption::from_name(&self.corruption)?;
        let random_state = match self.seed {
            Some(seed) => RandomStateArg::Seed(seed),
            None => RandomStateArg::Unseeded,
        };
        let mut augmenter = CorruptionAugmenter::new(corruption)
            .with_severity(self.severity.clone())?
            .with_random_state(random_state);
        if let Some(name) = &self.name {
            augmenter = augmenter.with_name(name.clone());
        }
        Ok(augmenter)
    }
}

macro_rules! augmenter_factories {
    ($($fn_name:ident => $variant:ident),* $(,)?) => {
        $(
            #[doc = concat!("Augmenter wrapping `apply_", stringify!($fn_name), "`.")]
            pub fn $fn_name(
                severity: impl Into<SeverityParam>,
                random_state: impl Into<RandomStateArg>,
            ) -> Result<CorruptionAugmenter> {
                Ok(CorruptionAugmenter::new(Corruption::$variant)
                    .with_severity(severity)?
                    .with_random_state(random_state))
            }
        )*
    };
}

augmenter_factories! {
    gaussian_noise => GaussianNoise,
    shot_noise => ShotNoise,
    impulse_noise => ImpulseNoise,
    speckle_noise => SpeckleNoise,
    gaussian_blur => GaussianBlur,
    glass_blur => GlassBlur,
    defocus_blur => DefocusBlur,
    motion_blur => MotionBlur,
    zoom_blur => ZoomBlur,
    fog => Fog,
    frost => Frost,
    snow => Snow,
    spatter => Spatter,
    contrast => Contrast,
    brightness => Brightness,
    saturate => Saturate,
    jpeg_compression => JpegCompression,
    pixelate => Pixelate,
    elastic_transform => ElasticTransform,
}
