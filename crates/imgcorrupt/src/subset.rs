//! Named, ordered groups of catalog entries.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::corruptions::{Corruption, CorruptionFn};
use crate::error::{CorruptError, Result};

/// A named subset of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subset {
    /// The fifteen benchmark corruptions.
    Common,
    /// Held-out corruptions for validation.
    Validation,
    /// `Common` followed by `Validation`.
    All,
}

const COMMON: [Corruption; 15] = [
    Corruption::GaussianNoise,
    Corruption::ShotNoise,
    Corruption::ImpulseNoise,
    Corruption::DefocusBlur,
    Corruption::GlassBlur,
    Corruption::MotionBlur,
    Corruption::ZoomBlur,
    Corruption::Snow,
    Corruption::Frost,
    Corruption::Fog,
    Corruption::Brightness,
    Corruption::Contrast,
    Corruption::ElasticTransform,
    Corruption::Pixelate,
    Corruption::JpegCompression,
];

const VALIDATION: [Corruption; 4] = [
    Corruption::SpeckleNoise,
    Corruption::GaussianBlur,
    Corruption::Spatter,
    Corruption::Saturate,
];

impl Subset {
    /// Every subset.
    pub const ALL: [Subset; 3] = [Subset::Common, Subset::Validation, Subset::All];

    /// Returns the subset name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Subset::Common => "common",
            Subset::Validation => "validation",
            Subset::All => "all",
        }
    }

    /// The subset's members, in order.
    pub fn corruptions(&self) -> Vec<Corruption> {
        match self {
            Subset::Common => COMMON.to_vec(),
            Subset::Validation => VALIDATION.to_vec(),
            Subset::All => COMMON.iter().chain(VALIDATION.iter()).copied().collect(),
        }
    }
}

impl FromStr for Subset {
    type Err = CorruptError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "common" => Ok(Subset::Common),
            "validation" => Ok(Subset::Validation),
            "all" => Ok(Subset::All),
            other => Err(CorruptError::UnknownSubset(other.to_string())),
        }
    }
}

impl std::fmt::Display for Subset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve a subset name to its ordered members.
pub fn resolve(subset: &str) -> Result<Vec<Corruption>> {
    Ok(subset.parse::<Subset>()?.corruptions())
}

/// Parallel lists of names and canonical functions for a subset.
///
/// `names[i]` is the catalog name of `funcs[i]`.
pub fn get_corruption_names(subset: &str) -> Result<(Vec<&'static str>, Vec<CorruptionFn>)> {
    let members = resolve(subset)?;
    Ok(members.iter().map(|c| (c.name(), c.func())).unzip())
}
