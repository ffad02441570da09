//! Validated corruption severity.

use serde::{Deserialize, Serialize};

use crate::error::{CorruptError, Result};

/// Corruption intensity, 1 (mild) to 5 (severe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Severity(u8);

impl Severity {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Validate a severity. Out-of-range values are rejected, never clamped.
    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(CorruptError::InvalidSeverity(value as i64))
        }
    }

    /// The raw severity value.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based index into per-severity parameter tables.
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// All valid severities in ascending order.
    pub fn all() -> impl Iterator<Item = Severity> {
        (Self::MIN..=Self::MAX).map(Severity)
    }

    /// Pick this severity's entry from a five-entry parameter table.
    pub fn pick<T: Copy>(self, table: &[T; 5]) -> T {
        table[self.index()]
    }
}

impl TryFrom<u8> for Severity {
    type Error = CorruptError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<i64> for Severity {
    type Error = CorruptError;

    fn try_from(value: i64) -> Result<Self> {
        u8::try_from(value)
            .map_err(|_| CorruptError::InvalidSeverity(value))
            .and_then(Self::new)
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> u8 {
        severity.0
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
