//! Error types for corruption dispatch and argument validation.

use thiserror::Error;

/// Errors from the corruption catalog, the subset resolver and augmenters.
///
/// Every variant except [`CorruptError::Codec`] is an argument error: it is
/// raised at the offending call and never retried.
#[derive(Debug, Error)]
pub enum CorruptError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Severity must be in 1..=5, got {0}")]
    InvalidSeverity(i64),

    #[error("Unknown corruption '{0}'")]
    UnknownCorruption(String),

    #[error("Unknown subset '{0}', expected 'common', 'validation' or 'all'")]
    UnknownSubset(String),

    #[error("Codec error: {0}")]
    Codec(#[from] image::ImageError),
}

impl CorruptError {
    /// Stable error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            CorruptError::InvalidArgument(_) => "CORRUPT_001",
            CorruptError::InvalidSeverity(_) => "CORRUPT_002",
            CorruptError::UnknownCorruption(_) => "CORRUPT_003",
            CorruptError::UnknownSubset(_) => "CORRUPT_004",
            CorruptError::Codec(_) => "CORRUPT_005",
        }
    }

    /// Error category for reporting.
    pub fn category(&self) -> &'static str {
        match self {
            CorruptError::Codec(_) => "codec",
            _ => "argument",
        }
    }

    /// Whether this error is an argument error (bad severity, name, seed or image).
    pub fn is_invalid_argument(&self) -> bool {
        !matches!(self, CorruptError::Codec(_))
    }
}

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, CorruptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            CorruptError::InvalidArgument("x".into()),
            CorruptError::InvalidSeverity(9),
            CorruptError::UnknownCorruption("x".into()),
            CorruptError::UnknownSubset("x".into()),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(errors.iter().all(|e| e.is_invalid_argument()));
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            CorruptError::InvalidSeverity(0).to_string(),
            "Severity must be in 1..=5, got 0"
        );
        assert_eq!(
            CorruptError::UnknownSubset("extra".into()).to_string(),
            "Unknown subset 'extra', expected 'common', 'validation' or 'all'"
        );
    }
}
