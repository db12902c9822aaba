//! Error types for the scoring crate.
//!
//! Scoring is pure arithmetic, so the failure modes are few: vectors of the
//! wrong length, a bad configuration, or an unusable training set. Each has
//! its own variant so a dimension problem is never confused with a score.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoringError {
    /// Two vectors that must have equal length don't
    #[error("Dimension mismatch in {context}: expected {expected}, found {found}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    /// A configuration value is out of its allowed range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for `ScorerConfig`
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Model training was asked to fit zero samples
    #[error("Cannot train a model without samples")]
    EmptyTrainingSet,
}

pub type Result<T> = std::result::Result<T, ScoringError>;

/// Precondition helper: fail unless `found == expected`
pub(crate) fn ensure_dim(context: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(ScoringError::DimensionMismatch {
            context,
            expected,
            found,
        });
    }
    Ok(())
}
