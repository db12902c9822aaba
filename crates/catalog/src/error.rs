//! Error types for the catalog crate.
//!
//! Every failure that can happen while loading, validating or querying the
//! item catalog is represented here, so callers can match on the exact
//! cause instead of parsing messages.

use thiserror::Error;

/// Errors that can occur while loading or querying the catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// A vector does not have the length the catalog was built with
    #[error("Dimension mismatch for {entity}: expected {expected}, found {found}")]
    DimensionMismatch {
        entity: String,
        expected: usize,
        found: usize,
    },

    /// The same item id appeared twice
    #[error("Duplicate item id: {0}")]
    DuplicateItem(String),

    /// Referenced item doesn't exist
    #[error("Item not found: {0}")]
    ItemNotFound(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
