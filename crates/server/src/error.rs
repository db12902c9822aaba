//! Errors surfaced by the recommendation service.

use catalog::{CatalogError, ItemId};
use scoring::ScoringError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// Feedback referenced an item the catalog doesn't have
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The profile store failed to read or write
    #[error("Profile store error: {0}")]
    Store(String),

    /// A blocking scoring task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
