//! Service layer of the hybrid recommender.
//!
//! This crate contains the `RecommendationService` that ties the catalog,
//! profile persistence and the scoring strategy together, plus the store
//! abstractions it is built on.

pub mod error;
pub mod store;
pub mod service;

pub use error::{Result, ServiceError};
pub use service::{HealthStatus, Recommendation, RecommendationService, DEFAULT_FEEDBACK_REASON};
pub use store::{
    CatalogProvider, InMemoryProfileStore, JsonFileProfileStore, ProfileStore,
    StaticCatalogProvider,
};
