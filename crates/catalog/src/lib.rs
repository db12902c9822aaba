//! # Catalog Crate
//!
//! Domain types and the read-only item catalog for the hybrid recommender.
//!
//! ## Main Components
//!
//! - **types**: Items, profiles, feedback log, rating scale, `Catalog`
//! - **parser**: Parse attributes.dat / items.dat into Rust structs
//! - **index**: Build and validate a `Catalog`
//! - **seed**: Built-in demo catalog and profile defaults
//! - **error**: Error types for catalog loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::Catalog;
//! use std::path::Path;
//!
//! let catalog = Catalog::load_from_files(Path::new("data"))?;
//! let item = catalog.require_item("m1")?;
//! println!("{} has {} tags", item.title, item.tags.len());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;
pub mod seed;

// Re-export commonly used types for convenience
pub use error::{CatalogError, Result};
pub use types::{
    // Type aliases
    ItemId,
    UserId,
    // Core types
    AttributeSchema,
    Catalog,
    FeedbackEvent,
    FeedbackLog,
    Item,
    RatingScale,
    UserProfile,
};
