//! Hybrid scoring and online learning for item recommendations.
//!
//! This crate provides:
//! - The content, latent-factor and blend formulas
//! - The online updates (gradient step on user factors, tag weight nudges)
//! - The `ScoringStrategy` trait with the hybrid and tag-weight strategies
//! - A small trainable profile model used as an optional third signal
//! - Ranking of a catalog for one profile
//!
//! ## Architecture
//! Everything here is a pure function of its inputs. Profiles and items
//! are passed in by the caller; persisting an updated profile is the
//! caller's job.
//!
//! ## Example Usage
//! ```ignore
//! use scoring::{build_strategy, rank, ScorerConfig};
//!
//! let config = ScorerConfig::default();
//! let strategy = build_strategy(catalog.schema(), &config);
//!
//! let ranked = rank(strategy.as_ref(), &profile, catalog.items(), None)?;
//! strategy.learn(&mut profile, catalog.require_item("m1")?, 0.95)?;
//! ```

pub mod error;
pub mod config;
pub mod content;
pub mod latent;
pub mod blend;
pub mod model;
pub mod traits;
pub mod strategies;
pub mod ranker;

// Re-export main types
pub use error::{Result, ScoringError};
pub use config::{BlendWeights, ModelFallback, ScorerConfig, StrategyKind};
pub use content::{content_score, update_affinities_from_rating};
pub use latent::{apply_feedback, latent_score};
pub use blend::blend;
pub use model::{ModelScorer, ProfileModel, TrainingOptions, TrainingReport};
pub use traits::{ScoreBreakdown, ScoringStrategy};
pub use strategies::{build_strategy, HybridScorer, TagWeightScorer};
pub use ranker::{rank, RankedItem};
