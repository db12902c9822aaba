//! Scoring strategy implementations.
//!
//! Only one strategy is active per deployment; [`build_strategy`] picks it
//! from the configuration.

pub mod hybrid;
pub mod tag_weights;

// Re-export for convenience
pub use hybrid::HybridScorer;
pub use tag_weights::TagWeightScorer;

use crate::config::{ScorerConfig, StrategyKind};
use crate::traits::ScoringStrategy;
use catalog::AttributeSchema;
use std::sync::Arc;
use tracing::info;

/// Instantiate the strategy selected by `config.strategy`
pub fn build_strategy(schema: &AttributeSchema, config: &ScorerConfig) -> Arc<dyn ScoringStrategy> {
    let strategy: Arc<dyn ScoringStrategy> = match config.strategy {
        StrategyKind::Hybrid => Arc::new(HybridScorer::new(schema.clone(), config)),
        StrategyKind::TagWeights => Arc::new(TagWeightScorer::new(config)),
    };
    info!(
        "Using {} (rating scale {}..{})",
        strategy.name(),
        strategy.rating_scale().min,
        strategy.rating_scale().max
    );
    strategy
}
