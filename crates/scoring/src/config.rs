//! Scorer configuration.
//!
//! Every field has a default, so a config file only needs to name what it
//! overrides:
//!
//! ```json
//! { "strategy": "tag_weights", "tag_learning_rate": 0.5 }
//! ```

use crate::error::{Result, ScoringError};
use catalog::{FeedbackLog, RatingScale};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Coefficients of the content, latent and model signals.
///
/// They are expected to sum to 1; when they don't, scorers renormalize
/// them instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendWeights {
    pub content: f32,
    pub latent: f32,
    pub model: f32,
}

impl BlendWeights {
    pub fn sum(&self) -> f32 {
        self.content + self.latent + self.model
    }

    /// Scale the weights to sum to 1. Left as-is when the sum is not positive.
    pub fn normalized(&self) -> Self {
        let sum = self.sum();
        if sum <= 0.0 || (sum - 1.0).abs() < 1e-6 {
            return *self;
        }
        Self {
            content: self.content / sum,
            latent: self.latent / sum,
            model: self.model / sum,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("content", self.content),
            ("latent", self.latent),
            ("model", self.model),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ScoringError::InvalidConfig(format!(
                    "blend weight {} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.sum() <= 0.0 {
            return Err(ScoringError::InvalidConfig(
                "blend weights must not all be zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            content: 0.45,
            latent: 0.25,
            model: 0.30,
        }
    }
}

/// What the blend does when no trained model is available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFallback {
    /// Use the content score in place of the model score
    #[default]
    FoldIntoContent,
    /// Drop the model term and rescale content + latent to sum to 1
    Renormalize,
}

/// Which scoring strategy the recommender runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Content + latent factors (+ model), gradient updates of user factors
    #[default]
    Hybrid,
    /// Tag weights nudged by rating deltas around the scale midpoint
    TagWeights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    pub strategy: StrategyKind,
    pub weights: BlendWeights,
    pub model_fallback: ModelFallback,
    /// Step size of the latent factor update
    pub learning_rate: f32,
    /// Step size of the tag weight update
    pub tag_learning_rate: f32,
    /// Mean tag weight that maps to a full score in the tag strategy
    pub tag_saturation: f32,
    /// Overrides the strategy's default rating scale
    pub rating_scale: Option<RatingScale>,
    pub feedback_capacity: usize,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Hybrid,
            weights: BlendWeights::default(),
            model_fallback: ModelFallback::FoldIntoContent,
            learning_rate: 0.08,
            tag_learning_rate: 0.6,
            tag_saturation: 3.0,
            rating_scale: None,
            feedback_capacity: FeedbackLog::DEFAULT_CAPACITY,
        }
    }
}

impl ScorerConfig {
    /// Defaults with the tag-weight strategy selected
    pub fn tag_weights() -> Self {
        Self {
            strategy: StrategyKind::TagWeights,
            ..Self::default()
        }
    }

    /// The configured scale, or the strategy's natural one
    pub fn rating_scale(&self) -> RatingScale {
        self.rating_scale.unwrap_or(match self.strategy {
            StrategyKind::Hybrid => RatingScale::unit(),
            StrategyKind::TagWeights => RatingScale::stars(),
        })
    }

    /// Read and validate a JSON config file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ScoringError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;

        for (name, value) in [
            ("learning_rate", self.learning_rate),
            ("tag_learning_rate", self.tag_learning_rate),
            ("tag_saturation", self.tag_saturation),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ScoringError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        let scale = self.rating_scale();
        if !scale.min.is_finite() || !scale.max.is_finite() || scale.min >= scale.max {
            return Err(ScoringError::InvalidConfig(format!(
                "rating scale [{}, {}] is empty",
                scale.min, scale.max
            )));
        }

        if self.feedback_capacity == 0 {
            return Err(ScoringError::InvalidConfig(
                "feedback_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
