//! Latent-factor hybrid: content + latent (+ model), online factor updates.

use crate::blend::blend;
use crate::config::{BlendWeights, ModelFallback, ScorerConfig};
use crate::content::{attribute_contributions, content_score};
use crate::error::Result;
use crate::latent::{apply_feedback, latent_score};
use crate::model::ModelScorer;
use crate::traits::{ScoreBreakdown, ScoringStrategy};
use catalog::{AttributeSchema, Item, RatingScale, UserProfile};
use tracing::{debug, warn};

/// Latent score above which an item counts as a taste-neighbour match
const LATENT_REASON_THRESHOLD: f32 = 0.5;

/// Blends the content-based and latent-factor signals (plus an optional
/// model score) and learns by nudging the user's latent factors.
#[derive(Debug, Clone)]
pub struct HybridScorer {
    schema: AttributeSchema,
    weights: BlendWeights,
    fallback: ModelFallback,
    learning_rate: f32,
    scale: RatingScale,
}

impl HybridScorer {
    pub fn new(schema: AttributeSchema, config: &ScorerConfig) -> Self {
        let sum = config.weights.sum();
        if (sum - 1.0).abs() > 1e-6 {
            warn!("Blend weights sum to {:.3}; renormalizing to 1", sum);
        }

        Self {
            schema,
            weights: config.weights.normalized(),
            fallback: config.model_fallback,
            learning_rate: config.learning_rate,
            scale: config.rating_scale(),
        }
    }

    pub fn content_score(&self, profile: &UserProfile, item: &Item) -> Result<f32> {
        content_score(&self.schema, &profile.affinities, &item.attributes)
    }

    pub fn latent_score(&self, profile: &UserProfile, item: &Item) -> Result<f32> {
        latent_score(&profile.factors, &item.factors)
    }
}

impl ScoringStrategy for HybridScorer {
    fn name(&self) -> &str {
        "HybridScorer"
    }

    fn rating_scale(&self) -> RatingScale {
        self.scale
    }

    fn score(
        &self,
        profile: &UserProfile,
        item: &Item,
        model: Option<&dyn ModelScorer>,
    ) -> Result<ScoreBreakdown> {
        let content = self.content_score(profile, item)?;
        let latent = self.latent_score(profile, item)?;
        let model = model.map(|m| m.predict(&item.attributes)).transpose()?;

        Ok(ScoreBreakdown {
            content,
            latent,
            model,
            blended: blend(content, latent, model, &self.weights, self.fallback),
        })
    }

    fn learn(&self, profile: &mut UserProfile, item: &Item, rating: f32) -> Result<()> {
        let rating = self.scale.clamp(rating);
        let updated = apply_feedback(&profile.factors, &item.factors, rating, self.learning_rate)?;

        debug!(
            "Updated factors of {} after rating {} = {:.2}: {:?} -> {:?}",
            profile.user_id, item.id, rating, profile.factors, updated
        );
        profile.factors = updated;
        Ok(())
    }

    fn explain(&self, profile: &UserProfile, item: &Item, breakdown: &ScoreBreakdown) -> Vec<String> {
        let mut reasons: Vec<String> =
            attribute_contributions(&self.schema, &profile.affinities, &item.attributes)
                .map(|terms| {
                    terms
                        .into_iter()
                        .filter(|(_, contribution)| *contribution > 0.0)
                        .take(2)
                        .map(|(name, contribution)| format!("Matches your {} taste ({:.2})", name, contribution))
                        .collect()
                })
                .unwrap_or_default();

        if breakdown.latent > LATENT_REASON_THRESHOLD {
            reasons.push(format!("Close to titles you rated well ({:.2})", breakdown.latent));
        }
        if let Some(model) = breakdown.model {
            reasons.push(format!("Profile model score {:.2}", model));
        }
        reasons
    }
}
