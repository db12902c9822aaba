//! Tag-weight scorer: ratings shift per-tag weights around the scale midpoint.

use crate::blend::saturate;
use crate::config::ScorerConfig;
use crate::content::update_affinities_from_rating;
use crate::error::Result;
use crate::model::ModelScorer;
use crate::traits::{ScoreBreakdown, ScoringStrategy};
use catalog::{Item, RatingScale, UserProfile};
use tracing::debug;

/// Scores an item by the mean weight of its tags.
///
/// The mean is divided by `saturation` and clamped to [0, 1], so a tag
/// set whose average weight reaches `saturation` scores 1. Latent factors
/// and trained models are ignored.
#[derive(Debug, Clone)]
pub struct TagWeightScorer {
    scale: RatingScale,
    tag_learning_rate: f32,
    saturation: f32,
}

impl TagWeightScorer {
    pub fn new(config: &ScorerConfig) -> Self {
        Self {
            scale: config.rating_scale(),
            tag_learning_rate: config.tag_learning_rate,
            saturation: config.tag_saturation,
        }
    }

    /// Sum of the profile's weights for the item's tags
    pub fn tag_weight_sum(&self, profile: &UserProfile, item: &Item) -> f32 {
        item.tags.iter().map(|tag| profile.affinity(tag)).sum()
    }
}

impl ScoringStrategy for TagWeightScorer {
    fn name(&self) -> &str {
        "TagWeightScorer"
    }

    fn rating_scale(&self) -> RatingScale {
        self.scale
    }

    fn score(
        &self,
        profile: &UserProfile,
        item: &Item,
        _model: Option<&dyn ModelScorer>,
    ) -> Result<ScoreBreakdown> {
        let sum = self.tag_weight_sum(profile, item);
        let blended = if item.tags.is_empty() {
            0.0
        } else {
            saturate(sum / item.tags.len() as f32 / self.saturation)
        };

        Ok(ScoreBreakdown {
            content: sum,
            latent: 0.0,
            model: None,
            blended,
        })
    }

    fn learn(&self, profile: &mut UserProfile, item: &Item, rating: f32) -> Result<()> {
        let delta = update_affinities_from_rating(
            profile,
            item,
            rating,
            self.scale,
            self.tag_learning_rate,
        );
        debug!(
            "Shifted {} tag weights of {} by {:+.2}",
            item.tags.len(),
            profile.user_id,
            delta * self.tag_learning_rate
        );
        Ok(())
    }

    fn explain(&self, profile: &UserProfile, item: &Item, _breakdown: &ScoreBreakdown) -> Vec<String> {
        let mut tags: Vec<(&str, f32)> = item
            .tags
            .iter()
            .map(|tag| (tag.as_str(), profile.affinity(tag)))
            .filter(|(_, weight)| *weight > 0.0)
            .collect();
        tags.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        tags.into_iter()
            .take(2)
            .map(|(tag, weight)| format!("You like '{}' ({:.1})", tag, weight))
            .collect()
    }
}
