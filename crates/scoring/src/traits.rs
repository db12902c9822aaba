//! Core trait for pluggable scoring strategies.
//!
//! The latent-factor hybrid and the tag-weight scorer read and write the
//! same profile shape but are mutually exclusive designs, so each lives
//! behind this trait and the configuration picks one.

use crate::error::Result;
use crate::model::ModelScorer;
use catalog::{Item, RatingScale, UserProfile};
use serde::Serialize;

/// The signals behind one item's final score
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScoreBreakdown {
    pub content: f32,
    pub latent: f32,
    /// `None` when no model took part
    pub model: Option<f32>,
    /// Final score in [0, 1]
    pub blended: f32,
}

pub trait ScoringStrategy: Send + Sync {
    /// Returns the name of this strategy (for logging/debugging)
    fn name(&self) -> &str;

    /// Range ratings are clamped into before learning
    fn rating_scale(&self) -> RatingScale;

    /// Score one item for one profile.
    ///
    /// # Arguments
    /// * `profile` - The user's affinities and latent factors
    /// * `item` - The candidate item
    /// * `model` - Trained model for this user, if any
    fn score(
        &self,
        profile: &UserProfile,
        item: &Item,
        model: Option<&dyn ModelScorer>,
    ) -> Result<ScoreBreakdown>;

    /// Update `profile` from an explicit rating of `item`.
    ///
    /// The rating is clamped to [`rating_scale`](Self::rating_scale) first.
    /// On error the profile is left untouched.
    fn learn(&self, profile: &mut UserProfile, item: &Item, rating: f32) -> Result<()>;

    /// Short human-readable reasons for a score
    fn explain(&self, _profile: &UserProfile, _item: &Item, _breakdown: &ScoreBreakdown) -> Vec<String> {
        Vec::new()
    }
}
