//! Ranking a catalog for one profile.

use crate::error::Result;
use crate::model::ModelScorer;
use crate::traits::{ScoreBreakdown, ScoringStrategy};
use catalog::{Item, ItemId, UserProfile};
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedItem {
    pub item_id: ItemId,
    pub breakdown: ScoreBreakdown,
    pub reasons: Vec<String>,
}

impl RankedItem {
    /// The blended score used for ordering
    pub fn score(&self) -> f32 {
        self.breakdown.blended
    }
}

/// Score every item and order them by descending blended score.
///
/// Items are scored in parallel but results keep input order before a
/// stable sort, so equal scores stay in catalog order and identical inputs
/// always produce identical output.
pub fn rank(
    strategy: &dyn ScoringStrategy,
    profile: &UserProfile,
    items: &[Item],
    model: Option<&dyn ModelScorer>,
) -> Result<Vec<RankedItem>> {
    let mut ranked = items
        .par_iter()
        .map(|item| -> Result<RankedItem> {
            let breakdown = strategy.score(profile, item, model)?;
            Ok(RankedItem {
                item_id: item.id.clone(),
                reasons: strategy.explain(profile, item, &breakdown),
                breakdown,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    ranked.sort_by(|a, b| b.score().partial_cmp(&a.score()).unwrap_or(Ordering::Equal));
    Ok(ranked)
}
