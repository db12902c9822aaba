//! Content-based signal: how well an item's attributes match the profile.

use crate::error::{ensure_dim, Result};
use catalog::{AttributeSchema, Item, RatingScale, UserProfile};
use std::collections::BTreeMap;

/// Weighted dot product of profile affinities and item attributes.
///
/// `attributes[i]` is weighted by the affinity for `schema.names()[i]`;
/// attributes the profile has no affinity for contribute nothing. The
/// result is not normalized.
pub fn content_score(
    schema: &AttributeSchema,
    affinities: &BTreeMap<String, f32>,
    attributes: &[f32],
) -> Result<f32> {
    ensure_dim("item attributes", schema.len(), attributes.len())?;

    Ok(schema
        .names()
        .iter()
        .zip(attributes)
        .map(|(name, value)| affinities.get(name).copied().unwrap_or(0.0) * value)
        .sum())
}

/// Per-attribute terms of [`content_score`], largest first
pub fn attribute_contributions<'a>(
    schema: &'a AttributeSchema,
    affinities: &BTreeMap<String, f32>,
    attributes: &[f32],
) -> Result<Vec<(&'a str, f32)>> {
    ensure_dim("item attributes", schema.len(), attributes.len())?;

    let mut terms: Vec<(&str, f32)> = schema
        .names()
        .iter()
        .zip(attributes)
        .map(|(name, value)| {
            (
                name.as_str(),
                affinities.get(name).copied().unwrap_or(0.0) * value,
            )
        })
        .collect();
    terms.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    Ok(terms)
}

/// Move the weight of every tag on `item` by the rating's distance from the
/// scale midpoint.
///
/// `weight[tag] += (clamp(rating) - midpoint) * tag_learning_rate`, rounded
/// to one decimal. Returns the delta that was applied before scaling.
pub fn update_affinities_from_rating(
    profile: &mut UserProfile,
    item: &Item,
    rating: f32,
    scale: RatingScale,
    tag_learning_rate: f32,
) -> f32 {
    let delta = scale.clamp(rating) - scale.midpoint();

    for tag in &item.tags {
        let weight = profile.affinities.entry(tag.clone()).or_insert(0.0);
        *weight = round_to_tenth(*weight + delta * tag_learning_rate);
    }
    delta
}

fn round_to_tenth(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}
