//! Latent-factor signal and the online update of user factors.

use crate::error::{ensure_dim, Result};

/// Dot product of a user and an item factor vector.
///
/// Both vectors must have the same length K; anything else is an error,
/// never a silently truncated sum.
pub fn latent_score(user_factors: &[f32], item_factors: &[f32]) -> Result<f32> {
    ensure_dim("latent factors", user_factors.len(), item_factors.len())?;

    Ok(user_factors
        .iter()
        .zip(item_factors)
        .map(|(u, v)| u * v)
        .sum())
}

/// One gradient step on the squared error of `dot(user, item)` against `rating`.
///
/// ```text
/// error  = rating - dot(user, item)
/// user'k = user_k + learning_rate * error * item_k
/// ```
///
/// Only the user row moves; item factors are read-only. There is no
/// regularization or clipping, so a large error can move factors far.
pub fn apply_feedback(
    user_factors: &[f32],
    item_factors: &[f32],
    rating: f32,
    learning_rate: f32,
) -> Result<Vec<f32>> {
    let prediction = latent_score(user_factors, item_factors)?;
    let error = rating - prediction;

    Ok(user_factors
        .iter()
        .zip(item_factors)
        .map(|(u, v)| u + learning_rate * error * v)
        .collect())
}
