//! Combining the three signals into one ranking score.

use crate::config::{BlendWeights, ModelFallback};

/// Blend content, latent and (optional) model scores into [0, 1].
///
/// Weights are renormalized when they don't sum to 1. Without a model
/// score the `fallback` decides whether content stands in for it or the
/// model term is dropped. The final value saturates: anything below 0 or
/// above 1 is clamped, and NaN becomes 0. Out-of-range inputs are never
/// reported as errors.
pub fn blend(
    content: f32,
    latent: f32,
    model: Option<f32>,
    weights: &BlendWeights,
    fallback: ModelFallback,
) -> f32 {
    let w = weights.normalized();

    let raw = match (model, fallback) {
        (Some(model), _) => w.content * content + w.latent * latent + w.model * model,
        (None, ModelFallback::FoldIntoContent) => {
            (w.content + w.model) * content + w.latent * latent
        }
        (None, ModelFallback::Renormalize) => {
            let remaining = w.content + w.latent;
            if remaining > 0.0 {
                (w.content * content + w.latent * latent) / remaining
            } else {
                0.0
            }
        }
    };

    saturate(raw)
}

/// `max(0, min(1, raw))`, with NaN mapped to 0
pub fn saturate(raw: f32) -> f32 {
    if raw.is_nan() {
        return 0.0;
    }
    raw.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_with_model() {
        let weights = BlendWeights::default();
        let score = blend(0.5, 0.4, Some(0.8), &weights, ModelFallback::FoldIntoContent);
        // 0.45*0.5 + 0.25*0.4 + 0.3*0.8
        assert!((score - 0.565).abs() < 1e-6);
    }

    #[test]
    fn test_fold_into_content_matches_model_equal_to_content() {
        let weights = BlendWeights::default();
        let folded = blend(0.5, 0.4, None, &weights, ModelFallback::FoldIntoContent);
        let explicit = blend(0.5, 0.4, Some(0.5), &weights, ModelFallback::FoldIntoContent);
        assert!((folded - explicit).abs() < 1e-6);
    }

    #[test]
    fn test_renormalize_drops_model_term() {
        let weights = BlendWeights::default();
        let score = blend(0.5, 0.4, None, &weights, ModelFallback::Renormalize);
        // (0.45*0.5 + 0.25*0.4) / 0.7
        assert!((score - 0.325 / 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_unnormalized_weights_are_rescaled() {
        let doubled = BlendWeights {
            content: 0.9,
            latent: 0.5,
            model: 0.6,
        };
        let a = blend(0.3, 0.2, Some(0.1), &doubled, ModelFallback::FoldIntoContent);
        let b = blend(0.3, 0.2, Some(0.1), &BlendWeights::default(), ModelFallback::FoldIntoContent);
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn test_blend_saturates() {
        let weights = BlendWeights::default();
        let extremes = [
            -1e30_f32,
            -5.0,
            -0.1,
            0.0,
            0.7,
            1.28,
            42.0,
            1e30,
            f32::INFINITY,
            f32::NEG_INFINITY,
            f32::NAN,
        ];
        for &content in &extremes {
            for &latent in &extremes {
                for model in [None, Some(-3.0), Some(9.0), Some(f32::NAN)] {
                    for fallback in [ModelFallback::FoldIntoContent, ModelFallback::Renormalize] {
                        let score = blend(content, latent, model, &weights, fallback);
                        assert!(
                            (0.0..=1.0).contains(&score),
                            "blend({}, {}, {:?}) = {}",
                            content,
                            latent,
                            model,
                            score
                        );
                    }
                }
            }
        }
    }
}
