//! Optional learned-model signal.
//!
//! A [`ProfileModel`] is a tiny feed-forward regressor (D -> 6 ReLU -> 1
//! sigmoid) fit to synthetic labels derived from one user's affinities.
//! It smooths the content signal; when no model has been trained the
//! blend falls back as configured in [`ModelFallback`](crate::ModelFallback).

use crate::blend::saturate;
use crate::content::content_score;
use crate::error::{ensure_dim, Result, ScoringError};
use catalog::{AttributeSchema, Item, UserProfile};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

/// Anything that can turn an item's attribute vector into a score in [0, 1]
pub trait ModelScorer: Send + Sync {
    fn predict(&self, attributes: &[f32]) -> Result<f32>;
}

pub const HIDDEN_UNITS: usize = 6;

const BETA1: f32 = 0.9;
const BETA2: f32 = 0.999;
const EPSILON: f32 = 1e-7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingOptions {
    pub epochs: usize,
    pub batch_size: usize,
    /// Adam step size
    pub learning_rate: f32,
    /// Seed for weight initialization
    pub seed: u64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            epochs: 40,
            batch_size: 5,
            learning_rate: 0.08,
            seed: 42,
        }
    }
}

/// Outcome of a training run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrainingReport {
    /// Mean squared error over the final epoch
    pub loss: f32,
    pub samples: usize,
    pub epochs: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileModel {
    input_dim: usize,
    /// Hidden layer weights, row `j` holds the inputs of unit `j`
    w1: Vec<f32>,
    b1: Vec<f32>,
    w2: Vec<f32>,
    b2: f32,
}

/// Activations kept from the forward pass for backpropagation
struct Forward {
    pre_activation: Vec<f32>,
    hidden: Vec<f32>,
    output: f32,
}

impl ProfileModel {
    /// Untrained model with Glorot-uniform weights from a fixed seed
    pub fn new(input_dim: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let limit1 = (6.0 / (input_dim + HIDDEN_UNITS) as f32).sqrt();
        let w1 = (0..input_dim * HIDDEN_UNITS)
            .map(|_| rng.random_range(-limit1..limit1))
            .collect();

        let limit2 = (6.0 / (HIDDEN_UNITS + 1) as f32).sqrt();
        let w2 = (0..HIDDEN_UNITS)
            .map(|_| rng.random_range(-limit2..limit2))
            .collect();

        Self {
            input_dim,
            w1,
            b1: vec![0.0; HIDDEN_UNITS],
            w2,
            b2: 0.0,
        }
    }

    /// Fit a fresh model to one profile's synthetic labels over `items`
    pub fn train_for_profile(
        schema: &AttributeSchema,
        profile: &UserProfile,
        items: &[Item],
        options: &TrainingOptions,
    ) -> Result<(Self, TrainingReport)> {
        let (xs, ys) = synthetic_labels(schema, profile, items)?;
        let mut model = Self::new(schema.len(), options.seed);
        let report = model.fit(&xs, &ys, options)?;
        Ok((model, report))
    }

    /// Mini-batch Adam on mean squared error. Samples are visited in order.
    pub fn fit(
        &mut self,
        xs: &[Vec<f32>],
        ys: &[f32],
        options: &TrainingOptions,
    ) -> Result<TrainingReport> {
        if self.input_dim == 0 {
            return Err(ScoringError::InvalidConfig(
                "profile model needs at least one input attribute".to_string(),
            ));
        }
        if xs.is_empty() {
            return Err(ScoringError::EmptyTrainingSet);
        }
        ensure_dim("training labels", xs.len(), ys.len())?;
        for x in xs {
            ensure_dim("training sample", self.input_dim, x.len())?;
        }
        if options.batch_size == 0 || options.epochs == 0 {
            return Err(ScoringError::InvalidConfig(
                "epochs and batch_size must be at least 1".to_string(),
            ));
        }

        let param_count = self.param_count();
        let mut first_moment = vec![0.0_f32; param_count];
        let mut second_moment = vec![0.0_f32; param_count];
        let mut step = 0_i32;
        let mut epoch_loss = 0.0;

        for epoch in 0..options.epochs {
            let mut loss_sum = 0.0;

            for (batch_x, batch_y) in xs.chunks(options.batch_size).zip(ys.chunks(options.batch_size)) {
                let mut grads = vec![0.0_f32; param_count];
                let scale = 2.0 / batch_x.len() as f32;

                for (x, &y) in batch_x.iter().zip(batch_y) {
                    let forward = self.forward(x);
                    let diff = forward.output - y;
                    loss_sum += diff * diff;
                    self.accumulate_gradients(x, &forward, diff * scale, &mut grads);
                }

                step += 1;
                let lr = options.learning_rate;
                let correction1 = 1.0 - BETA1.powi(step);
                let correction2 = 1.0 - BETA2.powi(step);

                for (((param, grad), m), v) in self
                    .params_mut()
                    .zip(&grads)
                    .zip(first_moment.iter_mut())
                    .zip(second_moment.iter_mut())
                {
                    *m = BETA1 * *m + (1.0 - BETA1) * grad;
                    *v = BETA2 * *v + (1.0 - BETA2) * grad * grad;
                    let m_hat = *m / correction1;
                    let v_hat = *v / correction2;
                    *param -= lr * m_hat / (v_hat.sqrt() + EPSILON);
                }
            }

            epoch_loss = loss_sum / xs.len() as f32;
            debug!("epoch {} loss {:.5}", epoch + 1, epoch_loss);
        }

        Ok(TrainingReport {
            loss: epoch_loss,
            samples: xs.len(),
            epochs: options.epochs,
        })
    }

    /// Mean squared error of the current weights on a sample set
    pub fn mean_squared_error(&self, xs: &[Vec<f32>], ys: &[f32]) -> Result<f32> {
        if xs.is_empty() {
            return Err(ScoringError::EmptyTrainingSet);
        }
        ensure_dim("training labels", xs.len(), ys.len())?;

        let mut total = 0.0;
        for (x, y) in xs.iter().zip(ys) {
            let diff = self.predict(x)? - y;
            total += diff * diff;
        }
        Ok(total / xs.len() as f32)
    }

    fn forward(&self, x: &[f32]) -> Forward {
        let pre_activation: Vec<f32> = self
            .w1
            .chunks(self.input_dim.max(1))
            .zip(&self.b1)
            .map(|(row, b)| b + row.iter().zip(x).map(|(w, xi)| w * xi).sum::<f32>())
            .collect();
        let hidden: Vec<f32> = pre_activation.iter().map(|z| z.max(0.0)).collect();
        let logit = self.b2 + self.w2.iter().zip(&hidden).map(|(w, h)| w * h).sum::<f32>();

        Forward {
            pre_activation,
            hidden,
            output: sigmoid(logit),
        }
    }

    /// Add d(loss)/d(params) for one sample, given d(loss)/d(output)
    fn accumulate_gradients(&self, x: &[f32], forward: &Forward, d_output: f32, grads: &mut [f32]) {
        let d_logit = d_output * forward.output * (1.0 - forward.output);

        let w1_len = self.w1.len();
        let (g_w1, rest) = grads.split_at_mut(w1_len);
        let (g_b1, rest) = rest.split_at_mut(HIDDEN_UNITS);
        let (g_w2, g_b2) = rest.split_at_mut(HIDDEN_UNITS);

        g_b2[0] += d_logit;
        for j in 0..HIDDEN_UNITS {
            g_w2[j] += d_logit * forward.hidden[j];

            if forward.pre_activation[j] <= 0.0 {
                continue;
            }
            let d_hidden = d_logit * self.w2[j];
            g_b1[j] += d_hidden;
            for (i, xi) in x.iter().enumerate() {
                g_w1[j * self.input_dim + i] += d_hidden * xi;
            }
        }
    }

    fn param_count(&self) -> usize {
        self.w1.len() + self.b1.len() + self.w2.len() + 1
    }

    /// Parameters in gradient order: w1, b1, w2, b2
    fn params_mut(&mut self) -> impl Iterator<Item = &mut f32> {
        self.w1
            .iter_mut()
            .chain(self.b1.iter_mut())
            .chain(self.w2.iter_mut())
            .chain(std::iter::once(&mut self.b2))
    }
}

impl ModelScorer for ProfileModel {
    fn predict(&self, attributes: &[f32]) -> Result<f32> {
        ensure_dim("model input", self.input_dim, attributes.len())?;
        Ok(self.forward(attributes).output)
    }
}

/// Training pairs for one profile: each item's attributes, labelled with
/// `saturate(content_score * 0.9 + 0.05)`.
pub fn synthetic_labels(
    schema: &AttributeSchema,
    profile: &UserProfile,
    items: &[Item],
) -> Result<(Vec<Vec<f32>>, Vec<f32>)> {
    let mut xs = Vec::with_capacity(items.len());
    let mut ys = Vec::with_capacity(items.len());

    for item in items {
        let score = content_score(schema, &profile.affinities, &item.attributes)?;
        xs.push(item.attributes.clone());
        ys.push(saturate(score * 0.9 + 0.05));
    }
    Ok((xs, ys))
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::seed::{default_profile, seed_catalog};

    #[test]
    fn test_synthetic_labels() {
        let catalog = seed_catalog().unwrap();
        let profile = default_profile("u1", 5);
        let (xs, ys) = synthetic_labels(catalog.schema(), &profile, catalog.items()).unwrap();

        assert_eq!(xs.len(), 5);
        // m1: content 1.22 -> 1.148 saturates to 1
        assert_eq!(ys[0], 1.0);
        // m2: content 0.535 -> 0.5315
        assert!((ys[1] - 0.5315).abs() < 1e-5);
        assert!(ys.iter().all(|y| (0.0..=1.0).contains(y)));
    }

    #[test]
    fn test_initialization_is_deterministic() {
        let a = ProfileModel::new(4, 7);
        let b = ProfileModel::new(4, 7);
        let x = [0.8, 0.2, 0.1, 0.9];
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_training_reduces_loss() {
        let catalog = seed_catalog().unwrap();
        let profile = default_profile("u1", 5);
        let (xs, ys) = synthetic_labels(catalog.schema(), &profile, catalog.items()).unwrap();

        let options = TrainingOptions::default();
        let mut model = ProfileModel::new(catalog.schema().len(), options.seed);
        let initial = model.mean_squared_error(&xs, &ys).unwrap();

        let report = model.fit(&xs, &ys, &options).unwrap();
        let trained = model.mean_squared_error(&xs, &ys).unwrap();

        assert_eq!(report.samples, 5);
        assert_eq!(report.epochs, 40);
        assert!(trained < initial, "loss {} -> {}", initial, trained);
    }

    #[test]
    fn test_predictions_stay_in_unit_interval() {
        let catalog = seed_catalog().unwrap();
        let profile = default_profile("u1", 5);
        let (model, _) = ProfileModel::train_for_profile(
            catalog.schema(),
            &profile,
            catalog.items(),
            &TrainingOptions::default(),
        )
        .unwrap();

        for item in catalog.items() {
            let p = model.predict(&item.attributes).unwrap();
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let mut model = ProfileModel::new(4, 1);
        let options = TrainingOptions::default();

        assert!(matches!(
            model.fit(&[], &[], &options),
            Err(ScoringError::EmptyTrainingSet)
        ));
        assert!(model.fit(&[vec![0.1, 0.2]], &[0.5], &options).is_err());
        assert!(model.fit(&[vec![0.1; 4]], &[0.5, 0.4], &options).is_err());
        assert!(model.predict(&[0.1, 0.2]).is_err());
    }

    #[test]
    fn test_training_without_attributes_is_an_error() {
        let schema = AttributeSchema::new(Vec::<String>::new());
        let profile = UserProfile::new("u1", Default::default(), vec![0.5], 5);
        let items = vec![Item {
            id: "x".to_string(),
            title: "No Attributes".to_string(),
            synopsis: String::new(),
            year: None,
            tags: vec![],
            attributes: vec![],
            factors: vec![0.5],
        }];

        let result = ProfileModel::train_for_profile(&schema, &profile, &items, &TrainingOptions::default());
        assert!(matches!(result, Err(ScoringError::InvalidConfig(_))));
    }
}
