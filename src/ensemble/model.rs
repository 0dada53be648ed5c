//! Probabilistic classifier contract and the shipped logistic model
//!
//! The ensemble only depends on the [`ProbabilisticClassifier`] contract, so
//! any probability-producing model can be plugged in per domain. The crate
//! ships one concrete implementation: a standardized logistic regression
//! trained by deterministic full-batch gradient descent.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Uniform scoring contract for domain experts and the meta-classifier
pub trait ProbabilisticClassifier {
    /// Probability of the positive class for one feature row, in [0, 1]
    fn score(&self, features: &[f64]) -> Result<f64, EngineError>;
}

/// Gradient-descent hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitConfig {
    pub learning_rate: f64,
    pub iterations: usize,
    /// L2 penalty applied to weights (not the bias)
    pub l2: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            iterations: 500,
            l2: 0.01,
        }
    }
}

/// Logistic regression over standardized inputs.
///
/// Standardization parameters are learned at fit time and baked into the
/// model so scoring needs no external scaler state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    weights: Vec<f64>,
    bias: f64,
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl LogisticModel {
    /// Fit on `rows` (one feature row per sample) against binary labels.
    ///
    /// Training is deterministic: zero-initialized weights, full-batch
    /// updates, a fixed iteration count, and no randomness anywhere.
    pub fn fit(rows: &[Vec<f64>], labels: &[bool], config: &FitConfig) -> Result<Self, EngineError> {
        if rows.is_empty() {
            return Err(EngineError::InsufficientTraining(
                "no training rows".to_string(),
            ));
        }
        if rows.len() != labels.len() {
            return Err(EngineError::InsufficientTraining(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        let dims = rows[0].len();
        if dims == 0 {
            return Err(EngineError::InsufficientTraining(
                "zero-dimensional rows".to_string(),
            ));
        }
        if let Some(bad) = rows.iter().find(|r| r.len() != dims) {
            return Err(EngineError::DimensionMismatch {
                expected: dims,
                actual: bad.len(),
            });
        }

        let (means, scales) = standardization_params(rows, dims);
        let standardized: Vec<Vec<f64>> = rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(means.iter().zip(scales.iter()))
                    .map(|(v, (m, s))| (v - m) / s)
                    .collect()
            })
            .collect();

        let n = standardized.len() as f64;
        let mut weights = vec![0.0; dims];
        let mut bias = 0.0;

        for _ in 0..config.iterations {
            let mut weight_grads = vec![0.0; dims];
            let mut bias_grad = 0.0;

            for (row, &label) in standardized.iter().zip(labels.iter()) {
                let z = bias + dot(&weights, row);
                let error = sigmoid(z) - if label { 1.0 } else { 0.0 };
                for (grad, value) in weight_grads.iter_mut().zip(row.iter()) {
                    *grad += error * value;
                }
                bias_grad += error;
            }

            for (weight, grad) in weights.iter_mut().zip(weight_grads.iter()) {
                *weight -= config.learning_rate * (grad / n + config.l2 * *weight);
            }
            bias -= config.learning_rate * bias_grad / n;
        }

        Ok(Self {
            weights,
            bias,
            means,
            scales,
        })
    }

    /// Number of input dimensions this model was fit on
    pub fn dims(&self) -> usize {
        self.weights.len()
    }
}

impl ProbabilisticClassifier for LogisticModel {
    fn score(&self, features: &[f64]) -> Result<f64, EngineError> {
        if features.len() != self.weights.len() {
            return Err(EngineError::DimensionMismatch {
                expected: self.weights.len(),
                actual: features.len(),
            });
        }
        let z = self.bias
            + features
                .iter()
                .zip(self.means.iter().zip(self.scales.iter()))
                .zip(self.weights.iter())
                .map(|((v, (m, s)), w)| w * (v - m) / s)
                .sum::<f64>();
        Ok(sigmoid(z))
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Per-column mean and population stdev; constant columns get scale 1.0 so
/// standardization never divides by zero
fn standardization_params(rows: &[Vec<f64>], dims: usize) -> (Vec<f64>, Vec<f64>) {
    let n = rows.len() as f64;
    let mut means = vec![0.0; dims];
    for row in rows {
        for (mean, value) in means.iter_mut().zip(row.iter()) {
            *mean += value;
        }
    }
    for mean in &mut means {
        *mean /= n;
    }

    let mut scales = vec![0.0; dims];
    for row in rows {
        for ((scale, value), mean) in scales.iter_mut().zip(row.iter()).zip(means.iter()) {
            *scale += (value - mean).powi(2);
        }
    }
    for scale in &mut scales {
        *scale = (*scale / n).sqrt();
        if *scale == 0.0 {
            *scale = 1.0;
        }
    }

    (means, scales)
}
