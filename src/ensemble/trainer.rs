//! Ensemble training
//!
//! Builds a fresh [`EnsembleArtifact`] from a labeled dataset: each domain
//! expert is fit on its own sub-vectors only, then the meta-classifier is fit
//! on the stacked expert probabilities. Weights are fully deterministic for a
//! given dataset; only the artifact id and timestamp are stamped at build
//! time.

use crate::ensemble::model::{FitConfig, LogisticModel, ProbabilisticClassifier};
use crate::ensemble::stacking::EnsembleArtifact;
use crate::error::EngineError;
use crate::features::FeatureVector;
use chrono::Utc;
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One labeled training example
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    pub features: FeatureVector,
    /// True for the at-risk class
    pub label: bool,
}

/// Labeled dataset handed to the retrain operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingSet {
    pub samples: Vec<LabeledSample>,
}

/// Trains the three experts and the meta-classifier
pub struct EnsembleTrainer;

impl EnsembleTrainer {
    /// Train with default hyperparameters
    pub fn train(set: &TrainingSet) -> Result<EnsembleArtifact, EngineError> {
        Self::train_with_config(set, &FitConfig::default())
    }

    /// Train with explicit hyperparameters
    pub fn train_with_config(
        set: &TrainingSet,
        config: &FitConfig,
    ) -> Result<EnsembleArtifact, EngineError> {
        let positives = set.samples.iter().filter(|s| s.label).count();
        let negatives = set.samples.len() - positives;
        if positives == 0 || negatives == 0 {
            return Err(EngineError::InsufficientTraining(format!(
                "both classes required, got {} positive / {} negative",
                positives, negatives
            )));
        }

        let labels: Vec<bool> = set.samples.iter().map(|s| s.label).collect();

        let movement_rows: Vec<Vec<f64>> = set
            .samples
            .iter()
            .map(|s| s.features.movement().to_vec())
            .collect();
        let executive_rows: Vec<Vec<f64>> = set
            .samples
            .iter()
            .map(|s| s.features.executive().to_vec())
            .collect();
        let oculomotor_rows: Vec<Vec<f64>> = set
            .samples
            .iter()
            .map(|s| s.features.oculomotor().to_vec())
            .collect();

        let movement = LogisticModel::fit(&movement_rows, &labels, config)?;
        let executive = LogisticModel::fit(&executive_rows, &labels, config)?;
        let oculomotor = LogisticModel::fit(&oculomotor_rows, &labels, config)?;

        // Stack the experts' training-set probabilities as meta-features.
        let mut meta_rows = Vec::with_capacity(set.samples.len());
        for ((m_row, e_row), o_row) in movement_rows
            .iter()
            .zip(executive_rows.iter())
            .zip(oculomotor_rows.iter())
        {
            meta_rows.push(vec![
                movement.score(m_row)?,
                executive.score(e_row)?,
                oculomotor.score(o_row)?,
            ]);
        }
        let meta = LogisticModel::fit(&meta_rows, &labels, config)?;

        let artifact = EnsembleArtifact {
            model_id: Uuid::new_v4(),
            trained_at: Utc::now(),
            movement,
            executive,
            oculomotor,
            meta,
        };
        debug!(
            "trained ensemble {} on {} samples ({} positive)",
            artifact.model_id,
            set.samples.len(),
            positives
        );
        Ok(artifact)
    }
}
