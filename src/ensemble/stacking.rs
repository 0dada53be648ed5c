//! Ensemble artifact and stacked inference
//!
//! An artifact is immutable once trained: three domain experts plus one
//! meta-classifier over their stacked probabilities. Each expert sees only
//! its own sub-vector, so features outside a domain cannot influence that
//! domain's probability.

use crate::ensemble::model::{LogisticModel, ProbabilisticClassifier};
use crate::error::EngineError;
use crate::features::FeatureVector;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Decision threshold on the final calibrated probability
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Raw expert probabilities, exposed for interpretability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainContributions {
    pub movement: f64,
    pub executive: f64,
    pub oculomotor: f64,
}

/// Final ensemble output for one feature vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsemblePrediction {
    /// Calibrated probability in [0, 1]
    pub probability: f64,
    /// `probability > 0.5`
    pub label: bool,
    pub contributions: DomainContributions,
}

/// Trained ensemble: three domain experts plus the meta-classifier.
///
/// Replaced only whole: retraining produces a fresh artifact that the engine
/// swaps in atomically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleArtifact {
    pub model_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub(crate) movement: LogisticModel,
    pub(crate) executive: LogisticModel,
    pub(crate) oculomotor: LogisticModel,
    pub(crate) meta: LogisticModel,
}

impl EnsembleArtifact {
    /// Score a feature vector through the two-stage ensemble
    pub fn score(&self, vector: &FeatureVector) -> Result<EnsemblePrediction, EngineError> {
        let movement = self.movement.score(vector.movement())?;
        let executive = self.executive.score(vector.executive())?;
        let oculomotor = self.oculomotor.score(vector.oculomotor())?;

        let meta_features = [movement, executive, oculomotor];
        let probability = self.meta.score(&meta_features)?;

        Ok(EnsemblePrediction {
            probability,
            label: probability > DECISION_THRESHOLD,
            contributions: DomainContributions {
                movement,
                executive,
                oculomotor,
            },
        })
    }

    /// Serialize for persistence
    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string(self).map_err(EngineError::JsonError)
    }

    /// Restore a persisted artifact
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json).map_err(EngineError::JsonError)
    }
}
