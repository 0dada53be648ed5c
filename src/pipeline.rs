//! Screening engine orchestration
//!
//! Ties the pipeline together for one inference call: vision analysis →
//! session mutation → feature aggregation → clinical indicators, and, once a
//! session reports finished, ensemble scoring. The ensemble artifact is
//! read-mostly and swapped whole on retrain so in-flight inferences never see
//! a half-updated model.

use crate::clinical::{ClinicalIndicatorSet, ClinicalThresholdValidator};
use crate::ensemble::stacking::{DomainContributions, EnsembleArtifact, EnsemblePrediction};
use crate::ensemble::trainer::{EnsembleTrainer, TrainingSet};
use crate::error::EngineError;
use crate::features::{FeatureAggregator, FeatureVector, ASSUMED_FRAME_RATE};
use crate::session::frame::{FrameObservationProcessor, InstantSnapshot};
use crate::session::store::{SessionStore, DEFAULT_SESSION_CAPACITY, DEFAULT_SESSION_TTL_SECS};
use crate::session::task::{TaskData, TaskEventProcessor};
use crate::vision::{LumaFrame, VisionPrimitive};
use chrono::{DateTime, Duration, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

/// Engine tuning knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum concurrently tracked sessions
    pub session_capacity: usize,
    /// Inactivity TTL before a session is released
    pub session_ttl_secs: i64,
    /// Frame rate assumed for fixation-duration conversion
    pub frame_rate: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session_capacity: DEFAULT_SESSION_CAPACITY,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            frame_rate: ASSUMED_FRAME_RATE,
        }
    }
}

/// One inference call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceRequest {
    pub session_id: String,
    /// Decoded luma frame; required
    pub frame: Option<LumaFrame>,
    /// Trial event captured alongside the frame, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_data: Option<TaskData>,
}

/// Full response for one inference call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub instantaneous: InstantSnapshot,
    /// All 36 features by name
    pub aggregated: BTreeMap<String, f64>,
    pub clinical_indicators: ClinicalIndicatorSet,
    /// The 36 features in canonical order
    pub feature_vector: Vec<f64>,
    /// 1 when probability > 0.5; populated only on finished sessions with a
    /// trained model
    pub prediction: Option<u8>,
    pub probability: Option<f64>,
    pub domain_contributions: Option<DomainContributions>,
    pub session_id: String,
    pub model_available: bool,
}

/// Stateful screening engine: session store plus the swappable ensemble
pub struct ScreeningEngine {
    vision: Box<dyn VisionPrimitive>,
    store: SessionStore,
    artifact: RwLock<Option<Arc<EnsembleArtifact>>>,
    config: EngineConfig,
}

impl ScreeningEngine {
    /// Create an engine with default configuration and no trained model
    pub fn new(vision: Box<dyn VisionPrimitive>) -> Self {
        Self::with_config(vision, EngineConfig::default())
    }

    /// Create an engine with explicit configuration
    pub fn with_config(vision: Box<dyn VisionPrimitive>, config: EngineConfig) -> Self {
        Self {
            vision,
            store: SessionStore::new(config.session_capacity),
            artifact: RwLock::new(None),
            config,
        }
    }

    /// Process one observation/event pair for a session.
    ///
    /// A missing frame is an error and leaves all session state untouched.
    /// Ensemble scoring failures are downgraded to null prediction fields so
    /// one bad scoring pass never aborts the response.
    pub fn process(&self, request: InferenceRequest) -> Result<InferenceResponse, EngineError> {
        self.process_at(request, Utc::now())
    }

    /// [`Self::process`] with an explicit clock, for deterministic callers
    pub fn process_at(
        &self,
        request: InferenceRequest,
        now: DateTime<Utc>,
    ) -> Result<InferenceResponse, EngineError> {
        let frame = request
            .frame
            .ok_or_else(|| EngineError::MissingField("frame".to_string()))?;

        self.store
            .sweep_expired(now, Duration::seconds(self.config.session_ttl_secs));

        let shared = self.store.ensure(&request.session_id, now);
        let mut session = shared.lock().unwrap_or_else(PoisonError::into_inner);

        // Vision runs before any mutation so an analysis failure leaves the
        // session exactly as it was.
        let analysis = self.vision.analyze(session.prev_frame.as_ref(), &frame)?;
        session.prev_frame = Some(frame);

        let instantaneous = FrameObservationProcessor::apply(&mut session, &analysis, now);

        if let Some(task) = &request.task_data {
            TaskEventProcessor::apply(&mut session, task);
        }

        let vector = FeatureAggregator::aggregate_with_rate(&session, now, self.config.frame_rate);
        let clinical_indicators = ClinicalThresholdValidator::evaluate(&vector);

        let finished = request
            .task_data
            .as_ref()
            .map(TaskData::is_finished)
            .unwrap_or(false);

        let artifact = self.current_artifact();
        let model_available = artifact.is_some();

        let mut prediction = None;
        let mut probability = None;
        let mut domain_contributions = None;

        if finished {
            session.finalized = true;
            if let Some(artifact) = &artifact {
                match artifact.score(&vector) {
                    Ok(scored) => {
                        prediction = Some(u8::from(scored.label));
                        probability = Some(scored.probability);
                        domain_contributions = Some(scored.contributions);
                    }
                    Err(e) => {
                        warn!(
                            "session {}: ensemble scoring failed, returning null prediction: {}",
                            request.session_id, e
                        );
                    }
                }
            }
        }

        let response = InferenceResponse {
            instantaneous,
            aggregated: vector.named(),
            clinical_indicators,
            feature_vector: vector.values().to_vec(),
            prediction,
            probability,
            domain_contributions,
            session_id: request.session_id.clone(),
            model_available,
        };

        drop(session);
        if finished {
            // Finished sessions are released; a new session id starts fresh.
            self.store.remove(&request.session_id);
        }

        Ok(response)
    }

    /// Train a fresh ensemble and swap it in atomically; returns the new
    /// artifact id
    pub fn retrain(&self, set: &TrainingSet) -> Result<Uuid, EngineError> {
        let artifact = EnsembleTrainer::train(set)?;
        let id = artifact.model_id;
        *self.artifact.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(artifact));
        Ok(id)
    }

    /// Whether a trained ensemble is currently installed
    pub fn model_available(&self) -> bool {
        self.current_artifact().is_some()
    }

    /// Install a previously exported artifact
    pub fn load_artifact(&self, json: &str) -> Result<Uuid, EngineError> {
        let artifact = EnsembleArtifact::from_json(json)?;
        let id = artifact.model_id;
        *self.artifact.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(artifact));
        Ok(id)
    }

    /// Export the installed artifact for persistence
    pub fn export_artifact(&self) -> Result<String, EngineError> {
        match self.current_artifact() {
            Some(artifact) => artifact.to_json(),
            None => Err(EngineError::ModelUnavailable),
        }
    }

    /// Score an already-aggregated vector directly, bypassing session state
    pub fn score_vector(&self, vector: &FeatureVector) -> Result<EnsemblePrediction, EngineError> {
        match self.current_artifact() {
            Some(artifact) => artifact.score(vector),
            None => Err(EngineError::ModelUnavailable),
        }
    }

    /// Release a session explicitly
    pub fn close_session(&self, id: &str) -> bool {
        self.store.remove(id).is_some()
    }

    /// Number of currently tracked sessions
    pub fn session_count(&self) -> usize {
        self.store.len()
    }

    fn current_artifact(&self) -> Option<Arc<EnsembleArtifact>> {
        self.artifact
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
