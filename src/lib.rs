//! Neuroscreen - Streaming aggregation and ensemble inference for
//! attention-risk screening
//!
//! Neuroscreen turns a live stream of per-frame visual observations and
//! discrete cognitive-task trial events into a single calibrated risk
//! probability through a deterministic pipeline: session accumulation →
//! feature aggregation → clinical threshold indicators → domain-stacked
//! ensemble scoring.
//!
//! ## Modules
//!
//! - **session**: Bounded per-subject accumulation of frame observations and
//!   trial events
//! - **features / clinical**: Deterministic 36-feature aggregation and the
//!   clinical threshold indicator set
//! - **ensemble**: Three domain experts stacked under a meta-classifier, with
//!   a retrain-and-swap operation
//! - **kinematics**: Pointer-trace motor screening
//!
//! Vision (face/eye detection, optical flow) is an injected capability; see
//! [`vision::VisionPrimitive`].

pub mod clinical;
pub mod ensemble;
pub mod error;
pub mod features;
pub mod kinematics;
pub mod pipeline;
pub mod session;
pub mod stats;
pub mod vision;

pub use clinical::{ClinicalIndicatorSet, ClinicalThresholdValidator, Severity};
pub use ensemble::{
    DomainContributions, EnsembleArtifact, EnsemblePrediction, EnsembleTrainer, LabeledSample,
    TrainingSet,
};
pub use error::EngineError;
pub use features::{FeatureAggregator, FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use pipeline::{EngineConfig, InferenceRequest, InferenceResponse, ScreeningEngine};
pub use session::{Session, SessionStore, TaskData, TaskKind};
pub use vision::{FaceBox, FrameAnalysis, LumaFrame, VisionPrimitive};

/// Engine version embedded in exported artifacts and reports
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for exported payloads
pub const PRODUCER_NAME: &str = "neuroscreen";
