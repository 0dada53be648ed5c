//! Domain-stacked ensemble inference
//!
//! Three domain experts, each bound to one fixed feature subgroup, feed a
//! meta-classifier that turns their probabilities into the final calibrated
//! risk estimate. Experts and the meta-classifier share one scoring contract
//! ([`model::ProbabilisticClassifier`]); the meta stage is just another
//! classifier applied to the 3-vector of expert outputs.

pub mod model;
pub mod stacking;
pub mod trainer;

pub use model::{FitConfig, LogisticModel, ProbabilisticClassifier};
pub use stacking::{DomainContributions, EnsembleArtifact, EnsemblePrediction};
pub use trainer::{EnsembleTrainer, LabeledSample, TrainingSet};
