//! Clinical threshold indicators
//!
//! Converts the continuous feature vector into binary indicators against a
//! fixed, literature-informed threshold table: three indicators per domain,
//! domain sub-scores of 0-3, a composite of 0-9, and a severity grade.

use crate::features::FeatureVector;
use serde::{Deserialize, Serialize};

// Movement domain
const HEAD_MOVEMENT_THRESHOLD: f64 = 0.15;
const NECK_MOVEMENT_THRESHOLD: f64 = 0.10;
const SHOULDER_MOVEMENT_THRESHOLD: f64 = 0.08;

// Executive-function domain
const STROOP_EFFECT_THRESHOLD_MS: f64 = 100.0;
const COMMISSION_THRESHOLD: f64 = 0.25;
const OMISSION_THRESHOLD: f64 = 0.20;

// Oculomotor domain
const FIXATION_DURATION_THRESHOLD_MS: f64 = 300.0;
const REGRESSIONS_THRESHOLD: f64 = 12.0;
const ATTENTION_VARIABILITY_THRESHOLD: f64 = 0.25;

/// Severity grade over the composite score.
///
/// Canonical cut points are the inclusive ranges: below 2 none, 2-3 mild,
/// 4-5 moderate, 6 and above severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    None,
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    fn from_composite(composite: u8) -> Self {
        match composite {
            0..=1 => Severity::None,
            2..=3 => Severity::Mild,
            4..=5 => Severity::Moderate,
            _ => Severity::Severe,
        }
    }
}

/// Binary indicators plus derived scores for one feature vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalIndicatorSet {
    pub movement_head_above_threshold: bool,
    pub movement_neck_above_threshold: bool,
    pub movement_shoulder_above_threshold: bool,
    pub executive_stroop_above_threshold: bool,
    pub executive_commission_above_threshold: bool,
    pub executive_omission_above_threshold: bool,
    pub oculomotor_fixation_above_threshold: bool,
    pub oculomotor_regressions_above_threshold: bool,
    pub oculomotor_attention_above_threshold: bool,

    /// Movement indicators met (0-3)
    pub movement_score: u8,
    /// Executive indicators met (0-3)
    pub executive_score: u8,
    /// Oculomotor indicators met (0-3)
    pub oculomotor_score: u8,
    /// Sum of the domain sub-scores (0-9)
    pub composite_score: u8,
    pub severity: Severity,
}

impl ClinicalIndicatorSet {
    /// All nine flags in domain order
    pub fn flags(&self) -> [bool; 9] {
        [
            self.movement_head_above_threshold,
            self.movement_neck_above_threshold,
            self.movement_shoulder_above_threshold,
            self.executive_stroop_above_threshold,
            self.executive_commission_above_threshold,
            self.executive_omission_above_threshold,
            self.oculomotor_fixation_above_threshold,
            self.oculomotor_regressions_above_threshold,
            self.oculomotor_attention_above_threshold,
        ]
    }
}

/// Derives clinical indicators from a feature vector
pub struct ClinicalThresholdValidator;

impl ClinicalThresholdValidator {
    /// Evaluate the fixed threshold table against `vector`
    pub fn evaluate(vector: &FeatureVector) -> ClinicalIndicatorSet {
        let feature = |name: &str| vector.get(name).unwrap_or(0.0);

        let movement_head = feature("head_movement") > HEAD_MOVEMENT_THRESHOLD;
        let movement_neck = feature("neck_movement") > NECK_MOVEMENT_THRESHOLD;
        let movement_shoulder = feature("shoulder_movement") > SHOULDER_MOVEMENT_THRESHOLD;

        let executive_stroop = feature("stroop_effect") > STROOP_EFFECT_THRESHOLD_MS;
        let executive_commission = feature("gonogo_commission") > COMMISSION_THRESHOLD;
        let executive_omission = feature("gonogo_omission") > OMISSION_THRESHOLD;

        let oculomotor_fixation = feature("fixation_duration") > FIXATION_DURATION_THRESHOLD_MS;
        let oculomotor_regressions = feature("num_regressions") > REGRESSIONS_THRESHOLD;
        let oculomotor_attention =
            feature("attention_variability") > ATTENTION_VARIABILITY_THRESHOLD;

        let movement_score =
            movement_head as u8 + movement_neck as u8 + movement_shoulder as u8;
        let executive_score =
            executive_stroop as u8 + executive_commission as u8 + executive_omission as u8;
        let oculomotor_score =
            oculomotor_fixation as u8 + oculomotor_regressions as u8 + oculomotor_attention as u8;
        let composite_score = movement_score + executive_score + oculomotor_score;

        ClinicalIndicatorSet {
            movement_head_above_threshold: movement_head,
            movement_neck_above_threshold: movement_neck,
            movement_shoulder_above_threshold: movement_shoulder,
            executive_stroop_above_threshold: executive_stroop,
            executive_commission_above_threshold: executive_commission,
            executive_omission_above_threshold: executive_omission,
            oculomotor_fixation_above_threshold: oculomotor_fixation,
            oculomotor_regressions_above_threshold: oculomotor_regressions,
            oculomotor_attention_above_threshold: oculomotor_attention,
            movement_score,
            executive_score,
            oculomotor_score,
            composite_score,
            severity: Severity::from_composite(composite_score),
        }
    }
}
