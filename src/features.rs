//! Feature aggregation
//!
//! Pure derivation of the fixed 36-dimension feature vector from a session.
//! The vector is always fully populated: signal sources this pipeline cannot
//! produce (full-body pose, gaze/text tracking) stay as explicit named zero
//! fields rather than being dropped, so downstream models always see the same
//! shape. Given the same session history and the same `now`, the output is
//! bit-identical.

use crate::session::state::Session;
use crate::stats;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

/// Number of features in the vector
pub const FEATURE_COUNT: usize = 36;

/// Frame rate assumed when converting fixation frame counts to durations
pub const ASSUMED_FRAME_RATE: f64 = 15.0;

/// Canonical feature order. Index ranges below slice this array per domain.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "head_movement",
    "head_movement_std",
    "head_movement_max",
    "head_movement_range",
    "neck_movement",
    "neck_movement_std",
    "shoulder_movement",
    "shoulder_movement_std",
    "other_joints",
    "torso_movement_variability",
    "fidgeting_score",
    "movement_consistency",
    "stroop_congruent_rt",
    "stroop_incongruent_rt",
    "stroop_effect",
    "stroop_error_incongruent",
    "stroop_commission_errors",
    "nback_accuracy",
    "nback_false_alarm",
    "nback_latency",
    "nback_load_sensitivity",
    "gonogo_commission",
    "gonogo_omission",
    "gonogo_rt_variability",
    "gonogo_inhibition_score",
    "fixation_duration",
    "num_regressions",
    "saccade_fix_ratio",
    "fixation_stability",
    "total_reading_time",
    "reading_speed",
    "attention_focus_mean",
    "attention_variability",
    "attention_drops",
    "blink_rate",
    "behavioral_stability",
];

/// Movement-domain slice of the vector
pub const MOVEMENT_RANGE: Range<usize> = 0..12;
/// Executive-function slice of the vector
pub const EXECUTIVE_RANGE: Range<usize> = 12..25;
/// Oculomotor slice of the vector
pub const OCULOMOTOR_RANGE: Range<usize> = 25..36;

/// Fixed-shape, fully populated feature vector in canonical order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    /// Build from a full 36-value array
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self {
            values: values.to_vec(),
        }
    }

    /// Values in canonical order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value by feature name
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|&n| n == name)
            .map(|i| self.values[i])
    }

    /// Name/value pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.values.iter().copied())
    }

    /// Name-to-value map
    pub fn named(&self) -> BTreeMap<String, f64> {
        self.iter().map(|(n, v)| (n.to_string(), v)).collect()
    }

    /// Movement-domain sub-vector
    pub fn movement(&self) -> &[f64] {
        &self.values[MOVEMENT_RANGE]
    }

    /// Executive-function sub-vector
    pub fn executive(&self) -> &[f64] {
        &self.values[EXECUTIVE_RANGE]
    }

    /// Oculomotor sub-vector
    pub fn oculomotor(&self) -> &[f64] {
        &self.values[OCULOMOTOR_RANGE]
    }
}

/// Derives the feature vector from accumulated session state
pub struct FeatureAggregator;

impl FeatureAggregator {
    /// Aggregate with the default assumed frame rate
    pub fn aggregate(session: &Session, now: DateTime<Utc>) -> FeatureVector {
        Self::aggregate_with_rate(session, now, ASSUMED_FRAME_RATE)
    }

    /// Aggregate using `frame_rate` for fixation-duration conversion.
    ///
    /// `now` is only used for the blink-rate denominator; passing it in keeps
    /// the derivation a pure function of its inputs.
    pub fn aggregate_with_rate(
        session: &Session,
        now: DateTime<Utc>,
        frame_rate: f64,
    ) -> FeatureVector {
        let head: Vec<f64> = session.head_history.iter().copied().collect();
        let flow: Vec<f64> = session.flow_history.iter().copied().collect();
        let fixation_periods: Vec<f64> =
            session.fixation_periods.iter().map(|&f| f as f64).collect();
        let congruent: Vec<f64> = session.stroop.congruent_rts.iter().copied().collect();
        let incongruent: Vec<f64> = session.stroop.incongruent_rts.iter().copied().collect();
        let latencies: Vec<f64> = session.nback.latencies.iter().copied().collect();
        let gonogo_rts: Vec<f64> = session.gonogo.rts.iter().copied().collect();

        let head_movement = stats::mean(&head);
        let head_movement_std = stats::population_std(&head);
        let flow_mean = stats::mean(&flow);
        let flow_std = stats::population_std(&flow);

        // In (0, 1]; exactly 1 only when head variance is zero.
        let movement_consistency = 1.0 / (1.0 + head_movement_std);

        let stroop_congruent_rt = stats::mean(&congruent);
        let stroop_incongruent_rt = stats::mean(&incongruent);

        let nback_total = session.nback.correct + session.nback.false_alarms;
        let nback_accuracy = if nback_total > 0 {
            session.nback.correct as f64 / nback_total as f64
        } else {
            0.0
        };

        let fixation_duration_ms = session.fixation_frames as f64 / frame_rate * 1000.0;
        let fixation_stability = 1.0 / (1.0 + stats::population_std(&fixation_periods));

        let elapsed_minutes = (now - session.created_at).num_minutes().max(1) as f64;
        let blink_rate = session.blink_count as f64 / elapsed_minutes;

        FeatureVector {
            values: vec![
                head_movement,
                head_movement_std,
                stats::max(&head),
                stats::range(&head),
                // No separate neck/shoulder sensing exists; both read the
                // optical-flow proxy.
                flow_mean,
                flow_std,
                flow_mean,
                flow_std,
                0.0, // other_joints: needs full-body pose
                flow_std,
                stats::mean(&head.iter().map(|v| v.abs()).collect::<Vec<f64>>()),
                movement_consistency,
                stroop_congruent_rt,
                stroop_incongruent_rt,
                stroop_incongruent_rt - stroop_congruent_rt,
                session.stroop.incongruent_errors as f64,
                session.stroop.commission_errors as f64,
                nback_accuracy,
                session.nback.false_alarms as f64,
                stats::mean(&latencies),
                0.0, // nback_load_sensitivity: needs per-load-level trials
                session.gonogo.commissions as f64,
                session.gonogo.omissions as f64,
                stats::population_std(&gonogo_rts),
                stats::mean(&gonogo_rts),
                fixation_duration_ms,
                0.0, // num_regressions: needs gaze/text tracking
                0.0, // saccade_fix_ratio: needs gaze tracking
                fixation_stability,
                0.0, // total_reading_time: needs a reading task surface
                0.0, // reading_speed: needs a reading task surface
                flow_mean,
                flow_std,
                session.attention_drops as f64,
                blink_rate,
                movement_consistency, // behavioral_stability reuses consistency
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::frame::FrameObservationProcessor;
    use crate::session::task::{TaskData, TaskEventProcessor, TaskKind, TrialSignal};
    use crate::vision::{FaceBox, FrameAnalysis};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn face_frame(x: f64, eyes: u32, flow: f64) -> FrameAnalysis {
        FrameAnalysis {
            face: Some(FaceBox {
                x,
                y: 0.0,
                width: 80.0,
                height: 80.0,
                eye_count: eyes,
            }),
            flow_magnitude: flow,
        }
    }

    #[test]
    fn test_vector_always_has_36_entries() {
        let session = Session::new("s", t0());
        let vector = FeatureAggregator::aggregate(&session, t0());
        assert_eq!(vector.values().len(), FEATURE_COUNT);
        assert_eq!(vector.named().len(), FEATURE_COUNT);
    }

    #[test]
    fn test_domain_slices_partition_the_vector() {
        let session = Session::new("s", t0());
        let vector = FeatureAggregator::aggregate(&session, t0());
        assert_eq!(vector.movement().len(), 12);
        assert_eq!(vector.executive().len(), 13);
        assert_eq!(vector.oculomotor().len(), 11);
    }

    #[test]
    fn test_empty_session_defaults_to_zero_except_unit_consistency() {
        let session = Session::new("s", t0());
        let vector = FeatureAggregator::aggregate(&session, t0());

        assert_eq!(vector.get("head_movement"), Some(0.0));
        assert_eq!(vector.get("stroop_effect"), Some(0.0));
        assert_eq!(vector.get("nback_accuracy"), Some(0.0));
        // Zero variance means full consistency
        assert_eq!(vector.get("movement_consistency"), Some(1.0));
        assert_eq!(vector.get("fixation_stability"), Some(1.0));
        assert_eq!(vector.get("behavioral_stability"), Some(1.0));
    }

    #[test]
    fn test_determinism_for_identical_histories() {
        let build = || {
            let mut session = Session::new("s", t0());
            for i in 0..20 {
                let analysis = face_frame(i as f64 * 1.5, 2, 0.2 + i as f64 * 0.01);
                FrameObservationProcessor::apply(&mut session, &analysis, t0());
            }
            TaskEventProcessor::apply(
                &mut session,
                &TaskData {
                    task_type: TaskKind::Stroop,
                    signal: None,
                    response: None,
                    correct: Some(false),
                    incongruent: Some(true),
                    rt: Some(812.0),
                    game_state: None,
                },
            );
            session
        };

        let now = t0() + chrono::Duration::minutes(3);
        let a = FeatureAggregator::aggregate(&build(), now);
        let b = FeatureAggregator::aggregate(&build(), now);
        assert_eq!(a, b);
        // Bit-identical, not merely approximately equal
        for (x, y) in a.values().iter().zip(b.values()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn test_no_face_ever_scenario() {
        let mut session = Session::new("s", t0());
        for _ in 0..25 {
            let analysis = FrameAnalysis {
                face: None,
                flow_magnitude: 0.3,
            };
            FrameObservationProcessor::apply(&mut session, &analysis, t0());
        }

        let vector = FeatureAggregator::aggregate(&session, t0());
        assert_eq!(vector.get("head_movement"), Some(0.0));
        assert_eq!(vector.get("head_movement_std"), Some(0.0));
        assert_eq!(vector.get("head_movement_max"), Some(0.0));
        assert_eq!(vector.get("head_movement_range"), Some(0.0));
        assert_eq!(vector.get("attention_drops"), Some(25.0));
    }

    #[test]
    fn test_stroop_effect_is_incongruent_minus_congruent() {
        let mut session = Session::new("s", t0());
        TaskEventProcessor::apply(
            &mut session,
            &TaskData {
                task_type: TaskKind::Stroop,
                signal: None,
                response: None,
                correct: Some(false),
                incongruent: Some(true),
                rt: Some(900.0),
                game_state: None,
            },
        );
        TaskEventProcessor::apply(
            &mut session,
            &TaskData {
                task_type: TaskKind::Stroop,
                signal: None,
                response: None,
                correct: Some(true),
                incongruent: Some(false),
                rt: Some(640.0),
                game_state: None,
            },
        );

        let vector = FeatureAggregator::aggregate(&session, t0());
        assert_eq!(vector.get("stroop_incongruent_rt"), Some(900.0));
        assert_eq!(vector.get("stroop_congruent_rt"), Some(640.0));
        assert_eq!(vector.get("stroop_effect"), Some(260.0));
        assert_eq!(vector.get("stroop_error_incongruent"), Some(1.0));
        assert_eq!(vector.get("stroop_commission_errors"), Some(1.0));
    }

    #[test]
    fn test_gonogo_scenario_counts() {
        let mut session = Session::new("s", t0());
        let events = [
            (Some(TrialSignal::NoGo), Some(true), Some(240.0)),
            (Some(TrialSignal::NoGo), Some(false), None),
            (Some(TrialSignal::Go), Some(true), Some(310.0)),
        ];
        for (signal, response, rt) in events {
            TaskEventProcessor::apply(
                &mut session,
                &TaskData {
                    task_type: TaskKind::GoNoGo,
                    signal,
                    response,
                    correct: None,
                    incongruent: None,
                    rt,
                    game_state: None,
                },
            );
        }

        let vector = FeatureAggregator::aggregate(&session, t0());
        assert_eq!(vector.get("gonogo_commission"), Some(1.0));
        assert_eq!(vector.get("gonogo_omission"), Some(1.0));
        // Two of three events carried an rt; mean of 240 and 310
        assert_eq!(vector.get("gonogo_inhibition_score"), Some(275.0));
        assert_eq!(vector.get("gonogo_rt_variability"), Some(35.0));
    }

    #[test]
    fn test_nback_accuracy_range() {
        let mut session = Session::new("s", t0());
        session.nback.correct = 6;
        session.nback.false_alarms = 2;

        let vector = FeatureAggregator::aggregate(&session, t0());
        assert_eq!(vector.get("nback_accuracy"), Some(0.75));
        assert_eq!(vector.get("nback_false_alarm"), Some(2.0));
    }

    #[test]
    fn test_fixation_duration_uses_frame_rate() {
        let mut session = Session::new("s", t0());
        session.fixation_frames = 45;

        let vector = FeatureAggregator::aggregate(&session, t0());
        // 45 frames at 15 fps = 3 seconds = 3000 ms
        assert_eq!(vector.get("fixation_duration"), Some(3000.0));

        let vector = FeatureAggregator::aggregate_with_rate(&session, t0(), 30.0);
        assert_eq!(vector.get("fixation_duration"), Some(1500.0));
    }

    #[test]
    fn test_blink_rate_denominator_floors_at_one_minute() {
        let mut session = Session::new("s", t0());
        session.blink_count = 8;

        // 30 seconds in: denominator still one minute
        let vector =
            FeatureAggregator::aggregate(&session, t0() + chrono::Duration::seconds(30));
        assert_eq!(vector.get("blink_rate"), Some(8.0));

        let vector = FeatureAggregator::aggregate(&session, t0() + chrono::Duration::minutes(4));
        assert_eq!(vector.get("blink_rate"), Some(2.0));
    }

    #[test]
    fn test_shared_flow_proxy_fields_agree() {
        let mut session = Session::new("s", t0());
        for flow in [0.1, 0.4, 0.2, 0.5] {
            session.push_flow(flow);
        }

        let vector = FeatureAggregator::aggregate(&session, t0());
        let neck = vector.get("neck_movement");
        assert_eq!(neck, vector.get("shoulder_movement"));
        assert_eq!(neck, vector.get("attention_focus_mean"));
        let neck_std = vector.get("neck_movement_std");
        assert_eq!(neck_std, vector.get("shoulder_movement_std"));
        assert_eq!(neck_std, vector.get("attention_variability"));
        assert_eq!(neck_std, vector.get("torso_movement_variability"));
    }

    #[test]
    fn test_placeholder_fields_stay_zero() {
        let mut session = Session::new("s", t0());
        session.nback.correct = 5;
        session.fixation_frames = 10;

        let vector = FeatureAggregator::aggregate(&session, t0());
        for name in [
            "other_joints",
            "nback_load_sensitivity",
            "num_regressions",
            "saccade_fix_ratio",
            "total_reading_time",
            "reading_speed",
        ] {
            assert_eq!(vector.get(name), Some(0.0), "{} must stay zero", name);
        }
    }
}
