//! Session record
//!
//! One mutable record per active subject session. Every buffer is capped so a
//! long-running session cannot grow without bound; ring semantics evict the
//! oldest entry on overflow.

use crate::vision::LumaFrame;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Cap on the head-movement magnitude history (60 s at the assumed 15 fps)
pub const HEAD_HISTORY_CAP: usize = 900;

/// Cap on the optical-flow magnitude ring buffer
pub const FLOW_HISTORY_CAP: usize = 300;

/// Cap on the completed fixation-period list
pub const FIXATION_PERIODS_CAP: usize = 300;

/// Cap on each per-task reaction-time list
pub const TRIAL_RT_CAP: usize = 512;

/// Stroop trial accumulators
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StroopRecord {
    /// Reaction times on congruent trials (ms)
    pub congruent_rts: VecDeque<f64>,
    /// Reaction times on incongruent trials (ms)
    pub incongruent_rts: VecDeque<f64>,
    /// Incorrect responses on incongruent trials
    pub incongruent_errors: u32,
    /// Incorrect responses regardless of congruency
    pub commission_errors: u32,
}

/// N-Back trial accumulators
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NBackRecord {
    pub correct: u32,
    pub false_alarms: u32,
    /// Response latencies (ms), recorded regardless of correctness
    pub latencies: VecDeque<f64>,
}

/// Go/No-Go trial accumulators
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoNoGoRecord {
    /// Responses on No-Go trials
    pub commissions: u32,
    /// Missed responses on No-Go trials
    pub omissions: u32,
    /// Reaction times (ms), recorded on Go and No-Go trials alike
    pub rts: VecDeque<f64>,
}

/// Accumulated state for one subject session.
///
/// Owned by the [`super::store::SessionStore`]; mutated only by the frame and
/// task processors while the per-session lock is held.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,

    /// Recent head-movement magnitudes in pixels (ring, capped)
    pub head_history: VecDeque<f64>,
    /// Recent mean optical-flow magnitudes (ring, capped). Sole proxy for
    /// neck/shoulder/torso motion and attention variability; a monocular
    /// face-region feed cannot recover 3-D joint movement.
    pub flow_history: VecDeque<f64>,

    /// Previous frame, kept for optical-flow estimation; overwritten each frame
    pub prev_frame: Option<LumaFrame>,
    /// Previous face-center coordinate; overwritten each face frame
    pub prev_face_center: Option<(f64, f64)>,

    pub frames_with_face: u32,
    pub blink_count: u32,
    pub fixation_frames: u32,
    /// Length of the fixation run currently in progress
    pub fixation_run: u32,
    /// Completed fixation-run lengths in frames (ring, capped)
    pub fixation_periods: VecDeque<u32>,
    /// Frames where no face was detected
    pub attention_drops: u32,

    pub stroop: StroopRecord,
    pub nback: NBackRecord,
    pub gonogo: GoNoGoRecord,

    /// Set once the session-finished signal has been observed
    pub finalized: bool,
}

impl Session {
    /// Create a fresh session with zeroed counters and empty buffers
    pub fn new(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            created_at: now,
            last_activity: now,
            head_history: VecDeque::new(),
            flow_history: VecDeque::new(),
            prev_frame: None,
            prev_face_center: None,
            frames_with_face: 0,
            blink_count: 0,
            fixation_frames: 0,
            fixation_run: 0,
            fixation_periods: VecDeque::new(),
            attention_drops: 0,
            stroop: StroopRecord::default(),
            nback: NBackRecord::default(),
            gonogo: GoNoGoRecord::default(),
            finalized: false,
        }
    }

    /// Record activity for TTL bookkeeping
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }

    /// Append a head-movement magnitude, evicting the oldest on overflow
    pub fn push_head_movement(&mut self, magnitude: f64) {
        push_capped(&mut self.head_history, magnitude, HEAD_HISTORY_CAP);
    }

    /// Append an optical-flow magnitude, evicting the oldest on overflow
    pub fn push_flow(&mut self, magnitude: f64) {
        push_capped(&mut self.flow_history, magnitude, FLOW_HISTORY_CAP);
    }

    /// Append a completed fixation-run length
    pub fn push_fixation_period(&mut self, frames: u32) {
        push_capped(&mut self.fixation_periods, frames, FIXATION_PERIODS_CAP);
    }
}

/// Append with ring semantics: oldest entry evicted once `cap` is reached
pub(crate) fn push_capped<T>(buffer: &mut VecDeque<T>, value: T, cap: usize) {
    buffer.push_back(value);
    while buffer.len() > cap {
        buffer.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_new_session_is_zeroed() {
        let session = Session::new("s1", now());
        assert_eq!(session.id, "s1");
        assert!(session.head_history.is_empty());
        assert!(session.flow_history.is_empty());
        assert_eq!(session.blink_count, 0);
        assert_eq!(session.attention_drops, 0);
        assert_eq!(session.gonogo.commissions, 0);
        assert!(!session.finalized);
    }

    #[test]
    fn test_flow_ring_evicts_oldest() {
        let mut session = Session::new("s1", now());
        for i in 0..(FLOW_HISTORY_CAP + 5) {
            session.push_flow(i as f64);
        }
        assert_eq!(session.flow_history.len(), FLOW_HISTORY_CAP);
        // First five entries were evicted
        assert_eq!(session.flow_history.front().copied(), Some(5.0));
        assert_eq!(
            session.flow_history.back().copied(),
            Some((FLOW_HISTORY_CAP + 4) as f64)
        );
    }

    #[test]
    fn test_head_history_is_capped() {
        let mut session = Session::new("s1", now());
        for _ in 0..(HEAD_HISTORY_CAP * 2) {
            session.push_head_movement(1.0);
        }
        assert_eq!(session.head_history.len(), HEAD_HISTORY_CAP);
    }

    #[test]
    fn test_session_serde_round_trip() {
        let mut session = Session::new("s1", now());
        session.push_head_movement(3.0);
        session.stroop.commission_errors = 2;

        let json = serde_json::to_string(&session).unwrap();
        let restored: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.id, "s1");
        assert_eq!(restored.head_history, session.head_history);
        assert_eq!(restored.stroop.commission_errors, 2);
    }
}
