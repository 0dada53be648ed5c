//! Per-frame observation processing
//!
//! Consumes one vision result, mutates the session in place, and returns an
//! instantaneous snapshot for the caller. The face-dependent updates (head
//! movement, blink, fixation run) apply only when a face was detected; the
//! optical-flow append happens on every frame.

use crate::session::state::Session;
use crate::stats;
use crate::vision::FrameAnalysis;
use chrono::{DateTime, Utc};

/// Head-movement magnitude below which a frame counts toward a fixation run
pub const FIXATION_THRESHOLD_PX: f64 = 2.5;

/// Number of trailing head-movement entries in the instantaneous fidgeting window
pub const FIDGET_WINDOW: usize = 10;

/// Eye count below which a face frame is flagged as a blink
const BLINK_EYE_COUNT: u32 = 2;

/// Instantaneous per-frame readout returned to the caller
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InstantSnapshot {
    /// Mean optical-flow magnitude for this frame
    pub motion_magnitude: f64,
    /// Head-center displacement since the previous face frame (px)
    pub head_movement: f64,
    /// Whether this frame was flagged as a blink
    pub blink: bool,
    /// Population stdev of the last [`FIDGET_WINDOW`] head magnitudes
    pub fidgeting_score: f64,
}

/// Applies one [`FrameAnalysis`] to a session
pub struct FrameObservationProcessor;

impl FrameObservationProcessor {
    /// Update `session` with one frame's vision result.
    ///
    /// The caller must hold the session's exclusive lock; buffers and the
    /// fixation run counter are only consistent under single-writer access.
    pub fn apply(
        session: &mut Session,
        analysis: &FrameAnalysis,
        now: DateTime<Utc>,
    ) -> InstantSnapshot {
        session.touch(now);

        let mut head_movement = 0.0;
        let mut blink = false;

        match &analysis.face {
            Some(face) => {
                let center = face.center();
                head_movement = match session.prev_face_center {
                    Some((px, py)) => {
                        let (cx, cy) = center;
                        ((cx - px).powi(2) + (cy - py).powi(2)).sqrt()
                    }
                    None => 0.0,
                };
                session.prev_face_center = Some(center);
                session.push_head_movement(head_movement);
                session.frames_with_face += 1;

                blink = face.eye_count < BLINK_EYE_COUNT;
                if blink {
                    session.blink_count += 1;
                }

                let fixation = head_movement < FIXATION_THRESHOLD_PX && face.eye_count >= 1;
                if fixation {
                    session.fixation_frames += 1;
                    session.fixation_run += 1;
                } else if session.fixation_run > 0 {
                    let run = session.fixation_run;
                    session.push_fixation_period(run);
                    session.fixation_run = 0;
                }
            }
            None => {
                session.attention_drops += 1;
            }
        }

        // Flow is recorded face or not; it is the only whole-body motion proxy.
        session.push_flow(analysis.flow_magnitude);

        InstantSnapshot {
            motion_magnitude: analysis.flow_magnitude,
            head_movement,
            blink,
            fidgeting_score: instantaneous_fidgeting(session),
        }
    }
}

/// Population stdev of the trailing fidgeting window, or of a single 0.0 when
/// no head history exists yet
fn instantaneous_fidgeting(session: &Session) -> f64 {
    if session.head_history.is_empty() {
        return 0.0;
    }
    let start = session.head_history.len().saturating_sub(FIDGET_WINDOW);
    let window: Vec<f64> = session.head_history.iter().skip(start).copied().collect();
    stats::population_std(&window)
}
