//! Discrete trial-event processing
//!
//! One trial event carries a task tag plus whichever task-specific fields the
//! client captured. Updates are order-independent per event, and a missing
//! field never raises: it skips the corresponding counter and leaves a debug
//! log entry so data gaps stay visible.

use crate::session::state::{push_capped, Session, TRIAL_RT_CAP};
use log::debug;
use serde::{Deserialize, Serialize};

/// Cognitive task a trial event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskKind {
    GoNoGo,
    Stroop,
    NBack,
}

/// Go/No-Go stimulus class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrialSignal {
    #[serde(rename = "Go")]
    Go,
    #[serde(rename = "No-Go")]
    NoGo,
}

/// Session lifecycle marker carried on trial events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    Running,
    Finished,
}

/// One discrete trial event.
///
/// Fields other than `task_type` are optional; partial client data is
/// tolerated by design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskData {
    pub task_type: TaskKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<TrialSignal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incongruent: Option<bool>,
    /// Reaction time in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_state: Option<GameState>,
}

impl TaskData {
    /// Whether this event carries the session-finished signal
    pub fn is_finished(&self) -> bool {
        self.game_state == Some(GameState::Finished)
    }
}

/// Applies one [`TaskData`] event to a session
pub struct TaskEventProcessor;

impl TaskEventProcessor {
    /// Update the session's per-task counters from one trial event
    pub fn apply(session: &mut Session, event: &TaskData) {
        match event.task_type {
            TaskKind::GoNoGo => apply_gonogo(session, event),
            TaskKind::Stroop => apply_stroop(session, event),
            TaskKind::NBack => apply_nback(session, event),
        }
    }
}

fn apply_gonogo(session: &mut Session, event: &TaskData) {
    match (event.signal, event.response) {
        (Some(TrialSignal::NoGo), Some(true)) => session.gonogo.commissions += 1,
        (Some(TrialSignal::NoGo), Some(false)) => session.gonogo.omissions += 1,
        (Some(TrialSignal::NoGo), None) => {
            debug!(
                "session {}: go/no-go event missing response, skipping error counters",
                session.id
            );
        }
        (Some(TrialSignal::Go), _) => {}
        (None, _) => {
            debug!(
                "session {}: go/no-go event missing signal, skipping error counters",
                session.id
            );
        }
    }

    // RTs are kept for Go trials too; inhibition metrics use the full list.
    if let Some(rt) = event.rt {
        push_capped(&mut session.gonogo.rts, rt, TRIAL_RT_CAP);
    }
}

fn apply_stroop(session: &mut Session, event: &TaskData) {
    match event.incongruent {
        Some(true) => {
            if let Some(rt) = event.rt {
                push_capped(&mut session.stroop.incongruent_rts, rt, TRIAL_RT_CAP);
            }
            if event.correct == Some(false) {
                session.stroop.incongruent_errors += 1;
            }
        }
        Some(false) => {
            if let Some(rt) = event.rt {
                push_capped(&mut session.stroop.congruent_rts, rt, TRIAL_RT_CAP);
            }
        }
        None => {
            debug!(
                "session {}: stroop event missing congruency, skipping RT lists",
                session.id
            );
        }
    }

    // Commission errors count incorrect responses regardless of congruency.
    if event.correct == Some(false) {
        session.stroop.commission_errors += 1;
    }
}

fn apply_nback(session: &mut Session, event: &TaskData) {
    match event.correct {
        Some(true) => session.nback.correct += 1,
        // A false alarm is an incorrect match response: the subject responded
        // to a non-target. Clients report no dedicated flag for it.
        Some(false) if event.response == Some(true) => session.nback.false_alarms += 1,
        Some(false) => {}
        None => {
            debug!(
                "session {}: n-back event missing correctness, skipping accuracy counters",
                session.id
            );
        }
    }

    if let Some(rt) = event.rt {
        push_capped(&mut session.nback.latencies, rt, TRIAL_RT_CAP);
    }
}
