//! Stateful session accumulation
//!
//! A [`Session`](state::Session) accumulates noisy per-frame observations and
//! discrete trial events for one subject. Mutation goes through exactly two
//! processors: [`frame::FrameObservationProcessor`] for vision results and
//! [`task::TaskEventProcessor`] for trial events. The [`store::SessionStore`]
//! owns the records and enforces the bounded-memory and single-writer rules.

pub mod frame;
pub mod state;
pub mod store;
pub mod task;

pub use frame::{FrameObservationProcessor, InstantSnapshot};
pub use state::Session;
pub use store::SessionStore;
pub use task::{GameState, TaskData, TaskEventProcessor, TaskKind, TrialSignal};
