pub mod controller;
pub mod state;

pub use controller::TimerController;
pub use state::{FocusState, Phase, TickOutcome, DEFAULT_BREAK_SECS, DEFAULT_WORK_SECS};

use crate::models::Session;

/// Timer notifications fanned out to whoever subscribed (UI glue, the
/// group auto-sync task, tests).
#[derive(Debug, Clone)]
pub enum TimerEvent {
    StateChanged(FocusState),
    SessionCompleted(Session),
}
