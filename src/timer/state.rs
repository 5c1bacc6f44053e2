use serde::{Deserialize, Serialize};

pub const DEFAULT_WORK_SECS: u32 = 25 * 60;
pub const DEFAULT_BREAK_SECS: u32 = 5 * 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Work,
    Break,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Work
    }
}

/// What a single tick did to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still counting down (or not active at all).
    Counting,
    /// A work phase ran to completion; credit a session of this many
    /// minutes. Always the configured work length, never wall-clock time.
    WorkCompleted { duration_minutes: u32 },
    /// A break phase ran to completion. No session is credited.
    BreakCompleted,
}

/// The focus timer state machine.
///
/// `active` is orthogonal to `phase`: pausing freezes `remaining_secs`
/// wherever it is, so a work phase interrupted by any number of
/// pause/resume cycles still credits exactly one full-length session
/// when it finally expires.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusState {
    pub phase: Phase,
    pub remaining_secs: u32,
    pub active: bool,
    pub work_secs: u32,
    pub break_secs: u32,
}

impl FocusState {
    pub fn new(work_secs: u32, break_secs: u32) -> Self {
        Self {
            phase: Phase::Work,
            remaining_secs: work_secs,
            active: false,
            work_secs,
            break_secs,
        }
    }

    /// Start or pause counting without touching the remaining time.
    pub fn toggle(&mut self) {
        self.active = !self.active;
    }

    /// Back to a full, inactive work phase regardless of current state.
    pub fn reset(&mut self) {
        self.phase = Phase::Work;
        self.remaining_secs = self.work_secs;
        self.active = false;
    }

    /// Advance the countdown by one second.
    ///
    /// A tick while inactive is a no-op. When the countdown reaches zero
    /// the phase flips, the next phase's full length is loaded, and the
    /// timer deactivates so the user explicitly starts the next phase.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.active || self.remaining_secs == 0 {
            return TickOutcome::Counting;
        }

        self.remaining_secs -= 1;
        if self.remaining_secs > 0 {
            return TickOutcome::Counting;
        }

        self.active = false;
        match self.phase {
            Phase::Work => {
                self.phase = Phase::Break;
                self.remaining_secs = self.break_secs;
                TickOutcome::WorkCompleted {
                    duration_minutes: self.work_secs / 60,
                }
            }
            Phase::Break => {
                self.phase = Phase::Work;
                self.remaining_secs = self.work_secs;
                TickOutcome::BreakCompleted
            }
        }
    }

    /// Fraction of the current phase already elapsed, for display.
    pub fn progress(&self) -> f64 {
        let length = match self.phase {
            Phase::Work => self.work_secs,
            Phase::Break => self.break_secs,
        };
        if length == 0 {
            return 0.0;
        }
        f64::from(length - self.remaining_secs.min(length)) / f64::from(length)
    }

    /// Roster status label derived from phase and activity.
    pub fn status_label(&self) -> &'static str {
        match (self.active, self.phase) {
            (true, Phase::Work) => "focusing",
            (true, Phase::Break) => "break",
            (false, _) => "idle",
        }
    }
}

impl Default for FocusState {
    fn default() -> Self {
        Self::new(DEFAULT_WORK_SECS, DEFAULT_BREAK_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed_sessions(outcome: TickOutcome) -> u32 {
        match outcome {
            TickOutcome::WorkCompleted { .. } => 1,
            _ => 0,
        }
    }

    #[test]
    fn full_work_phase_credits_one_session() {
        let mut state = FocusState::default();
        state.toggle();

        let mut sessions = 0;
        let mut last = TickOutcome::Counting;
        for _ in 0..DEFAULT_WORK_SECS {
            last = state.tick();
            sessions += completed_sessions(last);
        }

        assert_eq!(sessions, 1);
        assert_eq!(
            last,
            TickOutcome::WorkCompleted {
                duration_minutes: 25
            }
        );
        assert_eq!(state.phase, Phase::Break);
        assert_eq!(state.remaining_secs, DEFAULT_BREAK_SECS);
        assert!(!state.active);
    }

    #[test]
    fn pauses_do_not_shrink_the_credited_duration() {
        let mut state = FocusState::new(60, 10);
        state.toggle();

        let mut sessions = 0;
        let mut ticks_applied = 0;
        // Pause and resume every 7 ticks; paused ticks must not count.
        for i in 0..200 {
            if i % 7 == 0 {
                state.toggle();
            }
            let before = state.remaining_secs;
            let outcome = state.tick();
            if state.active || matches!(outcome, TickOutcome::WorkCompleted { .. }) {
                ticks_applied += 1;
            } else {
                assert_eq!(state.remaining_secs, before);
            }
            sessions += completed_sessions(outcome);
            if sessions == 1 {
                break;
            }
        }

        assert_eq!(sessions, 1);
        assert_eq!(ticks_applied, 60);
        assert_eq!(state.phase, Phase::Break);
    }

    #[test]
    fn break_expiry_fires_no_session() {
        let mut state = FocusState::new(30, 5);
        state.phase = Phase::Break;
        state.remaining_secs = 5;
        state.active = true;

        let mut last = TickOutcome::Counting;
        for _ in 0..5 {
            last = state.tick();
        }

        assert_eq!(last, TickOutcome::BreakCompleted);
        assert_eq!(state.phase, Phase::Work);
        assert_eq!(state.remaining_secs, 30);
        assert!(!state.active);
    }

    #[test]
    fn reset_forces_inactive_full_work_phase() {
        let mut state = FocusState::default();
        state.toggle();
        for _ in 0..100 {
            state.tick();
        }
        state.reset();

        assert_eq!(state.phase, Phase::Work);
        assert_eq!(state.remaining_secs, DEFAULT_WORK_SECS);
        assert!(!state.active);
    }

    #[test]
    fn inactive_ticks_are_no_ops() {
        let mut state = FocusState::default();
        for _ in 0..50 {
            assert_eq!(state.tick(), TickOutcome::Counting);
        }
        assert_eq!(state.remaining_secs, DEFAULT_WORK_SECS);
    }

    #[test]
    fn progress_tracks_elapsed_fraction() {
        let mut state = FocusState::new(100, 20);
        assert_eq!(state.progress(), 0.0);
        state.toggle();
        for _ in 0..25 {
            state.tick();
        }
        assert!((state.progress() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn status_label_follows_phase_and_activity() {
        let mut state = FocusState::default();
        assert_eq!(state.status_label(), "idle");
        state.toggle();
        assert_eq!(state.status_label(), "focusing");
        state.phase = Phase::Break;
        assert_eq!(state.status_label(), "break");
    }
}
