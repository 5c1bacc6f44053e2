use std::{sync::Arc, time::Duration};

use anyhow::Result;
use chrono::Utc;
use log::error;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time,
};
use uuid::Uuid;

use crate::{db::Database, log_info, models::Session, week};

use super::{FocusState, TickOutcome, TimerEvent};

const ENABLE_LOGS: bool = false;

/// Owns the focus timer state and drives it with a once-per-second ticker
/// task. The ticker applies each tick inline before awaiting the next
/// interval slot, so an expiring phase can never be double-counted by a
/// tick that raced the transition. Pausing or resetting aborts the task,
/// which deterministically halts future ticks.
#[derive(Clone)]
pub struct TimerController {
    state: Arc<Mutex<FocusState>>,
    db: Database,
    events: broadcast::Sender<TimerEvent>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
}

impl TimerController {
    pub fn new(
        db: Database,
        events: broadcast::Sender<TimerEvent>,
        work_secs: u32,
        break_secs: u32,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(FocusState::new(work_secs, break_secs))),
            db,
            events,
            ticker: Arc::new(Mutex::new(None)),
            tick_interval: Duration::from_secs(1),
        }
    }

    /// Overrides the tick interval. Intended for tests that drive the
    /// controller against a paused tokio clock.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub async fn snapshot(&self) -> FocusState {
        self.state.lock().await.clone()
    }

    /// Start or pause the countdown without resetting remaining time.
    pub async fn toggle(&self) -> Result<FocusState> {
        let snapshot = {
            let mut guard = self.state.lock().await;
            guard.toggle();
            guard.clone()
        };

        if snapshot.active {
            self.spawn_ticker().await;
        } else {
            self.cancel_ticker().await;
        }

        let _ = self.events.send(TimerEvent::StateChanged(snapshot.clone()));
        Ok(snapshot)
    }

    /// Force a full, inactive work phase. The ticker is aborted before the
    /// state changes so a stale tick cannot land after the reset.
    pub async fn reset(&self) -> Result<FocusState> {
        self.cancel_ticker().await;

        let snapshot = {
            let mut guard = self.state.lock().await;
            guard.reset();
            guard.clone()
        };

        let _ = self.events.send(TimerEvent::StateChanged(snapshot.clone()));
        Ok(snapshot)
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let db = self.db.clone();
        let events = self.events.clone();
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            // The first interval slot resolves immediately; skip it so the
            // first real tick lands one full interval after start.
            interval.tick().await;

            loop {
                interval.tick().await;

                let (outcome, snapshot) = {
                    let mut guard = state.lock().await;
                    if !guard.active {
                        break;
                    }
                    let outcome = guard.tick();
                    (outcome, guard.clone())
                };

                match outcome {
                    TickOutcome::Counting => {
                        let _ = events.send(TimerEvent::StateChanged(snapshot));
                    }
                    TickOutcome::WorkCompleted { duration_minutes } => {
                        log_info!("work phase complete, crediting {duration_minutes} min");
                        let session = build_session(duration_minutes);
                        if let Err(err) = db.insert_session(&session).await {
                            error!("failed to persist completed session: {err:#}");
                        }
                        let _ = events.send(TimerEvent::StateChanged(snapshot));
                        let _ = events.send(TimerEvent::SessionCompleted(session));
                        break;
                    }
                    TickOutcome::BreakCompleted => {
                        log_info!("break phase complete");
                        let _ = events.send(TimerEvent::StateChanged(snapshot));
                        break;
                    }
                }
            }
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }
}

/// A freshly completed session, stamped with the local calendar day.
/// `started_at` is derived from the credited duration rather than the
/// literal wall clock, so pauses do not stretch the record.
fn build_session(duration_minutes: u32) -> Session {
    let ended_at = Utc::now();
    Session {
        id: Uuid::new_v4().to_string(),
        started_at: ended_at - chrono::Duration::minutes(i64::from(duration_minutes)),
        ended_at,
        duration_minutes,
        date: week::today(),
    }
}
