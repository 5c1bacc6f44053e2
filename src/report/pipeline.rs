use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{bail, Result};
use chrono::Utc;
use log::warn;
use uuid::Uuid;

use crate::{aggregate, db::Database, models::WeeklyReport, settings::SettingsStore, week};

use super::Analyst;

/// The user-edited half of the weekly report form. Everything derivable
/// (hours, progress text, gap reasons, week start) is computed by the
/// pipeline at submission time so it can never be a stale form snapshot.
#[derive(Debug, Clone, Default)]
pub struct ReportDraft {
    pub completion_rate: u8,
    pub unfamiliar_concepts: String,
    pub attempted_solutions: String,
    pub next_week_strategy: String,
    pub needs_support: bool,
    pub support_detail: String,
}

/// Freezes the week into an immutable report, hands it to the analysis
/// collaborator, stores it, and rotates local state into a fresh
/// reporting cycle.
pub struct ReportPipeline<A> {
    db: Database,
    settings: Arc<SettingsStore>,
    analyst: A,
    in_flight: AtomicBool,
}

impl<A: Analyst> ReportPipeline<A> {
    pub fn new(db: Database, settings: Arc<SettingsStore>, analyst: A) -> Self {
        Self {
            db,
            settings,
            analyst,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Submits the current week. At most one submission runs at a time; a
    /// second call while one is in flight is rejected, so a double click
    /// cannot produce duplicate reports.
    pub async fn submit(&self, draft: ReportDraft) -> Result<WeeklyReport> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            bail!("a report submission is already in flight");
        }

        let result = self.submit_inner(draft).await;
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn submit_inner(&self, draft: ReportDraft) -> Result<WeeklyReport> {
        let Some(user_name) = self.settings.user_name() else {
            bail!("display name must be set before submitting a report");
        };

        let week_start = week::current_week_start();

        // Re-read the live collections now; the form may have been open
        // while more sessions and logs arrived.
        let sessions = self.db.list_sessions().await?;
        let total_hours = aggregate::week_hours(&sessions, &week_start);

        let logs = aggregate::week_logs(&self.db.list_daily_logs().await?, &week_start);

        let mut report = WeeklyReport {
            id: Uuid::new_v4().to_string(),
            user_name,
            week_start,
            total_hours,
            planned_progress: self.settings.weekly_plan(),
            actual_progress: aggregate::progress_summary(&logs),
            completion_rate: draft.completion_rate.min(100),
            gap_reason: aggregate::gap_summary(&logs),
            unfamiliar_concepts: draft.unfamiliar_concepts,
            attempted_solutions: draft.attempted_solutions,
            next_week_strategy: draft.next_week_strategy,
            needs_support: draft.needs_support,
            support_detail: draft.support_detail,
            ai_feedback: None,
            created_at: Utc::now(),
        };

        // The report is stored whether or not analysis succeeds; a missing
        // feedback field is the only trace of a failed call.
        match self.analyst.analyze(&report).await {
            Ok(feedback) => report.ai_feedback = Some(feedback),
            Err(err) => warn!("analysis call failed, storing report without feedback: {err:#}"),
        }

        self.db.insert_report(&report).await?;

        // Rotate into a new reporting cycle. The session ledger is
        // untouched; only the logs and the active plan are cleared.
        self.db.clear_daily_logs().await?;
        self.settings.clear_weekly_plan()?;

        Ok(report)
    }
}
