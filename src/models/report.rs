use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A frozen end-of-week self report.
///
/// `actual_progress` and `gap_reason` are auto-populated from the daily
/// logs at submission time; `total_hours` is taken from the weekly
/// aggregator at the same moment. Reports are immutable once stored and
/// listed most-recent-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    pub id: String,
    pub user_name: String,
    /// Monday of the reporting week, `YYYY-MM-DD`.
    pub week_start: String,
    pub total_hours: f64,
    pub planned_progress: String,
    pub actual_progress: String,
    /// Always within [0, 100].
    pub completion_rate: u8,
    pub gap_reason: String,
    pub unfamiliar_concepts: String,
    pub attempted_solutions: String,
    pub next_week_strategy: String,
    pub needs_support: bool,
    pub support_detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}
