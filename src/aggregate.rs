//! Weekly aggregation over the session ledger and daily logs.
//!
//! Everything here is recomputed on demand from the current collections;
//! nothing is cached, so a fresh session append is reflected immediately.

use crate::models::{DailyLog, Session, WeeklyReport};
use crate::week;

/// Total focus hours for the week opened by `week_start`.
pub fn week_hours(sessions: &[Session], week_start: &str) -> f64 {
    let minutes: u64 = sessions
        .iter()
        .filter(|s| week::in_week(&s.date, week_start))
        .map(|s| u64::from(s.duration_minutes))
        .sum();
    minutes as f64 / 60.0
}

/// The daily logs belonging to the week opened by `week_start`.
pub fn week_logs(logs: &[DailyLog], week_start: &str) -> Vec<DailyLog> {
    logs.iter()
        .filter(|l| week::in_week(&l.date, week_start))
        .cloned()
        .collect()
}

/// Joins this week's logs into the frozen `actual_progress` text.
pub fn progress_summary(logs: &[DailyLog]) -> String {
    logs.iter()
        .map(|l| format!("[{}] {}", l.date, l.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Joins the non-empty gap notes into the frozen `gap_reason` text.
pub fn gap_summary(logs: &[DailyLog]) -> String {
    logs.iter()
        .filter_map(|l| l.gap_text().map(|g| format!("[{}] {}", l.date, g)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Completion rate for the roster self entry: the latest report's rate
/// when one exists, otherwise a rough estimate from the log count.
///
/// TODO: the `count * 15` estimate is a placeholder policy carried over
/// from the original behavior; pick a grounded heuristic.
pub fn roster_completion_rate(reports: &[WeeklyReport], log_count: usize) -> u8 {
    match reports.first() {
        Some(report) => report.completion_rate.min(100),
        None => (log_count.saturating_mul(15)).min(100) as u8,
    }
}
