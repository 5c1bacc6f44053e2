use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed work phase, credited with a fixed duration.
///
/// Sessions are created only by the timer when a work phase runs to
/// completion, and are never mutated afterwards. `date` is the local
/// calendar day in fixed-width `YYYY-MM-DD` form; week filtering relies
/// on that format (see [`crate::week`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub date: String,
}
