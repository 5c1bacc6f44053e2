use serde::{Deserialize, Serialize};

/// A free-text note for one study day, with an optional shortfall note.
///
/// More than one log per date is allowed; all of them are kept. The whole
/// collection is cleared when a weekly report is submitted, and entries
/// from a prior week are dropped at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    pub id: String,
    pub date: String,
    pub content: String,
    pub gap: Option<String>,
}

impl DailyLog {
    /// The gap text, if it is present and non-empty.
    pub fn gap_text(&self) -> Option<&str> {
        self.gap.as_deref().filter(|g| !g.trim().is_empty())
    }
}
