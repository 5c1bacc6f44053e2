use serde::{Deserialize, Serialize};

/// One row of the group roster.
///
/// Ephemeral: the self entry is recomputed on every reconciliation pass
/// and peer entries come verbatim from the remote ledger. The roster
/// snapshot is replaced wholesale each sync, never kept as history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub user_name: String,
    pub total_hours: f64,
    pub completion_rate: u8,
    /// "focusing", "break" or "idle" for self; free text for peers.
    pub status: String,
    pub last_update: String,
}
