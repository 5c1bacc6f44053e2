use std::cmp::Ordering;
use std::collections::HashSet;

use log::warn;
use tokio::sync::RwLock;

use crate::models::MemberSummary;

use super::GroupLedger;

/// Merges the locally computed self summary with remotely fetched peers.
///
/// Self is always locally authoritative: a remote row with the same name
/// is discarded rather than trusted. Peers are deduplicated by name,
/// first occurrence wins. The result is sorted descending by total hours
/// with a stable sort, so equal values keep a fixed relative order
/// within one snapshot.
pub fn merge_roster(me: MemberSummary, peers: Vec<MemberSummary>) -> Vec<MemberSummary> {
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(me.user_name.clone());

    let mut roster = vec![me];
    for peer in peers {
        if seen.insert(peer.user_name.clone()) {
            roster.push(peer);
        }
    }

    roster.sort_by(|a, b| {
        b.total_hours
            .partial_cmp(&a.total_hours)
            .unwrap_or(Ordering::Equal)
    });
    roster
}

/// Runs the publish-then-fetch reconciliation cycle and owns the single
/// roster snapshot, which is replaced wholesale on every pass.
pub struct Reconciler<L> {
    ledger: L,
    roster: RwLock<Vec<MemberSummary>>,
}

impl<L: GroupLedger> Reconciler<L> {
    pub fn new(ledger: L) -> Self {
        Self {
            ledger,
            roster: RwLock::new(Vec::new()),
        }
    }

    /// One reconciliation pass. Publish failures are logged and do not
    /// block the fetch; fetch failures degrade to a self-only roster.
    pub async fn sync(&self, me: MemberSummary) -> Vec<MemberSummary> {
        if let Err(err) = self.ledger.publish(&me).await {
            warn!("ledger publish failed (continuing): {err:#}");
        }

        let peers = match self.ledger.fetch().await {
            Ok(peers) => peers,
            Err(err) => {
                warn!("ledger fetch failed, falling back to self-only roster: {err:#}");
                Vec::new()
            }
        };

        let merged = merge_roster(me, peers);
        *self.roster.write().await = merged.clone();
        merged
    }

    /// The roster from the most recent pass (empty before the first one).
    pub async fn roster(&self) -> Vec<MemberSummary> {
        self.roster.read().await.clone()
    }
}
