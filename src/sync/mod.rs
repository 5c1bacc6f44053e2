pub mod ledger;
pub mod reconcile;

pub use ledger::{GroupLedger, HttpLedger};
pub use reconcile::{merge_roster, Reconciler};
