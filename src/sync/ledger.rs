use std::{future::Future, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use reqwest::Client;

use crate::{models::MemberSummary, settings::SettingsStore};

/// The shared external bulletin board: publish overwrites this member's
/// row (last write wins), fetch returns whatever the board currently
/// holds. No transactional guarantees; a fetch may race a concurrent
/// publish from another member.
pub trait GroupLedger: Send + Sync {
    fn publish(&self, summary: &MemberSummary) -> impl Future<Output = Result<()>> + Send;
    fn fetch(&self) -> impl Future<Output = Result<Vec<MemberSummary>>> + Send;
}

/// Talks JSON to the configured ledger endpoint. While no endpoint is
/// configured, publish is a no-op and fetch reports no peers, so the
/// dashboard degrades to a self-only roster instead of erroring.
pub struct HttpLedger {
    client: Client,
    settings: Arc<SettingsStore>,
}

impl HttpLedger {
    pub fn new(settings: Arc<SettingsStore>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            settings,
        }
    }
}

impl GroupLedger for HttpLedger {
    async fn publish(&self, summary: &MemberSummary) -> Result<()> {
        let Some(url) = self.settings.ledger_url() else {
            return Ok(());
        };

        self.client
            .post(&url)
            .json(summary)
            .send()
            .await
            .context("failed to publish member summary")?;
        Ok(())
    }

    async fn fetch(&self) -> Result<Vec<MemberSummary>> {
        let Some(url) = self.settings.ledger_url() else {
            return Ok(Vec::new());
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("failed to fetch group roster")?;

        response
            .json::<Vec<MemberSummary>>()
            .await
            .context("malformed roster payload")
    }
}
