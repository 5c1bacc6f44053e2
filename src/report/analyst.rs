use std::{future::Future, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use reqwest::Client;

use crate::{models::WeeklyReport, settings::SettingsStore};

/// The external analysis collaborator: takes a frozen weekly report and
/// returns mentor-style feedback text. May fail; the submission pipeline
/// stores the report either way.
pub trait Analyst: Send + Sync {
    fn analyze(&self, report: &WeeklyReport) -> impl Future<Output = Result<String>> + Send;
}

/// Posts the report to the configured analysis endpoint and returns the
/// response body as the feedback text.
pub struct HttpAnalyst {
    client: Client,
    settings: Arc<SettingsStore>,
}

impl HttpAnalyst {
    pub fn new(settings: Arc<SettingsStore>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            settings,
        }
    }
}

impl Analyst for HttpAnalyst {
    async fn analyze(&self, report: &WeeklyReport) -> Result<String> {
        let Some(url) = self.settings.analysis_url() else {
            bail!("analysis endpoint not configured");
        };

        let response = self
            .client
            .post(&url)
            .json(report)
            .send()
            .await
            .context("failed to reach analysis endpoint")?;

        let feedback = response
            .error_for_status()
            .context("analysis endpoint returned an error")?
            .text()
            .await
            .context("failed to read analysis response")?;

        if feedback.trim().is_empty() {
            bail!("analysis endpoint returned empty feedback");
        }
        Ok(feedback)
    }
}
