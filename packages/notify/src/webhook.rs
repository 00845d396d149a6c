//! Webhook notifier.

use crate::{NotifyError, Notifier, ReportSummary};

/// Posts report summaries as JSON to a fixed URL.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    /// Creates a notifier posting to `url`.
    #[must_use]
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, summary: &ReportSummary) -> Result<(), NotifyError> {
        log::debug!("POST {}", self.url);
        self.client
            .post(&self.url)
            .json(summary)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
