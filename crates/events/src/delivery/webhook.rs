//! Webhook delivery of state changes.
//!
//! [`WebhookNotifier`] POSTs the new snapshot as JSON to every configured
//! URL. Each request is bounded by the configured timeout; there is no
//! retry, the next state change simply delivers again.

use std::time::Duration;

use async_trait::async_trait;
use eir_core::Snapshot;

use crate::notifier::{NotifyError, Notifier, StateChange};

/// Delivers state changes to external webhook endpoints.
pub struct WebhookNotifier {
    client: reqwest::Client,
    urls: Vec<String>,
}

impl WebhookNotifier {
    /// Create a notifier whose requests time out after `timeout`.
    pub fn new(urls: Vec<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, urls })
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, url: &str, snapshot: &Snapshot) -> Result<(), NotifyError> {
        let response = self.client.post(url).json(snapshot).send().await?;
        if !response.status().is_success() {
            return Err(NotifyError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &'static str {
        "webhook"
    }

    /// POST to every URL; a failing URL does not stop the others.
    /// Returns the last error encountered, if any.
    async fn notify(&self, change: &StateChange) -> Result<(), NotifyError> {
        let mut last_err = None;

        for url in &self.urls {
            tracing::debug!(url, "Notifying webhook");
            match self.try_send(url, &change.current).await {
                Ok(()) => tracing::debug!(url, "Webhook notified"),
                Err(e) => {
                    tracing::error!(url, error = %e, "Webhook delivery failed");
                    last_err = Some(e);
                }
            }
        }

        match last_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
