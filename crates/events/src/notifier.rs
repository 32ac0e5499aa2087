//! The notifier seam used by the watch loop.

use async_trait::async_trait;
use eir_core::{ProbeResult, Snapshot};

/// A global status transition observed by one watch loop cycle.
#[derive(Debug, Clone)]
pub struct StateChange {
    /// State persisted by the previous cycle.
    pub previous: Snapshot,
    /// State observed in this cycle.
    pub current: Snapshot,
    /// Probes whose status changed, with their current results.
    pub probe_diff: Vec<ProbeResult>,
}

impl StateChange {
    /// One-line human summary, e.g. `web-1 status changed from *OK* to *CRITICAL*`.
    pub fn summary(&self) -> String {
        format!(
            "{} status changed from *{}* to *{}*",
            self.current.hostname, self.previous.overall_status, self.current.overall_status
        )
    }
}

/// Error type for notification delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Remote returned HTTP {0}")]
    HttpStatus(u16),

    /// The Slack API accepted the request but reported a failure.
    #[error("Slack API error: {0}")]
    Slack(String),
}

/// External delivery of state changes (chat, webhooks).
///
/// Implementations must bound their own duration; the watch loop awaits
/// each notifier in turn.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    async fn notify(&self, change: &StateChange) -> Result<(), NotifyError>;
}
