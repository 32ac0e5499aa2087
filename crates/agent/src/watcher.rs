//! The watch loop.
//!
//! Every cycle reads the probe results, compares them with the state saved
//! by the previous cycle and, when the overall status moved, dispatches the
//! configured actions and notifies. The new state is then saved and the
//! loop sleeps for `WatchInterval`. No error stops the loop; only
//! cancellation does.

use std::sync::Arc;

use eir_core::host::{self, VERSION};
use eir_core::{EirConfig, ProbeResult, Snapshot, StateStore};
use eir_events::delivery::{SlackNotifier, WebhookNotifier};
use eir_events::{NotifyError, Notifier, StateChange};
use tokio_util::sync::CancellationToken;

use crate::dispatcher::Dispatcher;

/// Scope name used for the global action table.
pub const GLOBAL_SCOPE: &str = "global";

/// What one cycle observed and did.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub previous: Snapshot,
    pub current: Snapshot,
    /// Probes whose status changed; empty when the overall status did not.
    pub changed_probes: Vec<ProbeResult>,
    /// Command tasks spawned during this cycle.
    pub dispatched: usize,
}

impl CycleReport {
    pub fn status_changed(&self) -> bool {
        self.previous.status_changed(&self.current)
    }
}

pub struct Watcher {
    config: Arc<EirConfig>,
    store: StateStore,
    dispatcher: Dispatcher,
    notifiers: Vec<Box<dyn Notifier>>,
    hostname: String,
}

impl Watcher {
    /// A watcher without notifiers, reporting under this host's name.
    pub fn new(config: Arc<EirConfig>, dispatcher: Dispatcher) -> Self {
        let store = StateStore::new(config.status_file.clone());
        Self {
            config,
            store,
            dispatcher,
            notifiers: Vec::new(),
            hostname: host::hostname(),
        }
    }

    /// Build the watcher `eir run` uses: Slack and webhook notifiers as
    /// configured, commands on tokio tasks.
    pub fn from_config(config: Arc<EirConfig>) -> Result<Self, NotifyError> {
        let dispatcher = Dispatcher::new(config.dry_run);
        let mut watcher = Self::new(Arc::clone(&config), dispatcher);

        if config.slack_enabled() {
            watcher = watcher.with_notifier(Box::new(SlackNotifier::new(
                config.slack_token.clone(),
                config.slack_channel.clone(),
                config.notify_timeout(),
            )?));
        }
        if !config.web_hooks.is_empty() {
            watcher = watcher.with_notifier(Box::new(WebhookNotifier::new(
                config.web_hooks.clone(),
                config.notify_timeout(),
            )?));
        }

        Ok(watcher)
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Run cycles until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        let interval = self.config.watch_interval();
        tracing::info!(
            result_dir = %self.config.result_dir.display(),
            status_file = %self.store.path().display(),
            interval_secs = interval.as_secs(),
            notifiers = self.notifiers.len(),
            "Starting watch loop"
        );

        loop {
            self.run_cycle().await;

            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Watch loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }

    /// One poll, compare, act and persist pass.
    pub async fn run_cycle(&self) -> CycleReport {
        let previous = self.store.load();
        let current = self.observe();

        let mut report = CycleReport {
            previous,
            current,
            changed_probes: Vec::new(),
            dispatched: 0,
        };

        if !report.status_changed() {
            tracing::debug!(status = %report.current.overall_status, "Status unchanged");
        } else {
            tracing::info!(
                from = %report.previous.overall_status,
                to = %report.current.overall_status,
                "Status changed"
            );
            report.changed_probes = report.previous.probe_diff(&report.current);
            report.dispatched = self.act(&report.changed_probes, &report.current);
            self.notify(&report).await;
        }

        if let Err(e) = self.store.save(&report.current) {
            tracing::error!(
                file = %self.store.path().display(),
                error = %e,
                "Could not save state"
            );
        }

        report
    }

    /// Snapshot of the result directory, `UNKNOWN` when it cannot be read.
    fn observe(&self) -> Snapshot {
        match Snapshot::from_directory(&self.config.result_dir, self.hostname.as_str(), VERSION) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(error = %e, "Could not read probe results");
                Snapshot::new(self.hostname.as_str(), VERSION)
            }
        }
    }

    /// Per-probe tables first, then the global table.
    fn act(&self, changed: &[ProbeResult], current: &Snapshot) -> usize {
        let actions = &self.config.actions;
        let mut dispatched = 0;

        for probe in changed {
            if let Some(table) = actions.for_probe(&probe.name) {
                dispatched += self.dispatcher.dispatch(&probe.name, probe.status, table);
            }
        }
        dispatched += self
            .dispatcher
            .dispatch(GLOBAL_SCOPE, current.overall_status, &actions.global);

        dispatched
    }

    async fn notify(&self, report: &CycleReport) {
        if self.notifiers.is_empty() {
            return;
        }

        let change = StateChange {
            previous: report.previous.clone(),
            current: report.current.clone(),
            probe_diff: report.changed_probes.clone(),
        };

        for notifier in &self.notifiers {
            match notifier.notify(&change).await {
                Ok(()) => tracing::debug!(notifier = notifier.name(), "Notification sent"),
                Err(e) => tracing::error!(
                    notifier = notifier.name(),
                    error = %e,
                    "Notification failed"
                ),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
