//! Fire-and-forget dispatch of action tables.
//!
//! [`Dispatcher::dispatch`] picks the commands configured for a status and
//! hands each one to a [`TaskSpawner`] as an independent task. Nothing is
//! awaited: the watch loop moves on immediately and each task reports its
//! [`CommandOutcome`] to an [`OutcomeSink`] when it finishes.

use std::sync::Arc;

use eir_core::{ActionTable, Status};
use futures::future::BoxFuture;
use tokio::sync::mpsc;

use crate::executor::{self, CommandOutcome};

/// Runs dispatched command tasks.
pub trait TaskSpawner: Send + Sync {
    fn spawn(&self, task: BoxFuture<'static, ()>);
}

/// Detached tasks on the current tokio runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSpawner;

impl TaskSpawner for TokioSpawner {
    fn spawn(&self, task: BoxFuture<'static, ()>) {
        tokio::spawn(task);
    }
}

/// The result of one dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReport {
    /// `"global"` or the probe name the action table belongs to.
    pub scope: String,
    pub command_line: String,
    pub outcome: CommandOutcome,
}

/// Receives every [`CommandReport`].
pub trait OutcomeSink: Send + Sync {
    fn record(&self, report: CommandReport);
}

/// Logs reports; the default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl OutcomeSink for LogSink {
    fn record(&self, report: CommandReport) {
        tracing::debug!(
            scope = %report.scope,
            command = %report.command_line,
            outcome = %report.outcome,
            "Action finished"
        );
    }
}

impl OutcomeSink for mpsc::UnboundedSender<CommandReport> {
    fn record(&self, report: CommandReport) {
        // A dropped receiver just means nobody is listening any more.
        let _ = self.send(report);
    }
}

/// Launches the commands of an action table.
#[derive(Clone)]
pub struct Dispatcher {
    spawner: Arc<dyn TaskSpawner>,
    sink: Arc<dyn OutcomeSink>,
    dry_run: bool,
}

impl Dispatcher {
    /// Tokio tasks, logging sink.
    pub fn new(dry_run: bool) -> Self {
        Self {
            spawner: Arc::new(TokioSpawner),
            sink: Arc::new(LogSink),
            dry_run,
        }
    }

    pub fn with_spawner(mut self, spawner: Arc<dyn TaskSpawner>) -> Self {
        self.spawner = spawner;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn OutcomeSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Spawn one task per command configured for `status` in `table`.
    ///
    /// Returns the number of tasks spawned. Does not wait for any of them.
    pub fn dispatch(&self, scope: &str, status: Status, table: &ActionTable) -> usize {
        let commands = table.commands_for(status);
        if commands.is_empty() {
            tracing::debug!(scope, %status, "No actions configured");
            return 0;
        }

        tracing::info!(scope, %status, count = commands.len(), "Dispatching actions");

        for command in commands {
            let command = command.clone();
            let scope = scope.to_string();
            let sink = Arc::clone(&self.sink);
            let dry_run = self.dry_run;

            self.spawner.spawn(Box::pin(async move {
                let outcome = executor::run(&command, dry_run).await;
                sink.record(CommandReport {
                    scope,
                    command_line: command.command_line,
                    outcome,
                });
            }));
        }

        commands.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    use assert_matches::assert_matches;
    use eir_core::Command;

    use super::*;

    /// Holds spawned tasks until the test runs them.
    #[derive(Default)]
    struct ManualSpawner {
        tasks: Mutex<Vec<BoxFuture<'static, ()>>>,
    }

    impl ManualSpawner {
        fn pending(&self) -> usize {
            self.tasks.lock().unwrap().len()
        }

        async fn run_all(&self) {
            let tasks = std::mem::take(&mut *self.tasks.lock().unwrap());
            futures::future::join_all(tasks).await;
        }
    }

    impl TaskSpawner for ManualSpawner {
        fn spawn(&self, task: BoxFuture<'static, ()>) {
            self.tasks.lock().unwrap().push(task);
        }
    }

    fn table() -> ActionTable {
        ActionTable {
            on_ok: vec![Command::new("echo ok", 0)],
            on_critical: vec![
                Command::new("echo restart", 0),
                Command::new("echo page", 0),
            ],
            ..ActionTable::default()
        }
    }

    async fn recv(rx: &mut mpsc::UnboundedReceiver<CommandReport>) -> CommandReport {
        tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("report in time")
            .expect("channel open")
    }

    #[tokio::test]
    async fn dispatch_selects_commands_for_status() {
        let spawner = Arc::new(ManualSpawner::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::new(true)
            .with_spawner(spawner.clone())
            .with_sink(Arc::new(tx));

        assert_eq!(dispatcher.dispatch("postfix", Status::Critical, &table()), 2);
        assert_eq!(dispatcher.dispatch("postfix", Status::Warning, &table()), 0);
        assert_eq!(spawner.pending(), 2);

        // Nothing has run yet: dispatch does not wait.
        assert!(rx.try_recv().is_err());

        spawner.run_all().await;
        let mut lines = vec![recv(&mut rx).await, recv(&mut rx).await];
        lines.sort_by(|a, b| a.command_line.cmp(&b.command_line));

        assert_eq!(lines[0].scope, "postfix");
        assert_eq!(lines[0].command_line, "echo page");
        assert_eq!(lines[1].command_line, "echo restart");
        assert!(lines.iter().all(|r| r.outcome == CommandOutcome::DryRun));
    }

    #[tokio::test]
    async fn dry_run_never_executes() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let table = ActionTable {
            on_unknown: vec![Command::new(format!("touch {}", marker.display()), 5)],
            ..ActionTable::default()
        };
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::new(true).with_sink(Arc::new(tx));

        assert_eq!(dispatcher.dispatch("global", Status::Unknown, &table), 1);
        assert_eq!(recv(&mut rx).await.outcome, CommandOutcome::DryRun);
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn commands_run_concurrently() {
        let table = ActionTable {
            on_warning: vec![Command::new("sleep 1", 5), Command::new("sleep 1", 5)],
            ..ActionTable::default()
        };
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::new(false).with_sink(Arc::new(tx));

        let start = Instant::now();
        assert_eq!(dispatcher.dispatch("global", Status::Warning, &table), 2);
        assert!(start.elapsed() < Duration::from_millis(500), "dispatch blocked");

        assert_matches!(recv(&mut rx).await.outcome, CommandOutcome::Succeeded { .. });
        assert_matches!(recv(&mut rx).await.outcome, CommandOutcome::Succeeded { .. });
        assert!(start.elapsed() < Duration::from_millis(1900), "commands ran sequentially");
    }

    #[tokio::test]
    async fn failures_are_reported_not_raised() {
        let table = ActionTable {
            on_ok: vec![Command::new("exit 3", 5)],
            ..ActionTable::default()
        };
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::new(false).with_sink(Arc::new(tx));

        dispatcher.dispatch("disk", Status::Ok, &table);
        let report = recv(&mut rx).await;
        assert_eq!(report.scope, "disk");
        assert_matches!(report.outcome, CommandOutcome::Failed { exit_code: 3, .. });
    }
}
