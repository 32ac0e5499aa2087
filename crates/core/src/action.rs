//! Remediation commands configured per status transition.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::status::Status;

/// Applied when a command is configured without a timeout (or with `0`).
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// A shell command line with its wall-clock limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    #[serde(rename = "Command")]
    pub command_line: String,
    /// Seconds; `0` means [`DEFAULT_COMMAND_TIMEOUT`].
    #[serde(rename = "Timeout", default)]
    pub timeout_secs: u64,
}

impl Command {
    pub fn new(command_line: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            command_line: command_line.into(),
            timeout_secs,
        }
    }

    pub fn timeout(&self) -> Duration {
        if self.timeout_secs == 0 {
            DEFAULT_COMMAND_TIMEOUT
        } else {
            Duration::from_secs(self.timeout_secs)
        }
    }
}

/// Commands to run when a scope newly reaches each status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ActionTable {
    pub on_ok: Vec<Command>,
    pub on_warning: Vec<Command>,
    pub on_critical: Vec<Command>,
    pub on_unknown: Vec<Command>,
}

impl ActionTable {
    pub fn commands_for(&self, status: Status) -> &[Command] {
        match status {
            Status::Ok => &self.on_ok,
            Status::Warning => &self.on_warning,
            Status::Critical => &self.on_critical,
            Status::Unknown => &self.on_unknown,
        }
    }

    pub fn is_empty(&self) -> bool {
        Status::ALL
            .iter()
            .all(|status| self.commands_for(*status).is_empty())
    }

    /// Every configured command, in status order.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        Status::ALL
            .into_iter()
            .flat_map(move |status| self.commands_for(status).iter())
    }
}

/// The global action table plus one table per probe name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Actions {
    pub global: ActionTable,
    pub probes: HashMap<String, ActionTable>,
}

impl Actions {
    pub fn for_probe(&self, name: &str) -> Option<&ActionTable> {
        self.probes.get(name)
    }
}
