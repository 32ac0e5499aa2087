//! Aggregated host state for one poll cycle.
//!
//! A [`Snapshot`] is built from every probe result file in the result
//! directory. Its `overall_status` is always the fold of its probes'
//! statuses (see [`Status::fold`]).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::host;
use crate::probe::ProbeResult;
use crate::status::Status;

/// Everything the probes reported at one point in time.
///
/// Serialized field names match the state file and the status endpoint:
/// `Status`, `Hostname`, `Version`, `Details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Snapshot {
    #[serde(rename = "Status")]
    pub overall_status: Status,
    pub hostname: String,
    pub version: String,
    #[serde(rename = "Details", default)]
    pub probes: Vec<ProbeResult>,
}

impl Snapshot {
    /// An empty `UNKNOWN` snapshot.
    pub fn new(hostname: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            overall_status: Status::Unknown,
            hostname: hostname.into(),
            version: version.into(),
            probes: Vec::new(),
        }
    }

    /// An empty `UNKNOWN` snapshot stamped with this machine and daemon.
    pub fn for_this_host() -> Self {
        Self::new(host::hostname(), host::VERSION)
    }

    /// Add one probe result.
    ///
    /// A result whose name is already present replaces the earlier entry in
    /// place (last write wins) and the overall status is re-folded over the
    /// surviving probes, so a replaced result no longer counts.
    pub fn record(&mut self, result: ProbeResult) {
        match self.probes.iter_mut().find(|p| p.name == result.name) {
            Some(existing) => {
                tracing::warn!(
                    probe = %result.name,
                    "Duplicate probe name, keeping the latest result"
                );
                *existing = result;
                self.overall_status = Status::fold(self.probes.iter().map(|p| p.status));
            }
            None => {
                self.overall_status = self.overall_status.combine(result.status);
                self.probes.push(result);
            }
        }
    }

    /// Whether the overall status differs from `other`'s.
    ///
    /// This is the only comparison that decides a global transition;
    /// per-probe changes are found by [`Snapshot::probe_diff`].
    pub fn status_changed(&self, other: &Snapshot) -> bool {
        self.overall_status != other.overall_status
    }

    /// Look up a probe by name.
    pub fn probe(&self, name: &str) -> Option<&ProbeResult> {
        self.probes.iter().find(|p| p.name == name)
    }

    /// Build a snapshot from every file in `dir`.
    ///
    /// Files are visited in name order so `probes` displays stably; the
    /// overall status does not depend on it. Unreadable files and files
    /// with an invalid status line are logged and skipped. Only a failure
    /// to list `dir` itself is returned as an error.
    pub fn from_directory(
        dir: &Path,
        hostname: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, SnapshotError> {
        let list_err = |source| SnapshotError::ListDirectory {
            path: dir.to_path_buf(),
            source,
        };

        let mut entries = std::fs::read_dir(dir)
            .map_err(list_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(list_err)?;
        entries.sort_by_key(|entry| entry.file_name());

        let mut snapshot = Self::new(hostname, version);
        tracing::info!(dir = %dir.display(), files = entries.len(), "Loading probe results");

        for entry in entries {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            tracing::debug!(file = %path.display(), "Reading probe result");

            if path.is_dir() {
                tracing::debug!(file = %path.display(), "Skipping directory in result dir");
                continue;
            }

            let raw = match std::fs::read(&path) {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::error!(file = %path.display(), error = %e, "Could not read probe result");
                    continue;
                }
            };

            match ProbeResult::parse(name, &raw) {
                Ok(result) => snapshot.record(result),
                Err(e) => {
                    tracing::warn!(
                        file = %path.display(),
                        error = %e,
                        "Discarding probe result with invalid status"
                    );
                }
            }
        }

        Ok(snapshot)
    }
}
