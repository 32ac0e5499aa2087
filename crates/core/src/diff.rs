//! Per-probe comparison between two snapshots.

use crate::probe::ProbeResult;
use crate::snapshot::Snapshot;

impl Snapshot {
    /// Probes whose status changed between `self` (the previous cycle) and
    /// `current`.
    ///
    /// Only probes present by name in both snapshots are compared; the
    /// returned entries are the *current* results, in the previous
    /// snapshot's order. Probes that appeared or disappeared since the
    /// previous cycle are not reported.
    pub fn probe_diff(&self, current: &Snapshot) -> Vec<ProbeResult> {
        self.probes
            .iter()
            .filter_map(|old| {
                current
                    .probe(&old.name)
                    .filter(|new| new.status != old.status)
                    .cloned()
            })
            .collect()
    }
}
