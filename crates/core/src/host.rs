//! Identity of the machine and daemon recorded in every snapshot.

/// Recorded when the host name cannot be determined.
pub const UNKNOWN_HOSTNAME: &str = "Unknown hostname";

/// Daemon version recorded in snapshots.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The machine's host name, or [`UNKNOWN_HOSTNAME`].
pub fn hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| {
            tracing::warn!("Could not determine host name");
            UNKNOWN_HOSTNAME.to_string()
        })
}
