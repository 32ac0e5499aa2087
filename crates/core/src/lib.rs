//! Core domain logic for the Eir health aggregation daemon.
//!
//! Pure data types and file-level operations: probe parsing, status
//! aggregation, snapshots and their diff, state persistence, action
//! tables and configuration. No async runtime is required here; the
//! `eir-agent` crate drives these pieces from its watch loop.

pub mod action;
pub mod config;
pub mod diff;
pub mod error;
pub mod host;
pub mod probe;
pub mod snapshot;
pub mod status;
pub mod store;

pub use action::{ActionTable, Actions, Command};
pub use config::EirConfig;
pub use probe::ProbeResult;
pub use snapshot::Snapshot;
pub use status::Status;
pub use store::StateStore;
