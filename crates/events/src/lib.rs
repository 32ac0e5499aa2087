//! Notification of host state changes.
//!
//! [`Notifier`] is the seam between the watch loop and external delivery;
//! [`delivery`] holds the Slack and webhook implementations.

pub mod delivery;
pub mod notifier;

pub use notifier::{NotifyError, Notifier, StateChange};
