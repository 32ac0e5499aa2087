//! External delivery channels for state-change notifications.
//!
//! This module provides the Slack and webhook notifiers the watch loop
//! calls when the host's overall status changes.

pub mod slack;
pub mod webhook;

pub use slack::SlackNotifier;
pub use webhook::WebhookNotifier;
