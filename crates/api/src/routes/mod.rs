//! HTTP routes of the status server.

pub mod health;
pub mod status;
