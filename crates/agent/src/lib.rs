//! `eir-agent` library crate.
//!
//! The watch loop and the command machinery it drives. The `eir` binary
//! entrypoint lives in `main.rs`; the modules are public for integration
//! testing and embedding.

pub mod cli;
pub mod dispatcher;
pub mod executor;
pub mod watcher;
