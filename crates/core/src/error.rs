use std::path::PathBuf;

/// A probe result file whose first line is not a valid status literal.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProbeParseError {
    #[error("Invalid status {0:?}")]
    InvalidStatus(String),
}

/// The result directory itself could not be enumerated.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Could not list result directory {path}: {source}")]
    ListDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure persisting a snapshot to the state file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Could not serialize server state: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("Could not write state file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration problems. These are fatal at startup only.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No configuration file found (searched: {searched})")]
    NotFound { searched: String },

    #[error("Could not read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
