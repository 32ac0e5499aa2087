//! Persistence of the last observed snapshot.
//!
//! The state file lets the daemon compare each cycle with the previous one
//! across restarts. A missing or corrupt file is not an error: it simply
//! means there is no baseline yet.

use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::snapshot::Snapshot;

/// Reads and writes the YAML state file.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted snapshot.
    ///
    /// Falls back to an empty `UNKNOWN` snapshot for this host when the
    /// file is absent, unreadable or cannot be parsed.
    pub fn load(&self) -> Snapshot {
        let buffer = match std::fs::read(&self.path) {
            Ok(buffer) => buffer,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No previous state file");
                return Snapshot::for_this_host();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Could not read state file");
                return Snapshot::for_this_host();
            }
        };

        match serde_yaml::from_slice::<Snapshot>(&buffer) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Could not parse state file");
                Snapshot::for_this_host()
            }
        }
    }

    /// Persist `snapshot`, replacing the previous file.
    ///
    /// The content is written to a sibling temporary file which is then
    /// renamed over the target, so concurrent readers never observe a
    /// partially written file.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let buffer = serde_yaml::to_string(snapshot)?;
        let tmp = self.tmp_path();

        if let Err(source) = write_restricted(&tmp, buffer.as_bytes()) {
            let _ = std::fs::remove_file(&tmp);
            return Err(StoreError::Write { path: tmp, source });
        }

        std::fs::rename(&tmp, &self.path).map_err(|source| {
            let _ = std::fs::remove_file(&tmp);
            StoreError::Write {
                path: self.path.clone(),
                source,
            }
        })
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "status.yml".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Write with mode 0640 on Unix.
fn write_restricted(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o640);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}
