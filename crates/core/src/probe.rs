//! Probe result files.
//!
//! A probe writes one plain-text file per check: the first line is the
//! status literal, anything after it is free-text detail. The file's base
//! name identifies the probe.

use serde::{Deserialize, Serialize};

use crate::error::ProbeParseError;
use crate::status::Status;

/// One probe's reported result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProbeResult {
    pub name: String,
    pub status: Status,
    #[serde(rename = "Text", default)]
    pub detail: String,
}

impl ProbeResult {
    pub fn new(name: impl Into<String>, status: Status, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            detail: detail.into(),
        }
    }

    /// Parse the raw content of a probe result file.
    ///
    /// Non UTF-8 bytes are replaced rather than rejected. An invalid status
    /// line yields [`ProbeParseError::InvalidStatus`] and the caller must
    /// discard the probe entirely.
    pub fn parse(name: impl Into<String>, raw: &[u8]) -> Result<Self, ProbeParseError> {
        let content = String::from_utf8_lossy(raw);
        let (status_line, rest) = match content.split_once('\n') {
            Some((first, rest)) => (first, rest),
            None => (content.as_ref(), ""),
        };

        let status = status_line.parse::<Status>()?;
        let detail = rest.trim_end().to_string();

        Ok(Self {
            name: name.into(),
            status,
            detail,
        })
    }
}
