//! Probe and host status values and the aggregation rule that combines them.
//!
//! [`Status::combine`] is the only place severity is decided. It is
//! commutative and associative with [`Status::Unknown`] as the identity,
//! so folding probe statuses gives the same answer whatever order the
//! result directory happens to be enumerated in.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProbeParseError;

/// Health status reported by a probe, or derived for the whole host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    #[default]
    Unknown,
    Ok,
    Warning,
    Critical,
}

impl Status {
    /// All valid statuses, least severe first.
    pub const ALL: [Status; 4] = [
        Status::Unknown,
        Status::Ok,
        Status::Warning,
        Status::Critical,
    ];

    /// The literal used in probe files, the state file and log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Ok => "OK",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }

    fn severity(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Ok => 1,
            Self::Warning => 2,
            Self::Critical => 3,
        }
    }

    /// Combine two statuses into one.
    ///
    /// Equal values yield themselves, `UNKNOWN` yields the other operand,
    /// and otherwise the more severe of `CRITICAL > WARNING > OK` wins.
    pub fn combine(self, other: Status) -> Status {
        if self.severity() >= other.severity() {
            self
        } else {
            other
        }
    }

    /// Left-fold any number of statuses, seeded with `UNKNOWN`.
    pub fn fold<I>(statuses: I) -> Status
    where
        I: IntoIterator<Item = Status>,
    {
        statuses
            .into_iter()
            .fold(Status::Unknown, |acc, status| acc.combine(status))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ProbeParseError;

    /// Case-sensitive match against the four literals.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNKNOWN" => Ok(Self::Unknown),
            "OK" => Ok(Self::Ok),
            "WARNING" => Ok(Self::Warning),
            "CRITICAL" => Ok(Self::Critical),
            other => Err(ProbeParseError::InvalidStatus(other.to_string())),
        }
    }
}
