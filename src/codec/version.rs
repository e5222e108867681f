//! Backup format versions
//!
//! The backup format has gone through four generations. The version string
//! in an envelope header is parsed exactly once, at the envelope boundary,
//! into this closed enum; everything downstream matches on variants instead
//! of comparing strings.
//!
//! - `1.2` stored each record's grid as a bare array of numbers
//! - `1.3` stored grids as arrays of cell objects
//! - `1.4` keyed the record set by id instead of listing it
//! - `1.5` is the current list payload with key check and integrity tag

use serde::{Deserialize, Serialize};
use std::fmt;

/// A backup format version
///
/// Anything outside the known family parses to `Unsupported`, which every
/// consumer rejects without attempting migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FormatVersion {
    /// Array-of-numbers grids
    V1_2,
    /// Array-of-cell-objects grids
    V1_3,
    /// Record set keyed by id
    V1_4,
    /// Current format with key check and integrity tag
    V1_5,
    /// Unrecognized (typically future) version, kept verbatim for reporting
    Unsupported(String),
}

impl FormatVersion {
    /// The version written by this app
    pub const CURRENT: FormatVersion = FormatVersion::V1_5;

    /// Parse a version string from an envelope header
    pub fn parse(s: &str) -> Self {
        match s {
            "1.2" => Self::V1_2,
            "1.3" => Self::V1_3,
            "1.4" => Self::V1_4,
            "1.5" => Self::V1_5,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// The version string as written into envelope headers
    pub fn as_str(&self) -> &str {
        match self {
            Self::V1_2 => "1.2",
            Self::V1_3 => "1.3",
            Self::V1_4 => "1.4",
            Self::V1_5 => "1.5",
            Self::Unsupported(s) => s,
        }
    }

    /// Whether this is the version the current app writes
    pub fn is_current(&self) -> bool {
        *self == Self::CURRENT
    }

    /// Whether this is an older, still-readable version
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::V1_2 | Self::V1_3 | Self::V1_4)
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for FormatVersion {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<FormatVersion> for String {
    fn from(version: FormatVersion) -> Self {
        version.as_str().to_string()
    }
}
