//! Severity levels.
//!
//! `tracing` has no level above `ERROR`, so `Fatal` is carried to the engine as an
//! `ERROR` event tagged with its own severity and filtered here before dispatch.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::level_filters::LevelFilter;

/// Text that does not name a severity level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized level: {0:?}")]
pub struct ParseLevelError(pub String);

/// Severity of a log entry, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
    ];

    /// Lowercase name, as accepted in configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }

    /// Capitalized name, as rendered in entries.
    pub fn capital(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }

    /// Closest `tracing` level.
    pub fn as_tracing(self) -> tracing::Level {
        match self {
            Level::Debug => tracing::Level::DEBUG,
            Level::Info => tracing::Level::INFO,
            Level::Warn => tracing::Level::WARN,
            Level::Error | Level::Fatal => tracing::Level::ERROR,
        }
    }

    /// Engine-side filter for a logger whose threshold is `self`.
    pub fn as_filter(self) -> LevelFilter {
        LevelFilter::from_level(self.as_tracing())
    }

    /// Whether a stack trace is attached to entries at this level.
    pub(crate) fn wants_stacktrace(self) -> bool {
        self >= Level::Error
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::Info
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    /// Accepts the lowercase or uppercase spelling, falling back to a
    /// case-insensitive match; the empty string means `info`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" | "DEBUG" => Ok(Level::Debug),
            "info" | "INFO" | "" => Ok(Level::Info),
            "warn" | "WARN" => Ok(Level::Warn),
            "error" | "ERROR" => Ok(Level::Error),
            "fatal" | "FATAL" => Ok(Level::Fatal),
            other => {
                let lower = other.to_ascii_lowercase();
                if lower == other {
                    return Err(ParseLevelError(other.to_string()));
                }
                lower
                    .parse()
                    .map_err(|_| ParseLevelError(other.to_string()))
            }
        }
    }
}
