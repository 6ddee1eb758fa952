//! Error types for logger construction and configuration loading

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use validator::ValidationErrors;

use crate::encoding::ParseEncodingError;
use crate::level::ParseLevelError;

/// Failure to build a [`Logger`](crate::Logger).
#[derive(Debug, Error)]
pub enum LoggerError {
    /// The configured level is not a known severity.
    #[error("invalid log level: {0}")]
    InvalidLevel(#[from] ParseLevelError),

    /// The configured format names no known encoder.
    #[error(transparent)]
    Encoding(#[from] ParseEncodingError),

    /// The output destination could not be opened for writing.
    #[error("couldn't open sink {}: {source}", .path.display())]
    OpenSink {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure to load a [`LogConfig`](crate::LogConfig) from files and environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("invalid logging configuration: {}", rejected_settings(.0))]
    Validation(#[from] ValidationErrors),

    #[error("Configuration parsing error: {0}")]
    Parsing(#[from] figment::Error),
}

/// One `setting (code)` item per rejected setting, in setting order.
fn rejected_settings(errors: &ValidationErrors) -> String {
    let mut settings: Vec<_> = errors.field_errors().into_iter().collect();
    settings.sort_by(|a, b| a.0.cmp(&b.0));
    settings
        .iter()
        .map(|(setting, errs)| {
            let codes: Vec<&str> = errs.iter().map(|e| e.code.as_ref()).collect();
            format!("{} ({})", setting, codes.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ")
}
