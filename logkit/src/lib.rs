//! # logkit
//!
//! Preconfigured structured logger over `tracing`.
//!
//! A [`LogConfig`] names a level, an output destination and an encoding; a
//! [`Logger`] built from it forwards every entry to its own `tracing` dispatcher
//! with a fixed presentation: `ts`/`level`/`logger`/`caller`/`msg`/`stacktrace`
//! keys, capitalized levels, ISO-8601 timestamps and short caller locations.
//!
//! ```no_run
//! use logkit::{field, LogConfig, Logger};
//!
//! let log = Logger::with_config(LogConfig::new("debug", "stdout", "json"))?;
//! let requests = log.with_fields(&[field::string("component", "http")]);
//! requests.info("request served", &[field::int("status", 200)]);
//! # Ok::<(), logkit::LoggerError>(())
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod encoding;
pub mod error;
pub mod field;
pub mod level;
pub mod logger;
pub mod sink;
pub mod validation;

pub use config::LogConfig;
pub use encoding::{Encoding, ParseEncodingError};
pub use error::{ConfigError, LoggerError};
pub use field::{Field, FieldValue};
pub use level::{Level, ParseLevelError};
pub use logger::{FatalHook, Logger};
pub use sink::{MemorySink, Sink};
