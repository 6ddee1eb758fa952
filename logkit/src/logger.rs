//! The logger facade.
//!
//! A [`Logger`] owns its own `tracing` dispatcher built from a [`LogConfig`]; it never
//! installs or reads the process-wide default subscriber. Every emission is forwarded
//! synchronously to that dispatcher.

use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::panic::Location;
use std::path::Path;
use std::sync::Arc;

use tracing::Dispatch;

use crate::config::LogConfig;
use crate::encoding::{Encoding, EntryFormat};
use crate::error::LoggerError;
use crate::field::{self, Field};
use crate::level::Level;
use crate::sink::Sink;

/// What a logger does after writing a fatal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalHook {
    /// Exit the process with the given status.
    Exit(i32),
    /// Panic on the calling thread instead of exiting.
    Panic,
}

impl Default for FatalHook {
    fn default() -> Self {
        FatalHook::Exit(1)
    }
}

/// Preconfigured structured logger.
///
/// Cloning is cheap; clones and children share the underlying dispatcher and sink.
#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
    sink: Sink,
    level: Level,
    /// `None` when wrapping a caller-built dispatcher.
    encoding: Option<Encoding>,
    name: Option<Arc<str>>,
    /// Context fields, pre-encoded as a JSON object body.
    context: Arc<str>,
    fatal_hook: FatalHook,
}

/// Emits one carrier event at a constant `tracing` level.
macro_rules! emit_at {
    ($lvl:expr, $entry:expr) => {
        tracing::event!(
            target: "logkit",
            $lvl,
            severity = $entry.severity,
            logger = $entry.logger,
            caller = $entry.caller.as_str(),
            fields = $entry.fields.as_str(),
            stacktrace = $entry.stacktrace.as_str(),
            "{}",
            $entry.message
        )
    };
}

struct Entry<'a> {
    severity: &'static str,
    logger: &'a str,
    caller: String,
    message: &'a str,
    fields: String,
    stacktrace: String,
}

impl Logger {
    /// Logger with the default configuration: `info` to stdout, console encoding.
    pub fn new() -> Result<Self, LoggerError> {
        Self::with_config(LogConfig::default())
    }

    /// Builds a logger from `config`.
    ///
    /// Fails if the level does not parse, the format names no encoder, or the output
    /// cannot be opened for writing.
    pub fn with_config(config: LogConfig) -> Result<Self, LoggerError> {
        let level: Level = config.level.parse()?;
        let encoding: Encoding = config.format.parse()?;
        let sink = Sink::open(&config.output)?;

        tracing::debug!(
            level = %level,
            output = %config.output,
            format = %encoding,
            "logger constructed"
        );
        Ok(Self::from_parts(level, encoding, sink))
    }

    /// Builds a logger writing to an already resolved sink.
    pub fn from_parts(level: Level, encoding: Encoding, sink: Sink) -> Self {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level.as_filter())
            .with_writer(sink.make_writer())
            .log_internal_errors(true)
            .event_format(EntryFormat::new(encoding))
            .finish();

        Self {
            dispatch: Dispatch::new(subscriber),
            sink,
            level,
            encoding: Some(encoding),
            name: None,
            context: Arc::from(""),
            fatal_hook: FatalHook::default(),
        }
    }

    /// Wraps a dispatcher the caller already built, skipping configuration.
    ///
    /// Entries reach `dispatch` as `ERROR`..`DEBUG` events with target `logkit` and the
    /// fields `severity`, `logger`, `caller`, `fields` (a JSON object body) and
    /// `stacktrace`; how they are rendered is up to the caller's subscriber.
    /// [`sync`](Logger::sync) is a no-op.
    pub fn from_dispatch(dispatch: Dispatch, level: Level) -> Self {
        Self {
            dispatch,
            sink: Sink::External,
            level,
            encoding: None,
            name: None,
            context: Arc::from(""),
            fatal_hook: FatalHook::default(),
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn encoding(&self) -> Option<Encoding> {
        self.encoding
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether entries at `level` pass this logger's threshold.
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    #[track_caller]
    pub fn debug(&self, msg: &str, fields: &[Field]) {
        self.log(Level::Debug, msg, fields, Location::caller());
    }

    #[track_caller]
    pub fn info(&self, msg: &str, fields: &[Field]) {
        self.log(Level::Info, msg, fields, Location::caller());
    }

    #[track_caller]
    pub fn warn(&self, msg: &str, fields: &[Field]) {
        self.log(Level::Warn, msg, fields, Location::caller());
    }

    #[track_caller]
    pub fn error(&self, msg: &str, fields: &[Field]) {
        self.log(Level::Error, msg, fields, Location::caller());
    }

    /// Logs at FATAL, flushes the sink, then runs the fatal hook.
    #[track_caller]
    pub fn fatal(&self, msg: &str, fields: &[Field]) -> ! {
        self.log(Level::Fatal, msg, fields, Location::caller());
        self.terminate()
    }

    /// Logs `msg` at FATAL with `err` attached under `error`, then runs the fatal hook.
    ///
    /// Without an error the entry is still written, just without the `error` field.
    #[track_caller]
    pub fn fatal_error(&self, msg: &str, err: Option<&(dyn StdError + '_)>) -> ! {
        let caller = Location::caller();
        match err {
            Some(err) => self.log(Level::Fatal, msg, &[field::error(err)], caller),
            None => self.log(Level::Fatal, msg, &[], caller),
        }
        self.terminate()
    }

    /// Child logger whose entries always carry `fields`. `self` is left untouched.
    pub fn with_fields(&self, fields: &[Field]) -> Logger {
        let mut context = self.context.to_string();
        field::append(&mut context, fields);
        Logger {
            context: Arc::from(context),
            ..self.clone()
        }
    }

    /// Child logger with `name` appended to this logger's name.
    pub fn named(&self, name: &str) -> Logger {
        let name = match &self.name {
            Some(parent) if !name.is_empty() => format!("{}.{}", parent, name),
            Some(parent) => parent.to_string(),
            None => name.to_string(),
        };
        Logger {
            name: (!name.is_empty()).then(|| Arc::from(name)),
            ..self.clone()
        }
    }

    pub fn with_fatal_hook(mut self, hook: FatalHook) -> Logger {
        self.fatal_hook = hook;
        self
    }

    /// Flushes the sink.
    pub fn sync(&self) -> std::io::Result<()> {
        self.sink.sync()
    }

    fn log(&self, level: Level, msg: &str, fields: &[Field], caller: &'static Location<'static>) {
        if !self.enabled(level) {
            return;
        }

        let mut encoded = self.context.to_string();
        field::append(&mut encoded, fields);

        let entry = Entry {
            severity: level.as_str(),
            logger: self.name.as_deref().unwrap_or(""),
            caller: short_caller(caller),
            message: msg,
            fields: encoded,
            stacktrace: if level.wants_stacktrace() {
                Backtrace::force_capture().to_string()
            } else {
                String::new()
            },
        };

        tracing::dispatcher::with_default(&self.dispatch, || match level {
            Level::Debug => emit_at!(tracing::Level::DEBUG, entry),
            Level::Info => emit_at!(tracing::Level::INFO, entry),
            Level::Warn => emit_at!(tracing::Level::WARN, entry),
            Level::Error | Level::Fatal => emit_at!(tracing::Level::ERROR, entry),
        });
    }

    fn terminate(&self) -> ! {
        if let Err(err) = self.sync() {
            eprintln!("logkit: failed to sync sink before exit: {}", err);
        }
        match self.fatal_hook {
            FatalHook::Exit(code) => {
                tracing::trace!(code, "fatal hook exiting");
                std::process::exit(code)
            }
            FatalHook::Panic => panic!("fatal entry logged"),
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level)
            .field("encoding", &self.encoding)
            .field("sink", &self.sink)
            .field("name", &self.name)
            .field("fatal_hook", &self.fatal_hook)
            .finish_non_exhaustive()
    }
}

/// `dir/file.rs:line`: the last directory and file name of the call site.
fn short_caller(location: &Location<'_>) -> String {
    let path = Path::new(location.file());
    let file = path.file_name().map(|f| f.to_string_lossy());
    let dir = path
        .parent()
        .and_then(Path::file_name)
        .map(|d| d.to_string_lossy());
    match (dir, file) {
        (Some(dir), Some(file)) => format!("{}/{}:{}", dir, file, location.line()),
        (None, Some(file)) => format!("{}:{}", file, location.line()),
        _ => format!("{}:{}", location.file(), location.line()),
    }
}
