//! Entry encoders plugged into `tracing_subscriber::fmt`.
//!
//! Both encoders share one key layout: `level`, `ts`, `logger`, `caller`, `msg`, the
//! structured fields, then `stacktrace`. The facade hands fields over already
//! encoded as a JSON object body, so the encoder only splices them in.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local};
use serde_json::Value;
use thiserror::Error;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::level::Level;

pub(crate) const TIME_KEY: &str = "ts";
pub(crate) const LEVEL_KEY: &str = "level";
pub(crate) const NAME_KEY: &str = "logger";
pub(crate) const CALLER_KEY: &str = "caller";
pub(crate) const MESSAGE_KEY: &str = "msg";
pub(crate) const STACKTRACE_KEY: &str = "stacktrace";

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// ISO-8601 with milliseconds; `Z` for UTC, otherwise a `+hhmm` offset.
fn iso8601(t: &DateTime<FixedOffset>) -> String {
    if t.offset().local_minus_utc() == 0 {
        format!("{}Z", t.format(TIME_FORMAT))
    } else {
        format!("{}{}", t.format(TIME_FORMAT), t.format("%z"))
    }
}

/// Format name that matches no encoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no encoder registered for name {0:?}")]
pub struct ParseEncodingError(pub String);

/// Output encoding of a logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// One JSON object per line.
    Json,
    /// Tab-separated, human-readable lines.
    Console,
}

impl Encoding {
    pub fn as_str(self) -> &'static str {
        match self {
            Encoding::Json => "json",
            Encoding::Console => "console",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = ParseEncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Encoding::Json),
            "console" => Ok(Encoding::Console),
            other => Err(ParseEncodingError(other.to_string())),
        }
    }
}

/// Event formatter applying the fixed presentation settings.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EntryFormat {
    encoding: Encoding,
}

impl EntryFormat {
    pub(crate) fn new(encoding: Encoding) -> Self {
        Self { encoding }
    }
}

impl<S, N> FormatEvent<S, N> for EntryFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut entry = EntryVisitor::default();
        event.record(&mut entry);

        let level = entry
            .severity
            .as_deref()
            .and_then(|s| s.parse::<Level>().ok())
            .map(Level::capital)
            .unwrap_or_else(|| event.metadata().level().as_str());
        let ts = iso8601(&Local::now().fixed_offset());

        match self.encoding {
            Encoding::Json => write_json(&mut writer, level, &ts, &entry),
            Encoding::Console => write_console(&mut writer, level, &ts, &entry),
        }
    }
}

fn write_json(w: &mut Writer<'_>, level: &str, ts: &str, entry: &EntryVisitor) -> fmt::Result {
    write!(w, "{{{}:{}", quote(LEVEL_KEY), quote(level))?;
    write!(w, ",{}:{}", quote(TIME_KEY), quote(ts))?;
    if let Some(name) = &entry.logger {
        write!(w, ",{}:{}", quote(NAME_KEY), quote(name))?;
    }
    if let Some(caller) = &entry.caller {
        write!(w, ",{}:{}", quote(CALLER_KEY), quote(caller))?;
    }
    write!(w, ",{}:{}", quote(MESSAGE_KEY), quote(&entry.message))?;
    if let Some(fields) = &entry.fields {
        write!(w, ",{}", fields)?;
    }
    if let Some(trace) = &entry.stacktrace {
        write!(w, ",{}:{}", quote(STACKTRACE_KEY), quote(trace))?;
    }
    writeln!(w, "}}")
}

fn write_console(w: &mut Writer<'_>, level: &str, ts: &str, entry: &EntryVisitor) -> fmt::Result {
    write!(w, "{}\t{}", ts, level)?;
    if let Some(name) = &entry.logger {
        write!(w, "\t{}", name)?;
    }
    if let Some(caller) = &entry.caller {
        write!(w, "\t{}", caller)?;
    }
    write!(w, "\t{}", entry.message)?;
    if let Some(fields) = &entry.fields {
        write!(w, "\t{{{}}}", fields)?;
    }
    writeln!(w)?;
    if let Some(trace) = &entry.stacktrace {
        writeln!(w, "{}", trace.trim_end())?;
    }
    Ok(())
}

fn quote(s: &str) -> Value {
    Value::from(s)
}

/// Collects the facade's carrier fields from an event.
#[derive(Debug, Default)]
struct EntryVisitor {
    message: String,
    severity: Option<String>,
    logger: Option<String>,
    caller: Option<String>,
    fields: Option<String>,
    stacktrace: Option<String>,
}

impl EntryVisitor {
    fn slot(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            "severity" => Some(&mut self.severity),
            "logger" => Some(&mut self.logger),
            "caller" => Some(&mut self.caller),
            "fields" => Some(&mut self.fields),
            "stacktrace" => Some(&mut self.stacktrace),
            _ => None,
        }
    }
}

impl Visit for EntryVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else if let Some(slot) = self.slot(field.name()) {
            if !value.is_empty() {
                *slot = Some(value.to_string());
            }
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else if let Some(slot) = self.slot(field.name()) {
            *slot = Some(format!("{:?}", value));
        }
    }
}
