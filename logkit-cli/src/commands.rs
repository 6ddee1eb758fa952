use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use logkit::{field, Field, LogConfig, Logger};
use thiserror::Error;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// YAML configuration file; defaults to config/logging.yaml when present
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Minimum level (debug, info, warn, error, fatal)
    #[arg(long, global = true)]
    pub level: Option<String>,

    /// "stdout", "stderr" or a file path
    #[arg(long, global = true)]
    pub output: Option<String>,

    /// Encoder name (json or console)
    #[arg(long, global = true)]
    pub format: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write one entry at the given severity
    Emit(EmitArgs),
    /// Write a fatal entry and exit with status 1
    Fatal(FatalArgs),
}

#[derive(Args, Debug, Clone)]
pub struct EmitArgs {
    #[arg(short, long, value_enum, default_value_t = Severity::Info)]
    pub severity: Severity,
    /// Logger name
    #[arg(short, long)]
    pub name: Option<String>,
    /// Structured field as key=value; repeatable
    #[arg(short, long = "field", value_parser = parse_field)]
    pub fields: Vec<Field>,
    pub message: String,
}

#[derive(Args, Debug, Clone)]
pub struct FatalArgs {
    /// Error text attached under the `error` key
    #[arg(short, long)]
    pub error: Option<String>,
    pub message: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

/// Error carrying text given on the command line.
#[derive(Debug, Error)]
#[error("{0}")]
struct CliError(String);

/// Parses `key=value`, typing the value as integer, float, bool or string.
pub fn parse_field(raw: &str) -> Result<Field, String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {:?}", raw))?;
    if key.is_empty() {
        return Err(format!("empty field key in {:?}", raw));
    }
    Ok(if let Ok(n) = value.parse::<i64>() {
        field::int64(key, n)
    } else if let Ok(x) = value.parse::<f64>() {
        field::float64(key, x)
    } else if let Ok(b) = value.parse::<bool>() {
        field::boolean(key, b)
    } else {
        field::string(key, value)
    })
}

pub fn resolve_config(cli: &Cli) -> anyhow::Result<LogConfig> {
    let mut config = match &cli.config {
        Some(path) => LogConfig::load_from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => LogConfig::load().context("loading configuration")?,
    };
    if let Some(level) = &cli.level {
        config.level = level.clone();
    }
    if let Some(output) = &cli.output {
        config.output = output.clone();
    }
    if let Some(format) = &cli.format {
        config.format = format.clone();
    }
    Ok(config)
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;
    tracing::debug!(?config, "resolved configuration");
    let logger = Logger::with_config(config).context("building logger")?;

    match cli.command {
        Commands::Emit(args) => {
            let logger = match &args.name {
                Some(name) => logger.named(name),
                None => logger,
            };
            match args.severity {
                Severity::Debug => logger.debug(&args.message, &args.fields),
                Severity::Info => logger.info(&args.message, &args.fields),
                Severity::Warn => logger.warn(&args.message, &args.fields),
                Severity::Error => logger.error(&args.message, &args.fields),
            }
            logger.sync().context("flushing output")?;
            Ok(())
        }
        Commands::Fatal(args) => {
            let err = args.error.map(CliError);
            logger.fatal_error(
                &args.message,
                err.as_ref().map(|e| e as &dyn std::error::Error),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logkit::FieldValue;

    #[test]
    fn test_parse_field_types() {
        assert_eq!(parse_field("n=3").unwrap().value, FieldValue::Int64(3));
        assert_eq!(parse_field("x=0.5").unwrap().value, FieldValue::Float64(0.5));
        assert_eq!(parse_field("ok=true").unwrap().value, FieldValue::Bool(true));
        assert_eq!(
            parse_field("who=a=b").unwrap().value,
            FieldValue::String("a=b".into())
        );
    }

    #[test]
    fn test_parse_field_rejects_malformed() {
        assert!(parse_field("novalue").is_err());
        assert!(parse_field("=v").is_err());
    }

    #[test]
    fn test_cli_error_displays_given_text() {
        let err = CliError("db unreachable".into());
        assert_eq!(err.to_string(), "db unreachable");
        let dyn_err: &dyn std::error::Error = &err;
        assert!(dyn_err.source().is_none());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "logkit-cli",
            "--level",
            "debug",
            "--format",
            "json",
            "emit",
            "hello",
        ]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, "json");
    }
}
