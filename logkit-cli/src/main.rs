//! ## logkit-cli
//! Builds a logger from flags, `config/logging.yaml` and `LOGKIT_*` variables, then
//! writes one entry through it. Useful for checking a configuration before shipping it.
//!
//! The tool's own diagnostics go to stderr and are controlled by `RUST_LOG`.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    commands::run_command(Cli::parse())
}
