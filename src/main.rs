//! Brawo CMS
//!
//! Declarative content types, field strategies and schema materialization.
//!
//! This is the entry point of the `brawo` command-line tool.

use brawo_cli::Cli;
use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output can be piped
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    brawo_cli::run(Cli::parse())
}
