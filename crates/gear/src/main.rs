use std::io::IsTerminal;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

/// Inspect, unpack and build NARC archives and Yaz0 compressed files
#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Only log warnings and errors unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: commands::Commands,
}

fn main() -> Result<()> {
    better_panic::install();

    let cli = Cli::parse();
    let level = if cli.quiet { LevelFilter::WARN } else { LevelFilter::INFO };
    install_subscriber(level)?;

    cli.command.handle()
}

/// Log to stderr, leaving stdout to listings and decompressed data
fn install_subscriber(level: LevelFilter) -> Result<()> {
    let stderr = std::io::stderr();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(stderr.is_terminal())
                .with_target(false)
                .without_time()
                .compact(),
        )
        .with(EnvFilter::builder().with_default_directive(level.into()).from_env_lossy())
        .try_init()
        .into_diagnostic()
}
