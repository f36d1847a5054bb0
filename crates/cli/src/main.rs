//! navsuite CLI - Main Entry Point
//!
//! Loads declarative navigation suites and runs them in a browser through
//! Playwright, or lists what would run.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use navsuite_e2e::RunnerConfig;

mod commands;
mod output;

use commands::{list, run};

/// navsuite - declarative browser navigation suites
#[derive(Parser)]
#[command(name = "navsuite")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "navsuite.toml", global = true)]
    config: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run suites and report each test's outcome
    Run(run::RunArgs),

    /// Show which tests would run, with inherited hook counts
    List(list::ListArgs),

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // A missing default config file just means defaults.
    let config = if cli.config.exists() {
        RunnerConfig::from_file(&cli.config)?
    } else {
        RunnerConfig::default()
    };

    match cli.command {
        Commands::Run(args) => {
            let success = run::execute(args, config, cli.format).await?;
            if !success {
                std::process::exit(1);
            }
        }
        Commands::List(args) => list::execute(args, config, cli.format)?,
        Commands::Version => {
            println!("navsuite v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
