//! Operator CLI for identity holder contracts
//!
//! Inspects snapshot JSON files offline: which owner actions a viewer would
//! be offered, and what the certificate banner would say.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;

use commands::{
    config as config_cmd, eligibility::EligibilityArgs, expiration::ExpirationArgs,
};

#[derive(Parser)]
#[command(name = "holder")]
#[command(about = "Identity holder - snapshot inspection tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override a config key, e.g. `--set expiration.safety_window_ms=3600000`
    #[arg(long = "set", global = true, value_name = "KEY=VALUE")]
    overrides: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the owner actions a viewer is offered for a snapshot
    Eligibility(EligibilityArgs),

    /// Compute the certificate expiration status
    Expiration(ExpirationArgs),

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = config::load_config(cli.config.as_deref(), &cli.overrides)?;
    tracing::debug!(?config, "effective configuration");

    let output = match cli.command {
        Commands::Eligibility(args) => commands::eligibility::run(&args, &config).await?,
        Commands::Expiration(args) => commands::expiration::run(&args, &config).await?,
        Commands::Config => config_cmd::run(&config)?,
    };
    print!("{output}");

    Ok(())
}
