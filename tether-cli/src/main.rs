//! Tether CLI
//!
//! Command-line interface for deploying and tearing down pipelines on the
//! development platform.

mod commands;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tether_reconciler::ReconcilerConfig;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tether")]
#[command(about = "Tether pipeline lifecycle CLI", long_about = None)]
struct Cli {
    /// Platform API URL
    #[arg(long, env = "TETHER_API_URL", default_value = "http://localhost:8080")]
    api_url: String,

    /// API token
    #[arg(long, env = "TETHER_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Namespace (space) that owns the pipelines
    #[arg(short = 'N', long, env = "TETHER_NAMESPACE")]
    namespace: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tether_cli=info,tether_reconciler=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let reconciler = ReconcilerConfig::from_env().context("Invalid reconciler configuration")?;
    reconciler.validate()?;

    let config = Config {
        api_url: cli.api_url,
        token: cli.token,
        namespace: cli.namespace,
        reconciler,
    };
    debug!(
        "Using platform at {} (namespace {})",
        config.api_url, config.namespace
    );

    handle_command(cli.command, &config).await
}
