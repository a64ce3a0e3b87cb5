//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod pipeline;
mod secret;

pub use pipeline::PipelineCommands;
pub use secret::SecretCommands;

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use tether_reconciler::controller::{Diagnostics, Severity};

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Pipeline management
    Pipeline {
        #[command(subcommand)]
        command: PipelineCommands,
    },
    /// Secret management
    Secret {
        #[command(subcommand)]
        command: SecretCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Pipeline { command } => pipeline::handle_pipeline_command(command, config).await,
        Commands::Secret { command } => secret::handle_secret_command(command, config).await,
    }
}

/// Print diagnostics and turn any error among them into a failure
fn report(diagnostics: &Diagnostics) -> Result<()> {
    for diagnostic in diagnostics.iter() {
        match diagnostic.severity {
            Severity::Warning => eprintln!(
                "{} {}\n  {}",
                "!".yellow().bold(),
                diagnostic.summary.yellow(),
                diagnostic.detail.dimmed()
            ),
            Severity::Error => eprintln!(
                "{} {}\n  {}",
                "✗".red().bold(),
                diagnostic.summary.red(),
                diagnostic.detail
            ),
        }
    }

    if diagnostics.has_error() {
        anyhow::bail!("command failed");
    }
    Ok(())
}

/// Parse a single key=value pair
fn parse_key_val(s: &str) -> Result<(String, String)> {
    let pos = s
        .find('=')
        .ok_or_else(|| anyhow::anyhow!("invalid KEY=value: no `=` found in `{}`", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}
