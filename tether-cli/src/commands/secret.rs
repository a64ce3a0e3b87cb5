//! Secret command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use std::collections::BTreeMap;

use super::parse_key_val;
use crate::config::Config;

/// Secret subcommands
#[derive(Subcommand)]
pub enum SecretCommands {
    /// Store a secret in the namespace
    Create {
        /// Secret name
        #[arg(short, long)]
        name: String,

        /// Values as KEY=value pairs (e.g., -v DB_USER=app -v DB_PASS=hunter2)
        #[arg(short, long, value_parser = parse_key_val, required = true)]
        value: Vec<(String, String)>,
    },
}

pub async fn handle_secret_command(command: SecretCommands, config: &Config) -> Result<()> {
    match command {
        SecretCommands::Create { name, value } => create_secret(config, &name, value).await,
    }
}

async fn create_secret(config: &Config, name: &str, values: Vec<(String, String)>) -> Result<()> {
    let values: BTreeMap<String, String> = values.into_iter().collect();
    let keys = values.keys().cloned().collect::<Vec<_>>().join(", ");

    let id = config
        .client()
        .create_secret(&config.namespace, name, values)
        .await
        .with_context(|| format!("Failed to create secret {}", name))?;

    println!("{}", "✓ Secret created successfully!".green().bold());
    println!("  ID:   {}", id.cyan());
    println!("  Name: {}", name.bold());
    println!("  Keys: {}", keys.dimmed());

    Ok(())
}
