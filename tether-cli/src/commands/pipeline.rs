//! Pipeline command handlers
//!
//! Handles pipeline deployment, inspection, teardown and import. Create and
//! delete block until the platform settles.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use std::time::Duration;
use tether_core::domain::pipeline::{PipelineRef, PipelineSnapshot};
use tether_reconciler::PipelineModel;

use super::report;
use crate::config::Config;

/// Pipeline subcommands
#[derive(Subcommand)]
pub enum PipelineCommands {
    /// Deploy a pipeline from a git repository and wait until it runs
    Create {
        /// Pipeline name
        #[arg(short, long)]
        name: String,

        /// Git repository URL
        #[arg(short, long)]
        repo: String,

        /// Branch to deploy
        #[arg(short, long, default_value = "main")]
        branch: String,

        /// Timeout in seconds (defaults to TETHER_TIMEOUT)
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// List all pipelines in the namespace
    List,
    /// Get pipeline details
    Get {
        /// Pipeline name
        name: String,
    },
    /// Destroy a pipeline, forcing it if a graceful destroy fails
    Delete {
        /// Pipeline name
        name: String,

        /// Timeout in seconds for each destroy attempt (defaults to TETHER_TIMEOUT)
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Print the tracked state of an existing pipeline as JSON
    Import {
        /// Pipeline name
        name: String,
    },
}

/// Handle pipeline commands
///
/// Routes pipeline subcommands to their respective handlers.
pub async fn handle_pipeline_command(command: PipelineCommands, config: &Config) -> Result<()> {
    match command {
        PipelineCommands::Create {
            name,
            repo,
            branch,
            timeout,
        } => create_pipeline(config, name, repo, branch, timeout).await,
        PipelineCommands::List => list_pipelines(config).await,
        PipelineCommands::Get { name } => get_pipeline(config, &name).await,
        PipelineCommands::Delete { name, timeout } => {
            delete_pipeline(config, &name, timeout).await
        }
        PipelineCommands::Import { name } => import_pipeline(config, &name).await,
    }
}

/// Deploy a pipeline and wait for all its deployments to run
async fn create_pipeline(
    config: &Config,
    name: String,
    repo: String,
    branch: String,
    timeout: Option<u64>,
) -> Result<()> {
    let mut plan = PipelineModel::new(name, repo, branch);
    plan.timeouts.create = timeout.map(Duration::from_secs);

    println!(
        "{} {} ({} @ {})",
        "Deploying".bold(),
        plan.name.cyan(),
        plan.repo_url.dimmed(),
        plan.branch.dimmed()
    );

    let response = config.resource().create(plan).await;
    report(&response.diagnostics)?;

    if let Some(state) = response.state {
        println!("{}", "✓ Pipeline deployed successfully!".green().bold());
        print_model(&state);
    }
    Ok(())
}

/// List all pipelines in the namespace
async fn list_pipelines(config: &Config) -> Result<()> {
    let pipelines = config
        .client()
        .list_pipelines(&config.namespace)
        .await
        .with_context(|| format!("Failed to list pipelines in {}", config.namespace))?;

    if pipelines.is_empty() {
        println!("{}", "No pipelines found.".yellow());
    } else {
        println!(
            "{}",
            format!("Found {} pipeline(s):", pipelines.len()).bold()
        );
        println!();
        for pipeline in pipelines {
            print_pipeline_summary(&pipeline);
        }
    }

    Ok(())
}

/// Get and display a single pipeline
async fn get_pipeline(config: &Config, name: &str) -> Result<()> {
    let pipeline = PipelineRef::new(config.namespace.clone(), name);

    match config.reconciler().read(&pipeline).await? {
        Some(snapshot) => print_pipeline_details(&snapshot),
        None => anyhow::bail!("Pipeline {} not found", pipeline),
    }

    Ok(())
}

/// Destroy a pipeline
async fn delete_pipeline(config: &Config, name: &str, timeout: Option<u64>) -> Result<()> {
    let mut state = PipelineModel::new(name, "", "");
    state.id = Some(name.to_string());
    state.timeouts.delete = timeout.map(Duration::from_secs);

    println!("{} {}", "Destroying".bold(), name.cyan());

    let response = config.resource().delete(state).await;
    report(&response.diagnostics)?;

    println!(
        "{}",
        format!("✓ Pipeline {} destroyed successfully!", name)
            .green()
            .bold()
    );
    Ok(())
}

/// Print the tracked state of an existing pipeline
async fn import_pipeline(config: &Config, name: &str) -> Result<()> {
    let response = config.resource().import(name).await;
    report(&response.diagnostics)?;

    let json = serde_json::to_string_pretty(&response.state)
        .context("Failed to serialize pipeline state")?;
    println!("{}", json);
    Ok(())
}

fn colored_status(status: &str) -> ColoredString {
    match status {
        "deployed" | "running" | "destroyed" => status.green(),
        "error" | "destroy-error" => status.red(),
        "" => "unknown".dimmed(),
        _ => status.yellow(),
    }
}

/// Print a pipeline summary
fn print_pipeline_summary(pipeline: &PipelineSnapshot) {
    println!("  {} {}", "▸".cyan(), pipeline.name.bold());
    println!("    Status:      {}", colored_status(&pipeline.status));
    println!(
        "    Deployments: {}",
        pipeline.deployments.len().to_string().dimmed()
    );
    println!();
}

/// Print detailed pipeline information
fn print_pipeline_details(pipeline: &PipelineSnapshot) {
    println!("{}", "Pipeline Details:".bold());
    println!("  Name:      {}", pipeline.name.cyan());
    println!("  Namespace: {}", pipeline.namespace);
    println!("  Status:    {}", colored_status(&pipeline.status));

    if pipeline.deployments.is_empty() {
        println!("  {}", "No deployments.".dimmed());
        return;
    }

    println!("\n{}", "Deployments:".bold());
    for deployment in &pipeline.deployments {
        println!(
            "  {} {} {}",
            "▸".cyan(),
            deployment.name.bold(),
            colored_status(&deployment.status)
        );
        for endpoint in &deployment.endpoints {
            println!("      {}", endpoint.underline());
        }
    }
}

/// Print tracked state after a create
fn print_model(state: &PipelineModel) {
    println!("  Name:   {}", state.name.cyan());
    println!(
        "  Status: {}",
        colored_status(state.status.as_deref().unwrap_or_default())
    );
    for deployment in &state.deployments {
        println!(
            "  {} {} {}",
            "▸".cyan(),
            deployment.name.bold(),
            colored_status(&deployment.status)
        );
        for endpoint in &deployment.endpoints {
            println!("      {}", endpoint.underline());
        }
    }
}
