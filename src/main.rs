use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;

use nginx_patcher::config::{EngineKind, PatchConfig};
use nginx_patcher::docker_utils::connect;
use nginx_patcher::logger;
use nginx_patcher::patcher::{run_patch, PatchOutcome};

/// Rewrite service endpoints in the nginx template and restart the nginx container
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON file with template path, container name and replacements
    #[arg(short, long, env = "PATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Template to patch
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Container to restart after patching
    #[arg(long)]
    container: Option<String>,

    /// Show the diff without writing or restarting
    #[arg(long)]
    dry_run: bool,

    /// Write the template but leave the container running
    #[arg(long)]
    no_restart: bool,

    /// Use the docker command line client instead of the Engine API
    #[arg(long)]
    cli: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Main entry point for the application
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(args.verbose);

    let mut config = PatchConfig::load(args.config.as_deref())
        .context("Failed to load configuration")?;

    if let Some(template) = args.template {
        config.template_path = template;
    }
    if let Some(container) = args.container {
        config.container_name = container;
    }
    if args.no_restart {
        config.disable_restart = true;
    }
    if args.cli {
        config.engine = EngineKind::Cli;
    }
    config.display();

    // One engine handle for the whole run
    let engine = connect(config.engine).context("Failed to set up container engine")?;

    match run_patch(&config, engine.as_ref(), args.dry_run).await {
        Ok(PatchOutcome::Unchanged) => info!("Template already up to date"),
        Ok(PatchOutcome::DryRun) => info!("Dry run complete"),
        Ok(PatchOutcome::Patched { bytes_written, restarted }) => {
            info!("Template patched ({} bytes, restarted: {})", bytes_written, restarted);
        }
        Err(e) => {
            error!("Patch failed: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
