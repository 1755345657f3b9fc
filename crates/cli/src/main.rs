//! precache command-line entry point.
//!
//! Reads a manifest JSON file and reconciles it against the local store.
//! `cleanup` without a manifest removes every stored URL.
//! Logging goes to stderr so stdout carries only the JSON result.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use precache_client::{CleanupReport, InstallResult, PrecacheManager};
use precache_core::{CacheDb, Error, PrecacheConfig};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "precache", version, about = "Revision-tracked precache reconciliation")]
struct Cli {
    /// TOML config file (overrides PRECACHE_CONFIG_FILE).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch and store every manifest entry whose revision is not installed.
    Install {
        /// Path to a JSON manifest (array or {"revisionedFiles": [...]}).
        manifest: PathBuf,
    },
    /// Remove stored URLs that are no longer in the manifest.
    Cleanup {
        /// Path to a JSON manifest (array or {"revisionedFiles": [...]}).
        /// When omitted, everything in the store is removed.
        manifest: Option<PathBuf>,
    },
    /// Install, then clean up if every entry installed.
    Sync {
        /// Path to a JSON manifest (array or {"revisionedFiles": [...]}).
        manifest: PathBuf,
    },
}

impl Command {
    fn manifest(&self) -> Option<&Path> {
        match self {
            Command::Install { manifest } | Command::Sync { manifest } => Some(manifest.as_path()),
            Command::Cleanup { manifest } => manifest.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct SyncOutput {
    installed: Vec<InstallResult>,
    cleanup: CleanupReport,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PrecacheConfig::load_from(Some(path.as_path())),
        None => PrecacheConfig::load(),
    }
    .context("failed to load configuration")?;

    let db = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;

    let mut manager = PrecacheManager::from_config(&config, db)?;
    let output = run(&cli.command, &mut manager).await?;

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

/// Load the command's manifest, if any, then reconcile.
async fn run(command: &Command, manager: &mut PrecacheManager) -> Result<serde_json::Value> {
    match command.manifest() {
        Some(path) => {
            let added = manager.add_entries(&read_manifest(path)?)?;
            tracing::info!(entries = added, manifest = %path.display(), "loaded manifest");
        }
        None => tracing::info!("no manifest given, every stored URL is an orphan"),
    }

    let output = match command {
        Command::Install { .. } => serde_json::to_value(install(manager).await?)?,
        Command::Cleanup { .. } => serde_json::to_value(manager.cleanup().await?)?,
        Command::Sync { .. } => {
            let installed = install(manager).await?;
            let cleanup = manager.cleanup().await?;
            serde_json::to_value(SyncOutput { installed, cleanup })?
        }
    };

    Ok(output)
}

fn read_manifest(path: &Path) -> Result<serde_json::Value> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Run `install`, logging each entry failure before surfacing the aggregate error.
async fn install(manager: &PrecacheManager) -> Result<Vec<InstallResult>> {
    match manager.install().await {
        Ok(results) => Ok(results),
        Err(Error::InstallFailed { failed, total, failures }) => {
            for failure in &failures {
                tracing::error!(error = %failure, "entry not installed");
            }
            Err(Error::InstallFailed { failed, total, failures }.into())
        }
        Err(e) => Err(e.into()),
    }
}
