//! `rackwatch` — replica placement audit tool.
//!
//! Operator CLI over the Rackwatch audit engine.
//!
//! # Usage
//!
//! ```text
//! rackwatch -s cluster.json blocks '/data/*'      # list blocks and nodes
//! rackwatch -s cluster.json audit                 # find misplaced files
//! rackwatch -s cluster.json audit --repair 5      # bump/wait/reset cycle
//! rackwatch -s cluster.json -c rackwatch.toml audit --root /data
//! ```

mod config;
mod lister;
mod snapshot;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rackwatch_audit::{Auditor, ConsoleReporter, ConvergenceOutcome, ConvergenceWaiter};
use rackwatch_fs::{BlockService, MemoryCluster, Namespace, Walker};
use rackwatch_policy::RackDiversityPolicy;
use tokio::sync::watch;
use tracing::{info, warn};

use config::CliConfig;

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "rackwatch",
    version,
    about = "Audit and repair replica placement in a block-storage cluster"
)]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// JSON cluster snapshot to run against.
    #[arg(short, long)]
    snapshot: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display the block names and locations of the files matching the
    /// given glob patterns.
    Blocks {
        /// Path patterns, e.g. `/data/*` or `/logs/2026-*/part-*`.
        patterns: Vec<String>,
    },

    /// Find files whose block placement violates the rack-diversity
    /// policy.
    Audit {
        /// Subtree to audit.
        #[arg(long, default_value = "/")]
        root: String,

        /// Repair violations by raising replication to this factor,
        /// waiting for convergence, then restoring each file's original
        /// factor. Without this flag the audit only reports.
        #[arg(long, value_name = "FACTOR")]
        repair: Option<u16>,
    },
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;

    setup_tracing(&config.log.level);

    let cluster =
        Arc::new(snapshot::load(&cli.snapshot).context("failed to load cluster snapshot")?);

    match cli.command {
        Commands::Blocks { patterns } => cmd_blocks(cluster, &patterns).await,
        Commands::Audit { root, repair } => cmd_audit(cluster, &config, &root, repair).await,
    }
}

/// Initialize the `tracing` subscriber with the given level filter.
///
/// Respects `RUST_LOG` env var if set, otherwise uses the config value.
fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

// -----------------------------------------------------------------------
// rackwatch blocks
// -----------------------------------------------------------------------

async fn cmd_blocks(cluster: Arc<MemoryCluster>, patterns: &[String]) -> Result<()> {
    let mut compiled = Vec::with_capacity(patterns.len());
    for p in patterns {
        compiled.push(glob::Pattern::new(p).with_context(|| format!("invalid pattern `{p}`"))?);
    }

    let mut walker = Walker::open(cluster.as_ref(), "/").await?;
    while let Some(file) = walker.next().await? {
        if !compiled.iter().any(|p| p.matches(&file.path)) {
            continue;
        }

        let lookup = cluster.block_locations(&file.path, 0, file.len).await?;
        lister::write_file_blocks(&mut std::io::stdout(), &file.path, &lookup)?;
    }
    Ok(())
}

// -----------------------------------------------------------------------
// rackwatch audit
// -----------------------------------------------------------------------

async fn cmd_audit(
    cluster: Arc<MemoryCluster>,
    config: &CliConfig,
    root: &str,
    repair: Option<u16>,
) -> Result<()> {
    let auditor = Auditor::new(
        cluster.clone(),
        cluster.clone(),
        cluster.clone(),
        Arc::new(RackDiversityPolicy),
    );
    let mut reporter = ConsoleReporter;
    let report = auditor.audit(root, &mut reporter).await?;

    let Some(target) = repair else {
        return Ok(());
    };
    if report.violating_files.is_empty() {
        info!("no violations found, nothing to repair");
        return Ok(());
    }

    // Remember each file's current factor so it can be restored after
    // the extra replicas have forced better placement.
    let mut originals = Vec::new();
    for path in &report.violating_files {
        match cluster.stat(path).await? {
            Some(meta) => originals.push((path.clone(), meta.replication)),
            None => warn!(%path, "file disappeared before repair"),
        }
    }

    println!("Increasing replication on {} files.", originals.len());
    for (path, _) in &originals {
        if !cluster.set_replication(path, target).await? {
            warn!(%path, "file disappeared before repair");
        }
    }

    // Ctrl-C flips the cancellation signal the waiter checks between
    // polls, so a stuck wait can be abandoned cleanly.
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = cancel_tx.send(true);
        }
    });

    println!("Waiting for files to replicate");
    let waiter = ConvergenceWaiter::new(cluster.clone(), cluster.clone(), config.waiter_config());
    let paths: Vec<String> = originals.iter().map(|(p, _)| p.clone()).collect();
    let outcomes = waiter
        .wait_for_replication(&paths, target, Some(cancel_rx), &mut reporter)
        .await?;

    println!("Resetting replication on files.");
    for ((path, factor), (_, outcome)) in originals.iter().zip(&outcomes) {
        match outcome {
            ConvergenceOutcome::Satisfied => {
                cluster.set_replication(path, *factor).await?;
            }
            other => {
                warn!(%path, outcome = ?other, "leaving replication raised, file did not converge");
            }
        }
    }
    println!("Done.");
    Ok(())
}
