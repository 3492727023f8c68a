//! curator - catalog enrichment runner
//!
//! Runs enrichment under the job lock and manages lock files left behind by
//! crashed runs.

#![allow(missing_docs)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use curator_rs::services::SearchQuery;
use curator_rs::utils::logging::init_logging;
use curator_rs::{CatalogClient, Config, EnrichmentJob, ExclusiveLock, JobOutcome, JobRunner};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const ENRICH_JOB_KEY: &str = "enrich";

#[derive(Debug, Parser)]
#[command(name = "curator", version, about = "Catalog enrichment with job locking")]
struct Cli {
    /// YAML configuration file; defaults plus CURATOR_* variables when omitted
    #[arg(short, long, global = true, env = "CURATOR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Look titles up in the catalog under the enrichment lock
    Enrich {
        /// Title to enrich, optionally suffixed with `:YEAR`
        #[arg(short, long = "title", required = true)]
        titles: Vec<SearchQuery>,

        /// Seconds to wait for the job lock (defaults to lock.timeout_secs)
        #[arg(long)]
        wait_secs: Option<u64>,
    },
    /// Remove a lock file, e.g. after a crashed run
    Unlock { key: String },
    /// Show who holds a lock
    Status { key: String },
}

async fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)
            .await
            .with_context(|| format!("loading {}", path.display()))?
            .with_env_overrides()?,
        None => Config::from_env()?,
    };
    Ok(config)
}

fn job_lock(config: &Config) -> ExclusiveLock {
    match &config.lock().dir {
        Some(dir) => ExclusiveLock::file(dir),
        None => {
            warn!("No lock directory configured, locks are process-local");
            ExclusiveLock::in_memory()
        }
    }
}

async fn enrich(
    config: &Config,
    titles: Vec<SearchQuery>,
    wait: Duration,
    cancel: &CancellationToken,
) -> anyhow::Result<bool> {
    let catalog = Arc::new(CatalogClient::from_config(config)?);
    catalog.cache().start_default_sweeper()?;
    let job = EnrichmentJob::new(catalog.clone());
    let runner = JobRunner::new(job_lock(config));

    let outcome = runner
        .run(ENRICH_JOB_KEY, wait, cancel, || job.run(cancel, &titles))
        .await
        .context("enrichment failed")?;
    catalog.cache().close();

    let report = match outcome {
        JobOutcome::Completed(report) => report,
        JobOutcome::AlreadyRunning => {
            println!("Another enrichment run holds the lock, nothing to do");
            return Ok(true);
        }
    };

    for enriched in &report.enriched {
        println!(
            "{} -> #{} {} ({})",
            enriched.query,
            enriched.item.id,
            enriched.item.title,
            enriched.item.release_date.as_deref().unwrap_or("unknown date")
        );
    }
    for query in &report.not_found {
        println!("{} -> not found", query);
    }
    for query in &report.skipped {
        println!("{} -> skipped, catalog unavailable", query);
    }
    for (query, reason) in &report.failed {
        println!("{} -> failed: {}", query, reason);
    }

    Ok(report.is_clean())
}

async fn run(cli: Cli, config: Config, cancel: CancellationToken) -> anyhow::Result<bool> {
    match cli.command {
        Command::Enrich { titles, wait_secs } => {
            let wait = wait_secs
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.lock().timeout());
            enrich(&config, titles, wait, &cancel).await
        }
        Command::Unlock { key } => {
            let lock = job_lock(&config);
            if !lock.is_locked(&key)? {
                println!("{} is not locked", key);
                return Ok(true);
            }
            lock.release(&key)?;
            info!("Removed lock {}", key);
            println!("Removed lock {}", key);
            Ok(true)
        }
        Command::Status { key } => {
            match job_lock(&config).holder(&key)? {
                Some(holder) => {
                    let pid = holder
                        .pid
                        .map(|pid| pid.to_string())
                        .unwrap_or_else(|| "unknown".to_string());
                    println!(
                        "{} is held by pid {} since {}",
                        key,
                        pid,
                        holder.acquired_at.to_rfc3339()
                    );
                }
                None => println!("{} is free", key),
            }
            Ok(true)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env is optional
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_logging(config.logging()) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Ctrl+C received, cancelling");
                cancel.cancel();
            }
        }
    });

    match run(cli, config, cancel).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            error!("Command failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            if let Some(source) = e.downcast_ref::<curator_rs::CuratorError>() {
                if source.is_cancelled() {
                    return ExitCode::from(130);
                }
            }
            ExitCode::FAILURE
        }
    }
}
