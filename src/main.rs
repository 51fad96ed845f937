//! # Soletrack Sync Service Entry Point
//!
//! Serves the HTTP API by default; subcommands expose the worker, status
//! derivation, retry, and migrations for operators and cron.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use soletrack::adapters::AdapterRegistry;
use soletrack::config::ConfigLoader;
use soletrack::models::sync_job::Provider;
use soletrack::repositories::SyncJobRepository;
use soletrack::server::run_server;
use soletrack::sync::{BatchWorker, RetryController, StatusService};
use soletrack::{db, telemetry};

#[derive(Parser)]
#[command(name = "soletrack", version, about = "Sneaker market-data sync service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server (default)
    Serve,
    /// Claim and process one batch of eligible sync jobs
    Worker {
        /// Override the configured batch size
        #[arg(long)]
        limit: Option<u64>,
        /// Restrict the batch to one provider
        #[arg(long)]
        provider: Option<Provider>,
    },
    /// Print the derived sync status for a style
    Status {
        /// Style identifier, any case
        style_id: String,
    },
    /// Enqueue retry jobs for a style
    Retry {
        style_id: String,
        #[arg(long)]
        provider: Option<Provider>,
    },
    /// Print queue counts by job status
    Stats,
    /// Apply pending database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::new().load().context("loading configuration")?;
    telemetry::init_tracing(&config);
    tracing::info!(profile = %config.profile, "Configuration loaded");
    if let Ok(redacted) = config.redacted_json() {
        tracing::debug!(config = %redacted, "Effective configuration");
    }

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let db = db::init_pool(&config).await?;
            run_server(config, db)
                .await
                .map_err(|e| anyhow::anyhow!("server error: {e}"))?;
        }
        Command::Worker { limit, provider } => {
            let db = db::init_pool(&config).await?;
            let adapters = AdapterRegistry::from_config(&config, db.clone());
            let worker = BatchWorker::new(db, adapters, &config.worker);
            let report = worker.process_batch(limit, provider).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Status { style_id } => {
            let db = db::init_pool(&config).await?;
            let status = StatusService::new(db).get_sync_status(&style_id).await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Retry { style_id, provider } => {
            let db = db::init_pool(&config).await?;
            let controller = RetryController::new(db, config.worker.max_attempts);
            let outcome = controller.retry_sync(&style_id, provider).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Stats => {
            let db = db::init_pool(&config).await?;
            let stats = SyncJobRepository::new(db).queue_stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Migrate => {
            let db = db::init_pool(&config).await?;
            Migrator::up(&db, None).await.context("running migrations")?;
            println!("Migrations applied");
        }
    }

    Ok(())
}
