//! Hash legacy plaintext passwords in the `users` collection.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use dashboard::domain::DashboardQueries;
use dashboard::outbound::persistence::{
    MongoCollectionAccessor, MongoConnectionManager, MongoConnector, MongoSettings,
};
use mockable::DefaultClock;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// `migrate-password-hashes` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "migrate-password-hashes",
    about = "Rewrite plaintext user passwords as Argon2id hashes",
    version
)]
struct CliArgs {
    /// Report what would change without writing.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(%error, "tracing init failed");
    }

    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: CliArgs) -> Result<()> {
    let settings = MongoSettings::load_from_env()
        .and_then(|raw| raw.resolve())
        .wrap_err("load MONGODB_* settings")?;
    let manager = Arc::new(MongoConnectionManager::new(MongoConnector, settings));
    let accessor = Arc::new(MongoCollectionAccessor::new(Arc::clone(&manager)));
    let queries = DashboardQueries::new(accessor, Arc::new(DefaultClock));

    let outcome = queries.migrate_password_hashes(args.dry_run).await;
    manager.close().await;
    let report = outcome.wrap_err("migrate password hashes")?;

    info!(
        dry_run = args.dry_run,
        scanned = report.scanned,
        already_hashed = report.already_hashed,
        migrated = report.migrated,
        skipped = report.skipped,
        "password hash migration finished"
    );
    Ok(())
}
