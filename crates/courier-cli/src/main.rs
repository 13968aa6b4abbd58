use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use courier_core::app::{Dispatcher, RetryPolicy, ScanScheduler};
use courier_core::config::CourierConfig;
use courier_core::impls::{HttpTransport, SqliteItemStore};
use courier_core::ports::ItemStore;
use courier_core::typed::PayloadRegistry;

/// Outbox dispatcher: sends stored updates as HTTP PATCH requests.
#[derive(Debug, Parser)]
#[command(name = "courier", version)]
struct Cli {
    /// Path to the YAML config file (defaults to ./courier.yml if present)
    #[arg(short, long, env = "COURIER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan on the configured interval until Ctrl-C
    Run,
    /// Run a single scan and print its summary
    Scan,
    /// List the items currently waiting to be sent
    Pending,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CourierConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    init_tracing(&config);
    info!(?config, "configuration loaded");

    let store = SqliteItemStore::open(&config.database_path)
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;

    match cli.command {
        Command::Run => run(&config, store).await,
        Command::Scan => scan(&config, store).await,
        Command::Pending => pending(store).await,
    }
}

fn init_tracing(config: &CourierConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

fn build_dispatcher(config: &CourierConfig, store: SqliteItemStore) -> Result<Dispatcher> {
    let mut registry = PayloadRegistry::new();
    for payload_type in &config.payload_types {
        registry.register_json(payload_type.as_str())?;
    }
    if config.payload_types.is_empty() {
        warn!("no payload_types configured, every item will fail to decode");
    }

    let transport = HttpTransport::from_config(&config.http)?;

    let dispatcher = Dispatcher::builder()
        .store(Arc::new(store))
        .registry(registry)
        .transport(Arc::new(transport))
        .retry_policy(RetryPolicy::from(&config.retry))
        .concurrency(config.concurrency)
        .build()?;
    Ok(dispatcher)
}

async fn run(config: &CourierConfig, store: SqliteItemStore) -> Result<()> {
    let dispatcher = Arc::new(build_dispatcher(config, store)?);
    let scheduler = ScanScheduler::start(dispatcher, config.scan_interval());

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    info!("Ctrl-C received, waiting for the current scan to finish");

    scheduler.shutdown().await;
    Ok(())
}

async fn scan(config: &CourierConfig, store: SqliteItemStore) -> Result<()> {
    let dispatcher = build_dispatcher(config, store)?;
    let report = dispatcher.dispatch_all().await?;
    println!("{report}");
    Ok(())
}

async fn pending(store: SqliteItemStore) -> Result<()> {
    let items = store.list_pending().await?;
    for item in &items {
        println!(
            "{}\t{}\t{}\t{}",
            item.id(),
            item.created_at().to_rfc3339(),
            item.payload_type(),
            item.target_uri()
        );
    }
    println!("{} pending", items.len());
    Ok(())
}
