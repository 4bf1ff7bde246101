//! Gasoo Service - HTTP API and usage simulator.
//!
//! Run with: `cargo run -p gasoo-service`

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use gasoo_service::{AppState, Config, Simulator, StorageBackend, api};
use gasoo_store::{MemoryStore, ReadingStore, Store};

/// Gasoo Service - HTTP REST API for gas-cylinder readings.
#[derive(Parser, Debug)]
#[command(name = "gasoo-service")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address (overrides config and environment).
    #[arg(short, long)]
    bind: Option<String>,

    /// Database path (overrides config and environment).
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Keep readings in memory only; nothing survives a restart.
    #[arg(long)]
    memory: bool,

    /// Disable the usage simulator (API only mode).
    #[arg(long)]
    no_simulator: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gasoo_service=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    // Load configuration: file, then environment, then flags
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default().unwrap_or_default(),
    };
    config.apply_env_overrides()?;

    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(db_path) = args.database {
        config.storage.path = db_path;
    }
    if args.memory {
        config.storage.backend = StorageBackend::Memory;
    }
    if args.no_simulator {
        config.simulation.enabled = false;
    }
    config.validate()?;

    let store: Box<dyn ReadingStore> = match config.storage.backend {
        StorageBackend::Sqlite => Box::new(Store::open(&config.storage.path)?),
        StorageBackend::Memory => {
            info!("Using in-memory storage; readings are lost on restart");
            Box::new(MemoryStore::new())
        }
    };

    let addr: SocketAddr = config.server.bind.parse()?;
    let state = AppState::with_boxed_store(store, config);

    Simulator::new(Arc::clone(&state)).start().await;

    // Build the router
    let app = Router::new()
        .merge(api::router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
