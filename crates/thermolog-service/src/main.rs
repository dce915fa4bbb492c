//! Thermolog Service - Sensor poller and HTTP API.
//!
//! Run with: `cargo run -p thermolog-service`

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use thermolog_service::{AppState, Config, Poller, api};
use thermolog_store::Store;

/// Thermolog Service - Sensor poller and HTTP REST API.
#[derive(Parser, Debug)]
#[command(name = "thermolog-service")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address (overrides config).
    #[arg(short, long)]
    bind: Option<String>,

    /// Database path (overrides config).
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Disable the background poller (API only mode).
    #[arg(long)]
    no_poller: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("thermolog_service=info".parse()?)
                .add_directive("thermolog_store=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default().unwrap_or_default(),
    };

    // Override config with CLI args
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(db_path) = args.database {
        config.storage.path = db_path;
    }
    config.validate()?;

    // Open the database (schema initialization happens inside)
    let db_path = config.storage.path.clone();
    let store = Store::open(&db_path)?;

    // Sensor capability for this platform
    let sensor = thermolog_sensor::create_sensor();

    // Create application state and load the runtime configuration.
    // A missing configuration row after seeding is fatal.
    let state = AppState::new(store, db_path, config.clone(), Some(sensor));
    {
        let store = state.store.lock().await;
        state.config.initialize(&store).await?;
    }

    // Start the background poller when enabled
    let poller = Poller::new(Arc::clone(&state));
    if args.no_poller {
        info!("Background poller disabled");
    } else if state.config.current().await.use_sensor {
        poller.start().await;
    } else {
        info!("Sensor disabled in configuration; poller not started");
    }

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
        .with_state(Arc::clone(&state));

    // Parse bind address
    let addr: SocketAddr = config.server.bind.parse()?;

    info!("Starting server on {}", addr);

    // Run the server; ctrl-c stops the poller before exit so the last
    // iteration finishes cleanly.
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if poller.is_running() {
        info!("Shutting down, stopping poller");
        poller.stop().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install shutdown signal handler: {}", e);
    }
}
