//! Monolith Server - demo HTTP service for container platforms

mod env;
mod handlers;
mod middleware;
mod response;
mod runtime;
mod server;
mod static_files;
mod stats;
mod writer;

use anyhow::Result;
use monolith_common::MonolithConfig;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::env::EnvResolver;
use crate::stats::Counters;
use crate::writer::LogWriter;

/// Shared application state
pub struct AppState {
    pub config: MonolithConfig,
    pub counters: Counters,
    pub env: EnvResolver,
    pub writer: LogWriter,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: MonolithConfig, env: EnvResolver) -> Self {
        let writer = LogWriter::new(config.storage.log_dir.clone());
        Self {
            config,
            counters: Counters::new(),
            env,
            writer,
            start_time: Instant::now(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("monolith=info".parse()?),
        )
        .init();

    match dotenv::dotenv() {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) => warn!("No .env file loaded ({}), using process environment", e),
    }

    info!("Starting Monolith Server v{}", env!("CARGO_PKG_VERSION"));
    info!("Runtime: {}", runtime::runtime_version());
    info!(
        "CPUs: {}",
        std::thread::available_parallelism().map_or(1, |n| n.get())
    );

    // Determine config path
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("monolith.toml"));

    let config = if config_path.exists() {
        info!("Loading configuration from {}", config_path.display());
        MonolithConfig::load(&config_path)?
    } else {
        info!("No configuration file found, using defaults");
        MonolithConfig::default()
    };

    let env = EnvResolver::Process;
    info!("APP_NAME: {}", env.resolve(env::APP_NAME, "not set"));
    info!("APP_ENV: {}", env.resolve(env::APP_ENV, "not set"));
    info!("DB_USER: {}", env.resolve(env::DB_USER, "not set"));
    match env.hostname().await {
        Some(hostname) => info!("Hostname: {}", hostname),
        None => warn!("Failed to determine hostname"),
    }

    let log_dir = &config.storage.log_dir;
    if log_dir.is_dir() {
        info!("Data directory {} exists", log_dir.display());
    } else {
        warn!(
            "Data directory {} does not exist, it will be created on first write",
            log_dir.display()
        );
    }

    let state = Arc::new(AppState::new(config, env));

    let listener = match server::bind(&state).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Server failed to start: {}", e);
            std::process::exit(1);
        }
    };

    info!("Routes:");
    info!("  GET  /            static files");
    info!("  GET  /api/info    application info");
    info!("  POST /api/write   write volume data");
    info!("  GET  /api/stats   application statistics");
    info!("  GET  /health      health check");

    let server_state = state.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::run_server(listener, server_state).await {
            error!("HTTP server error: {}", e);
        }
    });

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
        result = server_handle => {
            if let Err(e) = result {
                error!("Server task failed: {}", e);
            }
        }
    }

    info!("Monolith Server shutdown complete");
    Ok(())
}
