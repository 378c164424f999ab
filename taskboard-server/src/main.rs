//! `taskboard` development API server.
//!
//! An axum REST server that keeps tasks in memory and assigns their ids.
//! Point the `taskboard` client at it with `--api-url`.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 127.0.0.1:3000
//! cargo run --bin taskboard-server
//!
//! # Custom address with preloaded tasks
//! cargo run --bin taskboard-server -- --bind 0.0.0.0:8080 --seed tasks.json
//! ```

use std::sync::Arc;

use clap::Parser;
use taskboard_proto::codec;
use taskboard_server::api::{self, ApiState};
use taskboard_server::config::{ServerCliArgs, ServerConfig};
use taskboard_server::repository::TaskRepository;

#[tokio::main]
async fn main() {
    let cli = ServerCliArgs::parse();

    // Load config from CLI args + config file + env vars + defaults.
    let config = match ServerConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing with the resolved log level.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let repository = match load_repository(&config) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "failed to load seed tasks");
            std::process::exit(1);
        }
    };

    tracing::info!(addr = %config.bind_addr, "starting taskboard api server");

    let state = Arc::new(ApiState::new(repository));

    match api::start_server_with_state(&config.bind_addr.to_string(), state).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "task api listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "task api server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start task api server");
            std::process::exit(1);
        }
    }
}

/// Builds the repository, preloading the seed file when one is configured.
fn load_repository(
    config: &ServerConfig,
) -> Result<TaskRepository, Box<dyn std::error::Error + Send + Sync>> {
    let Some(path) = &config.seed else {
        return Ok(TaskRepository::new());
    };
    let contents = std::fs::read_to_string(path)?;
    let tasks = codec::decode_snapshot(&contents)?;
    tracing::info!(count = tasks.len(), path = %path.display(), "seeding tasks");
    Ok(TaskRepository::with_tasks(tasks)?)
}
