//! Todo API service.
//!
//! A small HTTP service exposing CRUD over a single `todo` resource.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client Request
//!   ──────────────▶ request ID ─▶ metrics ─▶ access log ─▶ limits/timeout ─▶ handlers
//!                                                                              │
//!                                                                              ▼
//!   Client Response                                                      ┌───────────┐
//!   ◀────────────── X-Request-ID echoed, one log line, counter bumped ◀──│ TodoStore │
//!                                                                        │ memory or │
//!                                                                        │ postgres  │
//!                                                                        └───────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use todo_api::config::{self, AppConfig};
use todo_api::observability::init_logging;

#[derive(Parser)]
#[command(name = "todo-api")]
#[command(about = "HTTP CRUD service for todos", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => AppConfig::default(),
    };
    config::apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    config::validate_config(&config).map_err(config::ConfigError::Validation)?;

    init_logging(&config.observability);

    tracing::info!("todo-api v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        storage = ?config.storage.backend,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    todo_api::lifecycle::serve(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
