//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {reason}")]
    Env { var: &'static str, reason: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Override file values with environment variables.
///
/// Recognized: `PORT`, `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASS`, `DB_NAME`,
/// `TODO_STORAGE` and `LOG_LEVEL`. `lookup` is normally `std::env::var(..).ok()`.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup("PORT") {
        let port: u16 = parse_env("PORT", &port)?;
        config.listener.bind_address = replace_port(&config.listener.bind_address, port);
    }

    let db = &mut config.database;
    if let Some(host) = lookup("DB_HOST") {
        db.host = host;
    }
    if let Some(port) = lookup("DB_PORT") {
        db.port = parse_env("DB_PORT", &port)?;
    }
    if let Some(user) = lookup("DB_USER") {
        db.user = user;
    }
    if let Some(pass) = lookup("DB_PASS") {
        db.password = pass;
    }
    if let Some(name) = lookup("DB_NAME") {
        db.name = name;
    }

    if let Some(backend) = lookup("TODO_STORAGE") {
        config.storage.backend = backend.parse().map_err(|reason| ConfigError::Env {
            var: "TODO_STORAGE",
            reason,
        })?;
    }
    if let Some(level) = lookup("LOG_LEVEL") {
        config.observability.log_level = level;
    }

    Ok(())
}

fn parse_env<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Env {
        var,
        reason: format!("'{}': {}", value, e),
    })
}

/// Swap the port of a `host:port` address, keeping the host part.
fn replace_port(bind_address: &str, port: u16) -> String {
    let host = match bind_address.rsplit_once(':') {
        Some((host, _)) if !host.is_empty() => host,
        _ => "0.0.0.0",
    };
    format!("{}:{}", host, port)
}
