//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{AppConfig, StorageBackend};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("database url is invalid: {0}")]
    DatabaseUrl(String),
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.timeouts.shutdown_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.shutdown_secs"));
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("limits.max_body_bytes"));
    }

    // Database settings only matter when they will be used.
    if config.storage.backend == StorageBackend::Postgres {
        let db = &config.database;
        if db.host.trim().is_empty() {
            errors.push(ValidationError::Empty("database.host"));
        }
        if db.user.trim().is_empty() {
            errors.push(ValidationError::Empty("database.user"));
        }
        if db.name.trim().is_empty() {
            errors.push(ValidationError::Empty("database.name"));
        }
        if db.port == 0 {
            errors.push(ValidationError::Zero("database.port"));
        }
        if db.max_connections == 0 {
            errors.push(ValidationError::Zero("database.max_connections"));
        }
        if let Err(e) = db.connection_url() {
            errors.push(ValidationError::DatabaseUrl(e.to_string()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
