//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use dedup_aggregator::{AggregatorConfig, DEFAULT_WORKER_COUNT};

use crate::error::AppError;

const DEFAULT_DATABASE_PATH: &str = "dedup_store.db";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Everything the binary needs to boot.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `SQLite` file backing the dedup store (`DATABASE_PATH`).
    pub database_path: PathBuf,
    /// Bind host (`HOST`).
    pub host: String,
    /// Bind port (`PORT`).
    pub port: u16,
    /// Worker pool settings (`WORKER_COUNT`).
    pub aggregator: AggregatorConfig,
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, applying defaults for
    /// missing keys.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a value is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup("DATABASE_PATH")
            .map_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH), PathBuf::from);
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => DEFAULT_PORT,
        };
        let worker_count = match lookup("WORKER_COUNT") {
            Some(raw) => raw.parse().map_err(|e| {
                AppError::Config(format!("WORKER_COUNT must be a positive integer: {e}"))
            })?,
            None => DEFAULT_WORKER_COUNT,
        };
        let aggregator = AggregatorConfig::new(worker_count)
            .map_err(|e| AppError::Config(format!("WORKER_COUNT is invalid: {e}")))?;

        Ok(Self {
            database_path,
            host,
            port,
            aggregator,
        })
    }

    /// The address to bind the listener to.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}
