//! Service configuration.
//!
//! Loaded in layers: defaults in code, then an optional `config/boxstock`
//! file (any format the `config` crate understands), then `BOXSTOCK__*`
//! environment variables, e.g. `BOXSTOCK__SERVER__PORT=9000`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::services::{bulk_import_service::ImportLimits, inventory_aggregator::LOW_STOCK_THRESHOLD};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub inventory: InventoryConfig,
    pub import: ImportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SurrealDB namespace
    pub namespace: String,
    /// SurrealDB database within the namespace
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InventoryConfig {
    /// Box quantities below this (and above zero) are reported as low stock
    pub low_stock_threshold: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    pub max_file_size_bytes: u64,
    pub max_displayed_warnings: usize,
    pub preview_rows: usize,
}

impl From<&ImportConfig> for ImportLimits {
    fn from(config: &ImportConfig) -> Self {
        ImportLimits {
            max_file_size_bytes: config.max_file_size_bytes,
            max_displayed_warnings: config.max_displayed_warnings,
            preview_rows: config.preview_rows,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::with_name("config/boxstock").required(false))
            .add_source(Environment::with_prefix("BOXSTOCK").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Built-in defaults only, ignoring files and the environment.
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let limits = ImportLimits::default();
        Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8081)?
            .set_default("database.namespace", "inventory")?
            .set_default("database.database", "boxstock")?
            .set_default("inventory.low_stock_threshold", LOW_STOCK_THRESHOLD)?
            .set_default("import.max_file_size_bytes", limits.max_file_size_bytes)?
            .set_default("import.max_displayed_warnings", limits.max_displayed_warnings as u64)?
            .set_default("import.preview_rows", limits.preview_rows as u64)
    }
}
