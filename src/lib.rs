//! Cardhoard: a card-catalog harvester
//!
//! This crate harvests every printed variant of a trading card from the
//! Gatherer catalog, persisting each printing as a raw record keyed by its
//! multiverse id, and bulk-loads those records into a SQLite database.

pub mod catalog;
pub mod config;
pub mod db;
pub mod dispatch;
pub mod fetch;
pub mod parse;
pub mod record;
pub mod store;

use thiserror::Error;

/// Main error type for harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] catalog::CatalogError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] fetch::FetchError),

    #[error("Page parse error: {0}")]
    Parse(#[from] parse::ParseError),

    #[error("Record store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use dispatch::{RunReport, Task, TaskAction, TaskQueue, WorkerPool};
pub use record::Record;
