//! Configuration loading and validation
//!
//! Configuration comes from a single TOML file covering the worker pool,
//! the HTTP client, the catalog location, and the local storage paths.
//! Files are validated on load and hashed so runs can be tied to the
//! configuration that produced them.

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{CatalogSettings, Config, FetchSettings, PoolSettings, StorageSettings};
pub use validation::validate;
