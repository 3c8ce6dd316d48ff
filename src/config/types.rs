use serde::Deserialize;

/// Main configuration structure for the harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub pool: PoolSettings,
    pub fetch: FetchSettings,
    pub catalog: CatalogSettings,
    pub storage: StorageSettings,
}

/// Worker pool behavior
#[derive(Debug, Clone, Deserialize)]
pub struct PoolSettings {
    /// Maximum number of concurrently running workers
    pub workers: usize,

    /// How long a worker waits on an empty queue before exiting (seconds)
    #[serde(rename = "pop-timeout-secs")]
    pub pop_timeout_secs: u64,
}

/// HTTP client behavior
#[derive(Debug, Clone, Deserialize)]
pub struct FetchSettings {
    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// User agent sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

/// Remote catalog location
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    /// Root URL of the catalog site
    #[serde(rename = "base-url")]
    pub base_url: String,
}

/// Local persistence locations
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Directory holding one raw record file per fetched printing
    #[serde(rename = "records-dir")]
    pub records_dir: String,

    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}
