//! Remote catalog interface
//!
//! The catalog knows the two endpoint shapes the harvester understands:
//! the landing page listing every set, and the per-set checklist page
//! listing every printing's item key. The dispatch engine only ever sees
//! this trait; the Gatherer-specific URL and markup details live in the
//! site adapter.

mod gatherer;

pub use gatherer::GathererCatalog;

use crate::fetch::FetchError;
use async_trait::async_trait;
use thiserror::Error;

/// Opaque identifier of one fetchable printing (Gatherer's multiverse id)
pub type ItemKey = String;

/// Errors produced by catalog operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("invalid catalog URL: {0}")]
    InvalidUrl(String),

    #[error("extraction failed: {0}")]
    Extract(String),
}

/// Enumerates sets and the item keys within a set
#[async_trait]
pub trait SetCatalog: Send + Sync {
    /// Lists every set name the catalog knows about
    async fn list_sets(&self) -> Result<Vec<String>, CatalogError>;

    /// Lists the item keys of every printing in a set
    async fn items_in_set(&self, set_name: &str) -> Result<Vec<ItemKey>, CatalogError>;

    /// Builds the page URL for one item key
    fn item_page_url(&self, key: &str) -> String;
}
