//! Gatherer site adapter
//!
//! Implements [`SetCatalog`] against the Gatherer endpoints:
//! - the landing page carries the set list in its second `<select>` element;
//! - the checklist search page (`output=checklist`) links every printing in
//!   a set through `multiverseid` query parameters;
//! - a printing's page is addressed by `Details.aspx?multiverseid=<key>`.

use crate::catalog::{CatalogError, ItemKey, SetCatalog};
use crate::fetch::PageFetcher;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

const SEARCH_PATH: &str = "Pages/Search/Default.aspx";
const CARD_PATH: &str = "Pages/Card/Details.aspx";

/// Catalog implementation for gatherer.wizards.com
pub struct GathererCatalog {
    fetcher: Arc<dyn PageFetcher>,
    base_url: Url,
    search_url: Url,
    card_url: Url,
}

impl GathererCatalog {
    /// Creates a catalog rooted at `base_url` (e.g. `http://gatherer.wizards.com`)
    pub fn new(fetcher: Arc<dyn PageFetcher>, base_url: &str) -> Result<Self, CatalogError> {
        let base_url =
            Url::parse(base_url).map_err(|e| CatalogError::InvalidUrl(format!("{base_url}: {e}")))?;
        let search_url = base_url
            .join(SEARCH_PATH)
            .map_err(|e| CatalogError::InvalidUrl(e.to_string()))?;
        let card_url = base_url
            .join(CARD_PATH)
            .map_err(|e| CatalogError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            fetcher,
            base_url,
            search_url,
            card_url,
        })
    }

    /// Builds the checklist URL for one set
    fn checklist_url(&self, set_name: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("output", "checklist")
            .append_pair("set", &format!("[\"{set_name}\"]"));
        url
    }
}

#[async_trait]
impl SetCatalog for GathererCatalog {
    async fn list_sets(&self) -> Result<Vec<String>, CatalogError> {
        let body = self.fetcher.fetch(self.base_url.as_str()).await?;
        extract_set_names(&String::from_utf8_lossy(&body))
    }

    async fn items_in_set(&self, set_name: &str) -> Result<Vec<ItemKey>, CatalogError> {
        let url = self.checklist_url(set_name);
        let body = self.fetcher.fetch(url.as_str()).await?;
        Ok(extract_item_keys(
            &String::from_utf8_lossy(&body),
            &self.base_url,
        ))
    }

    fn item_page_url(&self, key: &str) -> String {
        let mut url = self.card_url.clone();
        url.query_pairs_mut().append_pair("multiverseid", key);
        url.into()
    }
}

fn selector(css: &str) -> Result<Selector, CatalogError> {
    Selector::parse(css).map_err(|e| CatalogError::Extract(format!("bad selector {css}: {e:?}")))
}

/// Pulls set names out of the landing page
///
/// The set dropdown is the second `<select>` on the page; its option texts
/// are the set names. Empty options are skipped.
fn extract_set_names(html: &str) -> Result<Vec<String>, CatalogError> {
    let document = Html::parse_document(html);
    let select_sel = selector("select")?;
    let option_sel = selector("option")?;

    let set_dropdown = document
        .select(&select_sel)
        .nth(1)
        .ok_or_else(|| CatalogError::Extract("set dropdown not found on landing page".to_string()))?;

    let sets: Vec<String> = set_dropdown
        .select(&option_sel)
        .map(|option| option.text().collect::<String>().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    if sets.is_empty() {
        return Err(CatalogError::Extract(
            "set dropdown contains no set names".to_string(),
        ));
    }

    Ok(sets)
}

/// Pulls item keys out of a checklist page
///
/// Every printing is linked with a `multiverseid` query parameter. Keys are
/// deduplicated in first-seen order; a checklist can reference the same
/// printing from more than one row.
fn extract_item_keys(html: &str, base_url: &Url) -> Vec<ItemKey> {
    let document = Html::parse_document(html);
    let Ok(link_sel) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut keys = Vec::new();

    for link in document.select(&link_sel) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = base_url.join(href.trim()) else {
            continue;
        };
        for (name, value) in resolved.query_pairs() {
            if name == "multiverseid" && seen.insert(value.to_string()) {
                keys.push(value.to_string());
            }
        }
    }

    keys
}
