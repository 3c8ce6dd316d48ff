//! Task execution
//!
//! Runs the two task kinds against the injected collaborators. Execution
//! failures fall into exactly two classes: transient ones, where the
//! untouched task is worth re-queueing, and abandonment, where retrying
//! could loop forever on a permanently bad page and the task is dropped
//! after being logged.

use crate::catalog::{CatalogError, SetCatalog};
use crate::dispatch::queue::TaskQueue;
use crate::dispatch::task::{Task, TaskAction};
use crate::fetch::{FetchError, PageFetcher};
use crate::parse::parse_page;
use crate::store::RecordStore;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// How a task execution failed
#[derive(Debug, Error)]
pub enum TaskError {
    /// Likely to succeed on retry; the worker re-queues the original task
    #[error("transient failure: {0}")]
    Transient(String),

    /// Final for this task; it is logged and dropped, never retried
    #[error("{0}")]
    Abandoned(String),
}

/// Executes one task
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, task: &Task) -> Result<(), TaskError>;
}

/// The real executor: discovery and fetch against catalog, fetcher, store
pub struct HarvestExecutor {
    fetcher: Arc<dyn PageFetcher>,
    catalog: Arc<dyn SetCatalog>,
    store: Arc<dyn RecordStore>,
    queue: Arc<TaskQueue>,
}

impl HarvestExecutor {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        catalog: Arc<dyn SetCatalog>,
        store: Arc<dyn RecordStore>,
        queue: Arc<TaskQueue>,
    ) -> Self {
        Self {
            fetcher,
            catalog,
            store,
            queue,
        }
    }

    /// Enumerates a set and enqueues a fetch for every key not yet stored
    async fn discover_set(&self, set_name: &str) -> Result<(), TaskError> {
        let keys = self
            .catalog
            .items_in_set(set_name)
            .await
            .map_err(classify_catalog_error)?;

        let total = keys.len();
        let mut enqueued = 0usize;
        for key in keys {
            let stored = self
                .store
                .exists(&key)
                .map_err(|e| TaskError::Abandoned(format!("store lookup for {key}: {e}")))?;
            if stored {
                continue;
            }
            self.queue.push(Task::fetch_item(key));
            enqueued += 1;
        }

        tracing::info!(set = set_name, total, enqueued, "discovered set");
        Ok(())
    }

    /// Fetches one printing's page, parses it, and stores the record
    async fn fetch_item(&self, key: &str) -> Result<(), TaskError> {
        let url = self.catalog.item_page_url(key);
        let page = self
            .fetcher
            .fetch(&url)
            .await
            .map_err(classify_fetch_error)?;

        let record =
            parse_page(&page).map_err(|e| TaskError::Abandoned(format!("parse {key}: {e}")))?;

        self.store
            .write(key, &record)
            .map_err(|e| TaskError::Abandoned(format!("store {key}: {e}")))?;

        tracing::debug!(key, fields = record.len(), "stored record");
        Ok(())
    }
}

#[async_trait]
impl Executor for HarvestExecutor {
    async fn execute(&self, task: &Task) -> Result<(), TaskError> {
        match &task.action {
            TaskAction::DiscoverSet(set_name) => self.discover_set(set_name).await,
            TaskAction::FetchItem(key) => self.fetch_item(key).await,
        }
    }
}

fn classify_fetch_error(error: FetchError) -> TaskError {
    if error.is_transient() {
        TaskError::Transient(error.to_string())
    } else {
        TaskError::Abandoned(error.to_string())
    }
}

fn classify_catalog_error(error: CatalogError) -> TaskError {
    match error {
        CatalogError::Fetch(fetch) => classify_fetch_error(fetch),
        other => TaskError::Abandoned(other.to_string()),
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    //! In-process collaborator fakes shared by the dispatch tests

    use super::*;
    use crate::catalog::ItemKey;
    use crate::record::Record;
    use crate::store::{StoreError, StoreResult};
    use bytes::Bytes;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    /// Catalog with a fixed set -> keys mapping
    pub struct StaticCatalog {
        pub sets: Vec<String>,
        pub items: HashMap<String, Vec<ItemKey>>,
    }

    #[async_trait]
    impl SetCatalog for StaticCatalog {
        async fn list_sets(&self) -> Result<Vec<String>, CatalogError> {
            Ok(self.sets.clone())
        }

        async fn items_in_set(&self, set_name: &str) -> Result<Vec<ItemKey>, CatalogError> {
            Ok(self.items.get(set_name).cloned().unwrap_or_default())
        }

        fn item_page_url(&self, key: &str) -> String {
            format!("http://cards.test/{key}")
        }
    }

    /// Fetcher that serves one canned card page for every URL
    pub struct StubFetcher {
        pub body: String,
        pub calls: AtomicU64,
    }

    impl StubFetcher {
        pub fn serving(body: impl Into<String>) -> Self {
            Self {
                body: body.into(),
                calls: AtomicU64::new(0),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch(&self, _url: &str) -> Result<Bytes, FetchError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(Bytes::from(self.body.clone()))
        }
    }

    /// In-memory record store
    #[derive(Default)]
    pub struct MemoryStore {
        pub records: Mutex<BTreeMap<String, Record>>,
    }

    impl MemoryStore {
        pub fn with_keys(keys: &[&str]) -> Self {
            let store = Self::default();
            {
                let mut records = store.records.lock().unwrap();
                for key in keys {
                    records.insert(key.to_string(), Record::new());
                }
            }
            store
        }
    }

    impl RecordStore for MemoryStore {
        fn exists(&self, key: &str) -> StoreResult<bool> {
            Ok(self.records.lock().unwrap().contains_key(key))
        }

        fn write(&self, key: &str, record: &Record) -> StoreResult<()> {
            self.records
                .lock()
                .unwrap()
                .insert(key.to_string(), record.clone());
            Ok(())
        }

        fn read(&self, key: &str) -> StoreResult<Record> {
            self.records
                .lock()
                .unwrap()
                .get(key)
                .cloned()
                .ok_or_else(|| StoreError::Corrupt {
                    key: key.to_string(),
                    message: "missing".to_string(),
                })
        }

        fn list(&self) -> StoreResult<Vec<String>> {
            Ok(self.records.lock().unwrap().keys().cloned().collect())
        }
    }

    pub const CARD_PAGE: &str = r#"
        <html><body>
        <div class="label">Card Name:</div><div class="value">Test Card</div>
        <div class="label">Mana Cost:</div><div class="value"><img alt="1"><img alt="Blue"></div>
        <div class="label">Types:</div><div class="value">Instant</div>
        </body></html>
    "#;
}

#[cfg(test)]
mod tests {
    use super::fakes::*;
    use super::*;
    use crate::dispatch::task::TaskAction;
    use std::collections::HashMap;
    use std::sync::atomic::Ordering;

    fn executor_with(
        catalog: StaticCatalog,
        fetcher: Arc<StubFetcher>,
        store: Arc<MemoryStore>,
    ) -> (HarvestExecutor, Arc<TaskQueue>) {
        let queue = Arc::new(TaskQueue::new());
        let executor = HarvestExecutor::new(fetcher, Arc::new(catalog), store, queue.clone());
        (executor, queue)
    }

    #[tokio::test]
    async fn test_discovery_skips_stored_keys() {
        let catalog = StaticCatalog {
            sets: vec!["Alpha".to_string()],
            items: HashMap::from([(
                "Alpha".to_string(),
                vec!["A".to_string(), "B".to_string(), "C".to_string()],
            )]),
        };
        let store = Arc::new(MemoryStore::with_keys(&["A", "B"]));
        let fetcher = Arc::new(StubFetcher::serving(CARD_PAGE));
        let (executor, queue) = executor_with(catalog, fetcher, store);

        executor
            .execute(&Task::discover_set("Alpha"))
            .await
            .unwrap();

        assert_eq!(queue.len(), 1);
        let task = queue.try_pop().unwrap();
        assert_eq!(task.action, TaskAction::FetchItem("C".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_item_stores_parsed_record() {
        let catalog = StaticCatalog {
            sets: vec![],
            items: HashMap::new(),
        };
        let store = Arc::new(MemoryStore::default());
        let fetcher = Arc::new(StubFetcher::serving(CARD_PAGE));
        let (executor, _queue) = executor_with(catalog, fetcher.clone(), store.clone());

        executor.execute(&Task::fetch_item("101")).await.unwrap();

        assert_eq!(fetcher.calls.load(Ordering::Relaxed), 1);
        let record = store.read("101").unwrap();
        assert_eq!(record.get("Card Name:"), Some("Test Card"));
        assert_eq!(record.get("Mana Cost:"), Some("1U"));
    }

    #[tokio::test]
    async fn test_unparseable_page_abandons_task() {
        let catalog = StaticCatalog {
            sets: vec![],
            items: HashMap::new(),
        };
        let store = Arc::new(MemoryStore::default());
        let fetcher = Arc::new(StubFetcher::serving("<html><body>no fields</body></html>"));
        let (executor, _queue) = executor_with(catalog, fetcher, store.clone());

        let result = executor.execute(&Task::fetch_item("101")).await;
        assert!(matches!(result, Err(TaskError::Abandoned(_))));
        assert!(!store.exists("101").unwrap());
    }

    #[test]
    fn test_fetch_error_classification() {
        let transient = classify_fetch_error(FetchError::Timeout {
            url: "http://x".to_string(),
        });
        assert!(matches!(transient, TaskError::Transient(_)));

        let abandoned = classify_fetch_error(FetchError::Status {
            url: "http://x".to_string(),
            status: 404,
        });
        assert!(matches!(abandoned, TaskError::Abandoned(_)));
    }
}
