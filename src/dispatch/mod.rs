//! Concurrent task-dispatch engine
//!
//! The core of the harvester: a priority task queue, a bounded
//! self-scaling worker pool, and the two task kinds (set discovery and
//! per-item fetch). Discovery tasks expand into fetch tasks pushed back
//! into the same queue; the pool drains everything to terminal quiescence
//! and reports elapsed time and completed-task count exactly once.

mod execute;
mod pool;
mod queue;
mod task;

pub use execute::{Executor, HarvestExecutor, TaskError};
pub use pool::{PoolConfig, PoolState, RunReport, WorkerPool};
pub use queue::TaskQueue;
pub use task::{Task, TaskAction, DISCOVER_PRIORITY, FETCH_PRIORITY};

use crate::catalog::{GathererCatalog, SetCatalog};
use crate::config::Config;
use crate::db;
use crate::fetch::{HttpFetcher, PageFetcher};
use crate::store::FsRecordStore;
use crate::HarvestError;
use std::sync::Arc;

/// Runs a complete gather: discover every set, fetch every printing not
/// yet stored, and record the set names in the database
///
/// Safe to interrupt and re-run: discovery skips keys that already have a
/// stored record.
pub async fn run_gather(config: &Config) -> Result<RunReport, HarvestError> {
    let store = Arc::new(FsRecordStore::new(&config.storage.records_dir)?);
    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&config.fetch)?);
    let catalog: Arc<dyn SetCatalog> = Arc::new(GathererCatalog::new(
        fetcher.clone(),
        &config.catalog.base_url,
    )?);

    let sets = catalog.list_sets().await?;
    tracing::info!(sets = sets.len(), "listed catalog sets");

    {
        let conn = db::open_database(std::path::Path::new(&config.storage.database_path))?;
        db::record_sets(&conn, &sets)?;
    }

    let queue = Arc::new(TaskQueue::new());
    for set_name in &sets {
        queue.push(Task::discover_set(set_name.clone()));
    }

    let executor = Arc::new(HarvestExecutor::new(fetcher, catalog, store, queue.clone()));
    let pool = WorkerPool::new(queue, executor, PoolConfig::from_settings(&config.pool));

    Ok(pool.run().await)
}
