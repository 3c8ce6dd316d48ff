//! End-to-end tests for the gather/load pipeline
//!
//! These tests run the full engine against a wiremock server standing in
//! for the remote catalog: landing page, checklist pages, and card pages.

use cardhoard::config::{
    CatalogSettings, Config, FetchSettings, PoolSettings, StorageSettings,
};
use cardhoard::db;
use cardhoard::dispatch::run_gather;
use cardhoard::store::{FsRecordStore, RecordStore};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LANDING_PAGE: &str = r#"
<html><body>
<select name="format"><option>Standard</option></select>
<select name="set">
    <option>Alpha</option>
</select>
</body></html>
"#;

fn checklist_page(keys: &[&str]) -> String {
    let rows: Vec<String> = keys
        .iter()
        .map(|key| {
            format!(r#"<a href="/Pages/Card/Details.aspx?multiverseid={key}">Card {key}</a>"#)
        })
        .collect();
    format!("<html><body>{}</body></html>", rows.join("\n"))
}

fn card_page(name: &str) -> String {
    format!(
        r#"<html><body>
        <div class="label">Card Name:</div><div class="value">{name}</div>
        <div class="label">Mana Cost:</div><div class="value"><img alt="1"><img alt="White"></div>
        <div class="label">Converted Mana Cost:</div><div class="value">2</div>
        <div class="label">Types:</div><div class="value">Creature &#8212; Soldier</div>
        <div class="label">P/T:</div><div class="value">1 / 1</div>
        <div class="label">Rarity:</div><div class="value">Common</div>
        <div class="label">Expansion:</div><div class="value">Alpha</div>
        <div class="label">Artist:</div><div class="value">Test Artist</div>
        </body></html>"#
    )
}

fn test_config(base_url: &str, records_dir: &Path, db_path: &Path) -> Config {
    Config {
        pool: PoolSettings {
            workers: 8,
            pop_timeout_secs: 1,
        },
        fetch: FetchSettings {
            request_timeout_secs: 5,
            connect_timeout_secs: 5,
            user_agent: "cardhoard-test/0.1".to_string(),
        },
        catalog: CatalogSettings {
            base_url: base_url.to_string(),
        },
        storage: StorageSettings {
            records_dir: records_dir.to_string_lossy().into_owned(),
            database_path: db_path.to_string_lossy().into_owned(),
        },
    }
}

async fn mount_catalog(server: &MockServer, keys: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LANDING_PAGE))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/Pages/Search/Default.aspx"))
        .and(query_param("output", "checklist"))
        .respond_with(ResponseTemplate::new(200).set_body_string(checklist_page(keys)))
        .mount(server)
        .await;

    for key in keys {
        Mock::given(method("GET"))
            .and(path("/Pages/Card/Details.aspx"))
            .and(query_param("multiverseid", *key))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(card_page(&format!("Card {key}"))),
            )
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_gather_then_load() {
    let server = MockServer::start().await;
    mount_catalog(&server, &["101", "102"]).await;

    let dir = TempDir::new().unwrap();
    let records_dir = dir.path().join("records");
    let db_path = dir.path().join("harvest.db");
    let config = test_config(&server.uri(), &records_dir, &db_path);

    // One discovery plus two fetches.
    let report = run_gather(&config).await.unwrap();
    assert_eq!(report.tasks_completed, 3);

    let store = FsRecordStore::new(&records_dir).unwrap();
    let keys = store.list().unwrap();
    assert_eq!(keys, vec!["101".to_string(), "102".to_string()]);

    let record = store.read("101").unwrap();
    assert_eq!(record.get("Card Name:"), Some("Card 101"));
    assert_eq!(record.get("Mana Cost:"), Some("1W"));

    // Bulk-load into SQLite.
    let mut conn = db::open_database(&db_path).unwrap();
    let summary = db::load_store(&mut conn, &store).unwrap();
    assert_eq!(summary.loaded, 2);
    assert_eq!(summary.skipped, 0);

    let counts = db::table_counts(&conn).unwrap();
    assert_eq!(counts.sets, 1);
    assert_eq!(counts.cards, 2);
    assert_eq!(counts.printings, 2);
    assert_eq!(counts.artists, 1);
}

#[tokio::test]
async fn test_rerun_skips_stored_records() {
    let server = MockServer::start().await;
    mount_catalog(&server, &["201"]).await;

    let dir = TempDir::new().unwrap();
    let records_dir = dir.path().join("records");
    let db_path = dir.path().join("harvest.db");
    let config = test_config(&server.uri(), &records_dir, &db_path);

    let first = run_gather(&config).await.unwrap();
    assert_eq!(first.tasks_completed, 2);

    // Second run re-discovers the set but refetches nothing.
    let second = run_gather(&config).await.unwrap();
    assert_eq!(second.tasks_completed, 1);

    let store = FsRecordStore::new(&records_dir).unwrap();
    assert_eq!(store.list().unwrap().len(), 1);
}

#[tokio::test]
async fn test_transient_server_error_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LANDING_PAGE))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/Pages/Search/Default.aspx"))
        .and(query_param("output", "checklist"))
        .respond_with(ResponseTemplate::new(200).set_body_string(checklist_page(&["301"])))
        .mount(&server)
        .await;

    // First hit on the card page fails server-side; the task is re-queued
    // and a fresh worker cohort retries it.
    Mock::given(method("GET"))
        .and(path("/Pages/Card/Details.aspx"))
        .and(query_param("multiverseid", "301"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/Pages/Card/Details.aspx"))
        .and(query_param("multiverseid", "301"))
        .respond_with(ResponseTemplate::new(200).set_body_string(card_page("Card 301")))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let records_dir = dir.path().join("records");
    let db_path = dir.path().join("harvest.db");
    let mut config = test_config(&server.uri(), &records_dir, &db_path);
    config.pool.workers = 2;

    let report = run_gather(&config).await.unwrap();
    assert_eq!(report.tasks_completed, 2);

    let store = FsRecordStore::new(&records_dir).unwrap();
    assert!(store.exists("301").unwrap());
}

#[tokio::test]
async fn test_permanently_missing_page_is_dropped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LANDING_PAGE))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/Pages/Search/Default.aspx"))
        .and(query_param("output", "checklist"))
        .respond_with(ResponseTemplate::new(200).set_body_string(checklist_page(&["404404"])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/Pages/Card/Details.aspx"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let records_dir = dir.path().join("records");
    let db_path = dir.path().join("harvest.db");
    let config = test_config(&server.uri(), &records_dir, &db_path);

    // Only the discovery completes; the 404 fetch is abandoned, not retried.
    let report = run_gather(&config).await.unwrap();
    assert_eq!(report.tasks_completed, 1);

    let store = FsRecordStore::new(&records_dir).unwrap();
    assert!(store.list().unwrap().is_empty());
}
