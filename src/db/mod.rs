//! Relational store
//!
//! The bulk-load side of the pipeline: stored raw records are read back
//! and inserted into a SQLite database of sets, artists, cards, and
//! printings. Everything is `INSERT OR IGNORE`, so loading is idempotent
//! and can be re-run after every gather.

mod loader;
mod schema;

pub use loader::{load_store, LoadSummary};
pub use schema::initialize_schema;

use rusqlite::Connection;
use std::path::Path;

/// Opens (creating if needed) the harvest database and ensures its schema
pub fn open_database(path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;

    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
    ",
    )?;

    initialize_schema(&conn)?;
    Ok(conn)
}

/// Records set names discovered from the catalog
pub fn record_sets(conn: &Connection, set_names: &[String]) -> Result<(), rusqlite::Error> {
    let mut stmt = conn.prepare("INSERT OR IGNORE INTO sets (name) VALUES (?1)")?;
    for name in set_names {
        stmt.execute([name])?;
    }
    Ok(())
}

/// Row counts per table, for the stats report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCounts {
    pub sets: u64,
    pub artists: u64,
    pub cards: u64,
    pub printings: u64,
}

/// Counts the rows in every table
pub fn table_counts(conn: &Connection) -> Result<TableCounts, rusqlite::Error> {
    let count = |table: &str| -> Result<u64, rusqlite::Error> {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get(0)
        })
    };

    Ok(TableCounts {
        sets: count("sets")?,
        artists: count("artists")?,
        cards: count("cards")?,
        printings: count("printings")?,
    })
}
