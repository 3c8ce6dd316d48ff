//! Bulk record loading
//!
//! Walks every stored record and inserts the derived rows. Records that
//! fail to read back are skipped with a warning rather than aborting the
//! whole load; the summary reports both counts.

use crate::record::{labels, Record};
use crate::store::RecordStore;
use crate::HarvestError;
use rusqlite::{params, Connection, Transaction};

/// Outcome of one bulk load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    /// Records inserted (or matched by INSERT OR IGNORE)
    pub loaded: u64,

    /// Records skipped because they could not be read back
    pub skipped: u64,
}

/// Loads every stored record into the database in one transaction
pub fn load_store(conn: &mut Connection, store: &dyn RecordStore) -> Result<LoadSummary, HarvestError> {
    let tx = conn.transaction()?;
    let mut loaded = 0u64;
    let mut skipped = 0u64;

    for key in store.list()? {
        let record = match store.read(&key) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(%key, %err, "skipping unreadable record");
                skipped += 1;
                continue;
            }
        };
        insert_record(&tx, &key, &record)?;
        loaded += 1;
    }

    tx.commit()?;
    tracing::info!(loaded, skipped, "bulk load finished");
    Ok(LoadSummary { loaded, skipped })
}

/// Inserts the card, artist, and printing rows for one record
fn insert_record(tx: &Transaction, key: &str, record: &Record) -> Result<(), rusqlite::Error> {
    let name = record.get(labels::NAME);
    let mana_cost = record.get(labels::MANA_COST);
    let colors = colors_in(mana_cost);
    let cmc = record.get(labels::CMC).unwrap_or("0");
    let (power, toughness) = split_power_toughness(record.get(labels::POWER_TOUGHNESS));
    let (card_type, subtypes) = split_type_line(record.get(labels::TYPES));
    let rules = record.get(labels::CARD_TEXT);
    let flavor = record.get(labels::FLAVOR_TEXT);
    let rarity = record.get(labels::RARITY);
    let set_name = record.get(labels::EXPANSION);
    let artist = record.get(labels::ARTIST);

    tx.execute(
        "INSERT OR IGNORE INTO cards
         (name, mana_cost, cmc, types, subtypes, power, toughness, rules_text, colors)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![name, mana_cost, cmc, card_type, subtypes, power, toughness, rules, colors],
    )?;

    if let Some(artist) = artist {
        tx.execute(
            "INSERT OR IGNORE INTO artists (name) VALUES (?1)",
            params![artist],
        )?;
    }

    // A record can name a set the catalog listing never did (promo
    // printings); satisfy the printings foreign key either way.
    if let Some(set_name) = set_name {
        tx.execute(
            "INSERT OR IGNORE INTO sets (name) VALUES (?1)",
            params![set_name],
        )?;
    }

    tx.execute(
        "INSERT OR IGNORE INTO printings
         (multiverse_id, name, mtg_set, rarity, artist, flavor_text)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![key, name, set_name, rarity, artist, flavor],
    )?;

    Ok(())
}

/// The colors appearing in a mana cost, in WUBRG order
fn colors_in(mana_cost: Option<&str>) -> String {
    let Some(cost) = mana_cost else {
        return String::new();
    };
    "WUBRG".chars().filter(|&c| cost.contains(c)).collect()
}

/// Splits `P/T:` into its halves; absent or malformed values become NULLs
fn split_power_toughness(value: Option<&str>) -> (Option<String>, Option<String>) {
    match value.and_then(|v| v.split_once('/')) {
        Some((power, toughness)) => (
            Some(power.trim().to_string()),
            Some(toughness.trim().to_string()),
        ),
        None => (None, None),
    }
}

/// Splits a type line on the em dash into type and subtypes
fn split_type_line(value: Option<&str>) -> (Option<String>, Option<String>) {
    match value {
        None => (None, None),
        Some(line) => match line.split_once('\u{2014}') {
            Some((card_type, subtypes)) => (
                Some(card_type.trim().to_string()),
                Some(subtypes.trim().to_string()),
            ),
            None => (Some(line.trim().to_string()), None),
        },
    }
}
