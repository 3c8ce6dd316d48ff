//! Database schema
//!
//! Four tables: `sets` and `artists` are plain name registries; `cards`
//! holds one row per distinct card name; `printings` ties a multiverse id
//! to its card, set, and artist. Power and toughness are TEXT because the
//! catalog uses non-numeric values (`*`, `.5`) on some cards.

use rusqlite::Connection;

/// Creates all tables if they do not exist yet
pub fn initialize_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS sets (
            name TEXT PRIMARY KEY
        );

        CREATE TABLE IF NOT EXISTS artists (
            name TEXT PRIMARY KEY
        );

        CREATE TABLE IF NOT EXISTS cards (
            name TEXT PRIMARY KEY,
            mana_cost TEXT,
            cmc INTEGER,
            types TEXT,
            subtypes TEXT,
            power TEXT,
            toughness TEXT,
            rules_text TEXT,
            colors TEXT
        );

        CREATE TABLE IF NOT EXISTS printings (
            multiverse_id INTEGER PRIMARY KEY,
            name TEXT,
            mtg_set TEXT,
            rarity TEXT,
            artist TEXT,
            flavor_text TEXT,
            FOREIGN KEY (artist) REFERENCES artists (name),
            FOREIGN KEY (name) REFERENCES cards (name),
            FOREIGN KEY (mtg_set) REFERENCES sets (name)
        );
    ",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_initializes_and_is_rerunnable() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        initialize_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        for expected in ["artists", "cards", "printings", "sets"] {
            assert!(tables.iter().any(|t| t == expected), "missing {expected}");
        }
    }
}
