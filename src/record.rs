//! Raw card record type
//!
//! A record is the parser's output for one printing: a mapping from the
//! card page's field labels (e.g. `"Card Name:"`, `"Mana Cost:"`) to their
//! cleaned-up text values. The dispatch engine treats records as opaque;
//! only the loader interprets individual labels.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field labels used by the database loader
pub mod labels {
    pub const NAME: &str = "Card Name:";
    pub const MANA_COST: &str = "Mana Cost:";
    pub const CMC: &str = "Converted Mana Cost:";
    pub const TYPES: &str = "Types:";
    pub const CARD_TEXT: &str = "Card Text:";
    pub const FLAVOR_TEXT: &str = "Flavor Text:";
    pub const POWER_TOUGHNESS: &str = "P/T:";
    pub const RARITY: &str = "Rarity:";
    pub const EXPANSION: &str = "Expansion:";
    pub const ARTIST: &str = "Artist:";
}

/// One printing's harvested fields, keyed by page label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field, returning the previous value for that label if any
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.fields.insert(label.into(), value.into())
    }

    /// Returns the value for a label
    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields.get(label).map(String::as_str)
    }

    /// Returns the number of fields in the record
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over (label, value) pairs in label order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
