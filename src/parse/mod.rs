//! Card page parsing
//!
//! Pure page-to-record extraction: a card page carries its fields as
//! alternating `div.label` / `div.value` elements. Values are flattened to
//! text with symbol images decoded to tokens, the mana cost is compacted,
//! half power/toughness is normalized, and multi-faced printings (split,
//! fuse, flip) have their shared fields merged with `//`.

mod symbols;

pub use symbols::symbol_token;

use crate::record::{labels, Record};
use scraper::{ElementRef, Html, Node, Selector};
use thiserror::Error;

/// Errors produced while parsing a card page
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("page has no label/value fields")]
    NoFields,

    #[error("label/value mismatch: {labels} labels, {values} values")]
    FieldMismatch { labels: usize, values: usize },

    #[error("selector error: {0}")]
    Selector(String),
}

/// Labels whose values carry symbol images to decode
const SYMBOL_LABELS: [&str; 3] = [labels::CARD_TEXT, labels::MANA_COST, labels::CMC];

/// Labels merged across the faces of a multi-faced printing
const FACE_MERGED_LABELS: [&str; 4] = [
    labels::NAME,
    labels::CARD_TEXT,
    labels::MANA_COST,
    labels::CMC,
];

/// Parses one card page into a record
///
/// Pure function over the page bytes; bodies are decoded lossily so a
/// stray non-UTF-8 byte cannot fail the whole page.
pub fn parse_page(page: &[u8]) -> Result<Record, ParseError> {
    let html = String::from_utf8_lossy(page);
    let document = Html::parse_document(&html);

    let label_sel = selector("div.label")?;
    let value_sel = selector("div.value")?;

    let parsed_labels: Vec<String> = document
        .select(&label_sel)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .collect();
    let value_elements: Vec<ElementRef> = document.select(&value_sel).collect();

    if parsed_labels.is_empty() {
        return Err(ParseError::NoFields);
    }
    if parsed_labels.len() != value_elements.len() {
        return Err(ParseError::FieldMismatch {
            labels: parsed_labels.len(),
            values: value_elements.len(),
        });
    }

    let mut values: Vec<String> = parsed_labels
        .iter()
        .zip(&value_elements)
        .map(|(label, element)| render_value(label, *element))
        .collect();

    if is_multi_faced(&parsed_labels) {
        merge_face_values(&parsed_labels, &mut values);
    }

    Ok(parsed_labels.into_iter().zip(values).collect())
}

fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError::Selector(format!("{css}: {e:?}")))
}

/// Flattens a value element to text, decoding symbol images where the
/// label calls for it
///
/// Text fragments are trimmed and joined with single spaces, matching how
/// the page renders them. The mana cost is then compacted to a bare symbol
/// string, and `{1/2}` in power/toughness becomes `.5`.
fn render_value(label: &str, element: ElementRef) -> String {
    let decode_symbols = SYMBOL_LABELS.contains(&label);
    let mut parts: Vec<String> = Vec::new();

    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => {
                let fragment = text.trim();
                if !fragment.is_empty() {
                    parts.push(fragment.to_string());
                }
            }
            Node::Element(el) if el.name() == "img" => {
                if decode_symbols {
                    if let Some(alt) = el.attr("alt") {
                        parts.push(symbol_token(alt));
                    }
                }
            }
            _ => {}
        }
    }

    let joined = parts.join(" ");
    match label {
        labels::MANA_COST => joined.split_whitespace().collect(),
        labels::POWER_TOUGHNESS => joined.replace("{1/2}", ".5"),
        _ => joined,
    }
}

/// A page describes a multi-faced printing when its first label repeats
fn is_multi_faced(parsed_labels: &[String]) -> bool {
    match parsed_labels.first() {
        Some(first) => parsed_labels.iter().filter(|l| *l == first).count() > 1,
        None => false,
    }
}

/// Joins the per-face values of shared fields with `//`, assigning the
/// merged string back to every face's slot
fn merge_face_values(parsed_labels: &[String], values: &mut [String]) {
    for target in FACE_MERGED_LABELS {
        let indexes: Vec<usize> = parsed_labels
            .iter()
            .enumerate()
            .filter(|(_, label)| label.as_str() == target)
            .map(|(i, _)| i)
            .collect();
        if indexes.is_empty() {
            continue;
        }

        let merged = indexes
            .iter()
            .map(|&i| values[i].clone())
            .collect::<Vec<_>>()
            .join("//");
        for &i in &indexes {
            values[i] = merged.clone();
        }
    }
}
