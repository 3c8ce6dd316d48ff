//! Symbol image decoding
//!
//! Card pages render mana and other symbols as `<img>` tags whose `alt`
//! text names the symbol. The harvester replaces each image with a short
//! text token so records stay plain strings: plain colors become their
//! capital letter, Phyrexian mana gets a `p` prefix, hybrid mana an `h`
//! prefix, and variable colorless becomes `X`.

/// Converts a symbol image's alt text into its token form
///
/// Alt texts of one or two characters (generic costs like `"3"`, tap
/// symbols, already-short tokens) pass through unchanged.
pub fn symbol_token(alt: &str) -> String {
    if alt.chars().count() <= 2 {
        return alt.to_string();
    }

    if alt == "Blue" {
        return "U".to_string();
    }
    if alt == "Phyrexian" {
        return "p".to_string();
    }
    if let Some(color) = alt.strip_prefix("Phyrexian ") {
        if color.contains("Blue") {
            return "pU".to_string();
        }
        return match color.chars().next() {
            Some(first) => format!("p{first}"),
            None => "p".to_string(),
        };
    }
    if alt == "Variable Colorless" {
        return "X".to_string();
    }

    let words: Vec<&str> = alt.split_whitespace().collect();
    if words.len() == 3 && words[1] == "or" {
        if let (Some(first), Some(second)) = (words[0].chars().next(), words[2].chars().next()) {
            return format!("h{first}{second}");
        }
    }

    alt.chars().next().map(String::from).unwrap_or_default()
}
