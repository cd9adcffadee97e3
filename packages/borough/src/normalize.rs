//! Borough identifier normalization.
//!
//! Applied symmetrically to incident tables and boundary documents so that
//! `" camden"`, `"CAMDEN"` and `"Camden "` all land on the same join key.

use safeworld_borough_models::BoroughKey;

/// Normalizes a borough identifier into its canonical join key.
///
/// The pipeline:
/// 1. Trim
/// 2. Collapse internal whitespace runs to one space
/// 3. Uppercase
///
/// Idempotent: normalizing a key's string form yields the same key.
#[must_use]
pub fn normalize_key(input: &str) -> BoroughKey {
    BoroughKey::from_normalized(collapse_whitespace(input).to_uppercase())
}

/// Returns the title-cased display name for a borough identifier.
///
/// Applies the same trimming and whitespace collapsing as
/// [`normalize_key`], then capitalizes the first letter of each word and
/// lowercases the rest.
#[must_use]
pub fn display_name(input: &str) -> String {
    collapse_whitespace(input)
        .split(' ')
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns `true` if the identifier is blank once trimmed.
#[must_use]
pub fn is_blank(input: &str) -> bool {
    input.trim().is_empty()
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn title_case_word(word: &str) -> String {
    // Hyphenated names ("Hammersmith-Fulham") get each part capitalized.
    word.split('-')
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join("-")
}
