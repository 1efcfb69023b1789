use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Runs of ASCII word characters; everything else (apostrophes included) separates terms.
    static ref RE: Regex = Regex::new(r"[a-z0-9_]+").expect("valid regex");
}

/// Minimum number of characters a term must have to be indexed.
pub const MIN_TERM_LEN: usize = 2;

/// Tokenize text into index terms: lowercase, split on anything that is not an
/// ASCII letter, digit or underscore, and drop single-character fragments.
///
/// The same function is used for documents and queries.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    RE.find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|t| t.len() >= MIN_TERM_LEN)
        .map(str::to_string)
        .collect()
}
