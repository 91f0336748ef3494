//! Text cleanup shared by training and inference.
//!
//! Any difference between the text the model was fit on and the text it scores
//! silently degrades accuracy, so both paths go through [`normalize`].

use std::sync::LazyLock;

use regex::Regex;

static URLS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?\S+|www\S+").expect("url pattern"));
static MENTIONS_AND_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[@#]\w+").expect("mention pattern"));
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s.,!?]").expect("charset pattern"));

/// Minimum token length kept by [`normalize`].
pub const MIN_TOKEN_LEN: usize = 2;

/// Canonicalize review text.
///
/// Lower-cases, strips URLs, @mentions and #hashtags, removes characters outside
/// `[a-z0-9 .,!?]`, collapses whitespace and drops tokens shorter than two
/// characters. Pure and total: empty input yields an empty string.
pub fn normalize(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let lowered = text.to_lowercase();
    let without_urls = URLS.replace_all(&lowered, "");
    let without_tags = MENTIONS_AND_TAGS.replace_all(&without_urls, "");
    let cleaned = DISALLOWED.replace_all(&without_tags, "");

    cleaned
        .split_whitespace()
        .filter(|token| token.len() >= MIN_TOKEN_LEN)
        .collect::<Vec<_>>()
        .join(" ")
}

/// [`normalize`] for an optional review body (missing text normalizes to empty).
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}
