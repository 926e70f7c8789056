//! Keyword extraction from search-result titles and links
//!
//! A node's keywords are the title tokens that relate to its URL: after
//! tokenizing both sides, a title token qualifies when it has a substring
//! relationship (either direction) with at least one link token. The
//! surviving tokens are ranked by frequency across both token streams and
//! capped at two entries.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Common English function words that never qualify as keywords.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "and", "is", "the", "of", "on", "in", "to", "for", "with", "by", "at", "an", "as", "it",
        "be", "or", "from", "this", "that", "which", "a",
    ]
    .into_iter()
    .collect()
});

/// Token delimiter: runs of whitespace and common title/URL punctuation.
static RE_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s.,|/\\-]+").expect("invalid split regex"));

/// Leading URL scheme plus optional "www." prefix.
static RE_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://(www\.)?").expect("invalid scheme regex"));

fn keeps_token(word: &str) -> bool {
    word.chars().count() > 2 && !STOP_WORDS.contains(word)
}

/// Tokenize a result title.
///
/// Falls back to the two longest tokens (length filter only) when the
/// stop-word filter leaves nothing, so a non-empty title with at least one
/// token longer than two characters always yields tokens.
fn parse_title_keywords(title: &str) -> Vec<String> {
    let lowered = title.to_lowercase();
    let keywords: Vec<String> = RE_SPLIT
        .split(&lowered)
        .filter(|word| keeps_token(word))
        .map(str::to_string)
        .collect();

    if keywords.is_empty() {
        let mut longest: Vec<String> = RE_SPLIT
            .split(&lowered)
            .filter(|word| word.chars().count() > 2)
            .map(str::to_string)
            .collect();
        longest.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
        longest.truncate(2);
        return longest;
    }

    keywords
}

/// Tokenize a link after stripping the scheme and "www." prefix.
fn parse_link_keywords(link: &str) -> Vec<String> {
    let lowered = link.to_lowercase();
    let stripped = RE_SCHEME.replace(&lowered, "");
    RE_SPLIT
        .split(&stripped)
        .filter(|word| keeps_token(word))
        .map(str::to_string)
        .collect()
}

/// Derive up to two keywords shared between a result's title and link.
///
/// An empty result is valid: it simply means no title token relates to the
/// URL, and the node carries no derived keywords for re-querying.
pub fn extract_keywords(title: &str, link: &str) -> Vec<String> {
    let title_keywords = parse_title_keywords(title);
    let link_keywords = parse_link_keywords(link);

    // Frequency over the combined title+link token multiset.
    let mut frequency: HashMap<&str, usize> = HashMap::new();
    for word in title_keywords.iter().chain(link_keywords.iter()) {
        *frequency.entry(word.as_str()).or_insert(0) += 1;
    }

    let mut seen = HashSet::new();
    let mut common: Vec<String> = title_keywords
        .iter()
        .filter(|title_word| {
            link_keywords
                .iter()
                .any(|link_word| link_word.contains(*title_word) || title_word.contains(link_word))
        })
        .filter(|word| seen.insert((*word).clone()))
        .cloned()
        .collect();

    // Stable sort keeps first-occurrence order among equal frequencies.
    common.sort_by(|a, b| {
        frequency
            .get(b.as_str())
            .unwrap_or(&0)
            .cmp(frequency.get(a.as_str()).unwrap_or(&0))
    });
    common.truncate(2);
    common
}
