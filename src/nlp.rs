//! Frequency-based keyword extraction.
//!
//! Text is split into lowercase word tokens, stopwords are removed, and the
//! remaining words are ranked by how often they occur. An article's keywords
//! are the top words of its body merged with the top words of its title.

use crate::stopwords::is_stopword;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Keywords kept per ranked text.
pub const NUM_KEYWORDS: usize = 10;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}'’]*").unwrap());

/// Lowercased word tokens of `text`.
///
/// Tokens shorter than two characters and purely numeric tokens are dropped;
/// curly apostrophes are normalized and trailing ones stripped.
pub fn tokenize(text: &str) -> Vec<String> {
    WORD.find_iter(text)
        .map(|m| {
            m.as_str()
                .replace('’', "'")
                .trim_end_matches('\'')
                .to_lowercase()
        })
        .filter(|w| w.chars().count() >= 2 && !w.chars().all(|c| c.is_numeric()))
        .collect()
}

/// The `limit` most frequent non-stopword tokens of `text`, most frequent
/// first, ties broken alphabetically.
///
/// When every token is a stopword the unfiltered tokens are ranked instead,
/// so any text with at least one token yields at least one keyword.
pub fn rank_keywords(text: &str, limit: usize) -> Vec<String> {
    let tokens = tokenize(text);
    let filtered: Vec<&String> = tokens.iter().filter(|w| !is_stopword(w)).collect();
    let pool: Vec<&String> = if filtered.is_empty() {
        tokens.iter().collect()
    } else {
        filtered
    };

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for word in pool {
        *counts.entry(word.as_str()).or_default() += 1;
    }

    counts
        .into_iter()
        .sorted_by(|(a_word, a_count), (b_word, b_count)| {
            b_count.cmp(a_count).then_with(|| a_word.cmp(b_word))
        })
        .take(limit)
        .map(|(word, _)| word.to_string())
        .collect()
}

/// Keywords for an article: top body words followed by any top title words
/// not already present.
pub fn extract_keywords(title: Option<&str>, text: &str) -> Vec<String> {
    let mut keywords = rank_keywords(text, NUM_KEYWORDS);
    if let Some(title) = title {
        for word in rank_keywords(title, NUM_KEYWORDS) {
            if !keywords.contains(&word) {
                keywords.push(word);
            }
        }
    }
    keywords
}
