//! Built-in English stopword list.
//!
//! Shared by keyword extraction and by wordcloud styles that keep
//! `default_stopwords` enabled.

use once_cell::sync::Lazy;
use std::collections::HashSet;

const ENGLISH: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "almost", "also", "am", "an",
    "and", "any", "are", "aren't", "as", "at", "be", "because", "been", "before", "being",
    "below", "between", "both", "but", "by", "can", "can't", "cannot", "could", "couldn't",
    "did", "didn't", "do", "does", "doesn't", "doing", "don't", "down", "during", "each",
    "else", "ever", "few", "for", "from", "further", "get", "got", "had", "hadn't", "has",
    "hasn't", "have", "haven't", "having", "he", "he'd", "he'll", "he's", "her", "here",
    "here's", "hers", "herself", "him", "himself", "his", "how", "how's", "however", "i",
    "i'd", "i'll", "i'm", "i've", "if", "in", "into", "is", "isn't", "it", "it's", "its",
    "itself", "just", "let's", "like", "many", "may", "me", "might", "more", "most", "much",
    "must", "mustn't", "my", "myself", "new", "no", "nor", "not", "now", "of", "off", "on",
    "once", "one", "only", "or", "other", "ought", "our", "ours", "ourselves", "out", "over",
    "own", "per", "said", "same", "say", "says", "shall", "shan't", "she", "she'd", "she'll",
    "she's", "should", "shouldn't", "since", "so", "some", "still", "such", "than", "that",
    "that's", "the", "their", "theirs", "them", "themselves", "then", "there", "there's",
    "these", "they", "they'd", "they'll", "they're", "they've", "this", "those", "though",
    "through", "to", "too", "two", "under", "until", "up", "upon", "us", "very", "was",
    "wasn't", "we", "we'd", "we'll", "we're", "we've", "were", "weren't", "what", "what's",
    "when", "when's", "where", "where's", "whether", "which", "while", "who", "who's", "whom",
    "why", "why's", "will", "with", "within", "without", "won't", "would", "wouldn't", "year",
    "years", "yet", "you", "you'd", "you'll", "you're", "you've", "your", "yours",
    "yourself", "yourselves",
];

static ENGLISH_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| ENGLISH.iter().copied().collect());

/// Whether `word` (already lowercased) is an English stopword.
pub fn is_stopword(word: &str) -> bool {
    ENGLISH_SET.contains(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_words_are_stopwords() {
        for w in ["the", "and", "of", "said", "it's"] {
            assert!(is_stopword(w), "{w} should be a stopword");
        }
        assert!(!is_stopword("tariff"));
        assert!(!is_stopword("The"), "lookups are case sensitive");
    }

    #[test]
    fn test_list_has_no_duplicates() {
        assert_eq!(ENGLISH_SET.len(), ENGLISH.len());
    }
}
