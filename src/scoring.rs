//! Keyword-overlap scoring shared by the document and project indexes.
//!
//! A query is reduced to a set of distinct lower-cased words longer than two
//! characters. A candidate's score is the number of those words that occur
//! as a substring anywhere in its lower-cased text, so a query word also
//! matches inside a longer word (`"cat"` hits `"category"`).
//!
//! Candidates with a zero score are dropped; the rest are ordered by score,
//! highest first. Equal scores keep their store order.

use std::collections::BTreeSet;

/// Default maximum snippet length, in characters.
pub const SNIPPET_CHARS: usize = 800;

/// Query words must be longer than this many characters.
const SHORT_WORD_CHARS: usize = 2;

/// Extracts the distinct query words from a raw query string.
pub fn query_words(query: &str) -> BTreeSet<String> {
    query
        .trim()
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.chars().count() > SHORT_WORD_CHARS)
        .map(str::to_string)
        .collect()
}

/// Counts how many of `words` appear in `haystack`, ignoring case.
pub fn overlap(words: &BTreeSet<String>, haystack: &str) -> usize {
    let haystack = haystack.to_lowercase();
    words.iter().filter(|w| haystack.contains(w.as_str())).count()
}

/// Scores every candidate, keeps those with a nonzero overlap and returns
/// at most `top_k` of them ordered by descending score.
pub fn rank<T, F>(
    candidates: impl IntoIterator<Item = T>,
    words: &BTreeSet<String>,
    top_k: usize,
    haystack: F,
) -> Vec<(usize, T)>
where
    F: Fn(&T) -> String,
{
    let mut scored: Vec<(usize, T)> = candidates
        .into_iter()
        .filter_map(|c| {
            let score = overlap(words, &haystack(&c));
            (score > 0).then_some((score, c))
        })
        .collect();

    // sort_by is stable: ties stay in store order
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.truncate(top_k);
    scored
}

/// First `max_chars` characters of `text`.
pub fn snippet(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(q: &str) -> BTreeSet<String> {
        query_words(q)
    }

    #[test]
    fn test_query_words_drop_short_and_dedupe() {
        let w = words("  The THE fox is an ox  ");
        let got: Vec<&str> = w.iter().map(String::as_str).collect();
        assert_eq!(got, vec!["fox", "the"]);
    }

    #[test]
    fn test_query_words_all_short_is_empty() {
        assert!(words("a an to").is_empty());
        assert!(words("   ").is_empty());
        assert!(words("").is_empty());
    }

    #[test]
    fn test_query_words_counts_characters_not_bytes() {
        // two characters, four bytes
        assert!(words("éé").is_empty());
        assert_eq!(words("ééé").len(), 1);
    }

    #[test]
    fn test_overlap_counts_distinct_words() {
        let w = words("quick fox quick");
        assert_eq!(overlap(&w, "The quick brown fox"), 2);
        assert_eq!(overlap(&w, "Quick start guide"), 1);
        assert_eq!(overlap(&w, "nothing here"), 0);
    }

    #[test]
    fn test_overlap_matches_inside_longer_words() {
        let w = words("cat");
        assert_eq!(overlap(&w, "Product CATEGORY listing"), 1);
    }

    #[test]
    fn test_rank_orders_desc_and_truncates() {
        let w = words("alpha beta gamma");
        let docs = vec!["alpha", "alpha beta gamma", "none", "beta gamma"];
        let ranked = rank(docs, &w, 2, |d| d.to_string());
        assert_eq!(ranked, vec![(3, "alpha beta gamma"), (2, "beta gamma")]);
    }

    #[test]
    fn test_rank_ties_keep_store_order() {
        let w = words("rust");
        let docs = vec!["rust one", "rust two", "go", "rust three"];
        let ranked = rank(docs, &w, 10, |d| d.to_string());
        let order: Vec<&str> = ranked.iter().map(|(_, d)| *d).collect();
        assert_eq!(order, vec!["rust one", "rust two", "rust three"]);
    }

    #[test]
    fn test_rank_top_k_zero_is_empty() {
        let w = words("rust");
        let ranked = rank(vec!["rust"], &w, 0, |d| d.to_string());
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_snippet_truncates_to_char_count() {
        let text = "x".repeat(1000);
        assert_eq!(snippet(&text, SNIPPET_CHARS), "x".repeat(800));
        assert_eq!(snippet("short", SNIPPET_CHARS), "short");
        assert_eq!(snippet("héllo", 2), "hé");
    }
}
