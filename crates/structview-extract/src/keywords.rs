// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword frequency ranking.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "about", "above", "after", "again", "against", "all", "also", "and", "any", "are",
        "because", "been", "before", "being", "below", "between", "both", "but", "can", "could",
        "did", "does", "doing", "down", "during", "each", "few", "for", "from", "further", "had",
        "has", "have", "having", "her", "here", "hers", "herself", "him", "himself", "his", "how",
        "into", "its", "itself", "just", "more", "most", "not", "now", "off", "once", "only",
        "other", "our", "ours", "out", "over", "own", "same", "she", "should", "some", "such",
        "than", "that", "the", "their", "theirs", "them", "then", "there", "these", "they",
        "this", "those", "through", "too", "under", "until", "very", "was", "were", "what",
        "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would", "you",
        "your", "yours", "yourself",
    ]
    .into_iter()
    .collect()
});

/// Returns up to `limit` lowercase words ranked by frequency (descending),
/// ties broken alphabetically.
///
/// Words shorter than `min_len` characters, stop words, and purely numeric
/// tokens are ignored.
pub fn top_keywords(text: &str, limit: usize, min_len: usize) -> Vec<String> {
    if limit == 0 {
        return Vec::new();
    }

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for token in text.split(|c: char| !c.is_alphanumeric()) {
        if token.chars().count() < min_len || token.chars().all(|c| c.is_numeric()) {
            continue;
        }
        let word = token.to_lowercase();
        if STOP_WORDS.contains(word.as_str()) {
            continue;
        }
        *counts.entry(word).or_default() += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    // Stable sort over alphabetical input keeps ties in alphabetical order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(limit).map(|(word, _)| word).collect()
}
