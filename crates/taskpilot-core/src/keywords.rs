//! Salient-token extraction for exact-overlap boosting.
//!
//! Keywords are a secondary signal: the Retriever adds a bonus per keyword
//! shared by the query and an index entry, on top of vector similarity.

use std::collections::BTreeSet;

use crate::text::{normalize, tokens};

/// Frequent function words ignored when extracting keywords.
///
/// English plus accent-folded Vietnamese, since every token is normalized
/// before lookup.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "was", "were", "with", "this", "that", "what", "which", "who",
    "how", "can", "does", "did", "have", "has", "had", "you", "your", "not", "but", "from",
    "into", "about", "there", "their", "they", "them", "will", "would", "should", "could",
    "all", "any", "our", "out", "its", "his", "her", "she", "him", "please", "show", "tell",
    "cua", "cho", "toi", "la", "nao", "nhu", "nay", "khong", "duoc", "voi", "cac",
    "nhung", "mot", "trong", "gi", "nhe", "giup", "minh", "ban",
];

/// Extract the set of important tokens from raw text.
///
/// Keeps tokens longer than two characters that are not stop words.
pub fn extract_keywords(text: &str) -> BTreeSet<String> {
    let normalized = normalize(text);
    tokens(&normalized)
        .filter(|t| t.chars().count() > 2)
        .filter(|t| !is_stop_word(t))
        .map(str::to_string)
        .collect()
}

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Number of keywords present in both sets.
pub fn overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> usize {
    a.intersection(b).count()
}
