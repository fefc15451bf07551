//! Sparse term-frequency vectors and cosine similarity.
//!
//! A [`TermVector`] is the engine's text fingerprint: a map from token to
//! occurrence count. It is not a learned embedding; similarity is purely
//! lexical.
//!
//! Two vectorizer profiles exist:
//!
//! | Profile | Input |
//! |---------|-------|
//! | [`TermVector::from_text`] | any text (queries, documents) |
//! | [`TermVector::for_entity`] | `title + content + status + priority` of an [`Entity`] |
//!
//! Terms are kept in a `BTreeMap` so that iteration order, and therefore
//! floating-point summation order, is the same for every call. This makes
//! [`cosine_similarity`] exactly symmetric.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Entity, KnowledgeDocument};
use crate::text::{normalize, tokens};

/// Sparse term → frequency mapping. Absent terms have frequency 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TermVector {
    terms: BTreeMap<String, u32>,
}

impl TermVector {
    /// Vectorize text. Tokens of one character or less are dropped.
    ///
    /// The input is normalized first, so raw text is accepted.
    pub fn from_text(text: &str) -> Self {
        let normalized = normalize(text);
        let mut terms = BTreeMap::new();
        for token in tokens(&normalized) {
            if token.chars().count() <= 1 {
                continue;
            }
            *terms.entry(token.to_string()).or_insert(0) += 1;
        }
        Self { terms }
    }

    /// Vectorize the whole entity, not just its free text.
    pub fn for_entity(entity: &Entity) -> Self {
        Self::from_text(&entity_text(entity))
    }

    /// Vectorize a help document from its title, patterns, and answer.
    pub fn for_document(doc: &KnowledgeDocument) -> Self {
        Self::from_text(&document_text(doc))
    }

    pub fn get(&self, term: &str) -> u32 {
        self.terms.get(term).copied().unwrap_or(0)
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.terms.iter().map(|(t, c)| (t.as_str(), *c))
    }

    /// Euclidean norm over this vector's own terms.
    pub fn norm(&self) -> f64 {
        self.terms
            .values()
            .map(|&c| {
                let c = c as f64;
                c * c
            })
            .sum::<f64>()
            .sqrt()
    }
}

/// Text used by the entity vectorizer profile.
pub fn entity_text(entity: &Entity) -> String {
    let mut text = entity.title.clone();
    if let Some(content) = &entity.content {
        text.push(' ');
        text.push_str(content);
    }
    text.push(' ');
    text.push_str(entity.status.label());
    text.push(' ');
    text.push_str(entity.priority.label());
    text
}

fn document_text(doc: &KnowledgeDocument) -> String {
    let mut text = doc.title.clone();
    for pattern in &doc.question_patterns {
        text.push(' ');
        text.push_str(pattern);
    }
    text.push(' ');
    text.push_str(&doc.answer_text);
    text
}

/// Compute cosine similarity between two term vectors.
///
/// Returns a value in `[0.0, 1.0]` since frequencies are non-negative.
/// Returns `0.0` if either vector is empty or has zero norm; this is a
/// normal outcome, not an error.
pub fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small
        .terms
        .iter()
        .filter_map(|(term, &x)| large.terms.get(term).map(|&y| x as f64 * y as f64))
        .sum();

    let denom = a.norm() * b.norm();
    if denom <= f64::EPSILON {
        return 0.0;
    }

    dot / denom
}
