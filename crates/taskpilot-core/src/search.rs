//! Generic top-K retrieval over an [`Index`].
//!
//! The Retriever operates on any [`Indexable`] corpus (help documents or
//! work items). The caller supplies the query, tuning parameters and an
//! eligibility predicate.
//!
//! # Scoring Algorithm
//!
//! For every eligible entry:
//!
//! ```text
//! score = pattern_weight    × (question patterns found verbatim in query)
//!       + similarity_weight × cosine(query_vector, entry.vector)
//!       + keyword_weight    × |query_keywords ∩ entry.keywords|
//!       + category_bonus    (if the query contains the entry's category)
//! ```
//!
//! The designated overview entry is then adjusted: multiplied by
//! `overview_damping` for ordinary queries, or given `+overview_bonus`
//! when the query itself is overview-shaped.
//!
//! Results are sorted by score descending with a stable sort, so ties keep
//! corpus order. Non-positive scores are dropped unless the caller asks for
//! the raw diagnostic listing.

use std::cmp::Ordering;

use serde::Serialize;

use crate::embedding::{cosine_similarity, TermVector};
use crate::index::{Index, Indexable};
use crate::intent::is_overview_query;
use crate::keywords::{extract_keywords, overlap};
use crate::models::ScoredResult;

/// Retrieval tuning parameters, decoupled from application config.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalParams {
    /// Points per declared question pattern found in the query.
    pub pattern_weight: f64,
    /// Multiplier on cosine similarity.
    pub similarity_weight: f64,
    /// Points per shared keyword.
    pub keyword_weight: f64,
    /// Flat bonus when the query names the entry's category.
    pub category_bonus: f64,
    /// Id of the entry that describes the whole system, if any.
    pub overview_id: Option<String>,
    /// Factor applied to the overview entry for non-overview queries.
    pub overview_damping: f64,
    /// Bonus added to the overview entry for overview queries.
    pub overview_bonus: f64,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            pattern_weight: 10.0,
            similarity_weight: 3.0,
            keyword_weight: 2.0,
            category_bonus: 3.0,
            overview_id: Some("overview".to_string()),
            overview_damping: 0.1,
            overview_bonus: 20.0,
        }
    }
}

/// Bundles the per-call inputs of a retrieval.
#[derive(Debug, Clone)]
pub struct SearchRequest<'a> {
    /// Query text after [`normalize`](crate::text::normalize).
    pub normalized_query: &'a str,
    /// Maximum results to return.
    pub limit: usize,
    /// Keep entries scoring `<= 0` (diagnostics).
    pub include_non_positive: bool,
    /// If true, populate [`ScoreExplanation`] on each result.
    pub explain: bool,
    pub params: &'a RetrievalParams,
}

/// How the overview entry's score was adjusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverviewAdjustment {
    Damped,
    Boosted,
}

/// Scoring breakdown for a retrieval result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreExplanation {
    pub pattern_hits: usize,
    pub similarity: f64,
    pub keyword_overlap: usize,
    pub category_bonus: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<OverviewAdjustment>,
}

/// A retrieval hit.
pub type SearchHit<T> = ScoredResult<T, ScoreExplanation>;

/// Run a top-K search over `index`, considering only items accepted by
/// `eligible`.
pub fn retrieve<T, F>(index: &Index<T>, req: &SearchRequest<'_>, eligible: F) -> Vec<SearchHit<T>>
where
    T: Indexable,
    F: Fn(&T) -> bool,
{
    if req.limit == 0 {
        return Vec::new();
    }

    let query = req.normalized_query;
    let query_vec = TermVector::from_text(query);
    let query_keywords = extract_keywords(query);
    let overview_query = is_overview_query(query);
    let p = req.params;

    let mut hits: Vec<SearchHit<T>> = index
        .entries()
        .iter()
        .filter(|entry| eligible(&entry.source))
        .map(|entry| {
            let pattern_hits = entry
                .patterns
                .iter()
                .filter(|pat| query.contains(pat.as_str()))
                .count();
            let similarity = cosine_similarity(&query_vec, &entry.vector);
            let keyword_overlap = overlap(&query_keywords, &entry.keywords);
            let category_bonus = match &entry.category {
                Some(c) if query.contains(c.as_str()) => p.category_bonus,
                _ => 0.0,
            };

            let mut score = p.pattern_weight * pattern_hits as f64
                + p.similarity_weight * similarity
                + p.keyword_weight * keyword_overlap as f64
                + category_bonus;

            let mut overview = None;
            if p.overview_id.as_deref() == Some(entry.source.id()) {
                if overview_query {
                    score += p.overview_bonus;
                    overview = Some(OverviewAdjustment::Boosted);
                } else {
                    score *= p.overview_damping;
                    overview = Some(OverviewAdjustment::Damped);
                }
            }

            let explain = req.explain.then(|| ScoreExplanation {
                pattern_hits,
                similarity,
                keyword_overlap,
                category_bonus,
                overview,
            });

            ScoredResult {
                item: entry.source.clone(),
                score,
                explain,
            }
        })
        .filter(|hit| req.include_non_positive || hit.score > 0.0)
        .collect();

    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    hits.truncate(req.limit);
    hits
}
