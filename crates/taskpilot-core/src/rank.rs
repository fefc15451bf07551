//! Multi-factor urgency ranking for work items.
//!
//! Unlike the Retriever, the Priority Ranker ignores the user's query and
//! ranks incomplete items by how urgently they need attention.
//!
//! # Scoring
//!
//! | Factor | Values |
//! |--------|--------|
//! | priority | high 3, medium 2, low 1 |
//! | deadline | overdue 3, due today 2, due within `due_soon_days` 1, later or none 0 |
//! | status | in progress 2, otherwise 1 |
//! | similarity | cosine(item vector, [`URGENCY_PHRASE`] vector) |
//!
//! ```text
//! score = priority × 5 + deadline × 2 + status × 1 + similarity × 3
//! ```
//!
//! Sorted by score descending; equal scores fall back to the earlier
//! deadline (items without one last), then to input order.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::embedding::{cosine_similarity, TermVector};
use crate::index::IndexEntry;
use crate::models::{Entity, Priority, ScoredResult, Status};

/// Canned query describing an item that should be done first.
pub const URGENCY_PHRASE: &str = "important urgent high priority near deadline due soon \
    overdue do first quan trong khan cap uu tien cao gan han qua han lam truoc";

/// Ranking weights, decoupled from application config.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingParams {
    pub priority_weight: f64,
    pub deadline_weight: f64,
    pub status_weight: f64,
    pub similarity_weight: f64,
    /// Calendar days ahead that still count as "due soon".
    pub due_soon_days: i64,
    /// Maximum results when the caller does not specify one.
    pub default_limit: usize,
}

impl Default for RankingParams {
    fn default() -> Self {
        Self {
            priority_weight: 5.0,
            deadline_weight: 2.0,
            status_weight: 1.0,
            similarity_weight: 3.0,
            due_soon_days: 3,
            default_limit: 10,
        }
    }
}

/// Per-item factor breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankFactors {
    pub priority: u8,
    pub deadline: u8,
    pub status: u8,
    pub similarity: f64,
}

pub type RankedEntity = ScoredResult<Entity, RankFactors>;

pub fn priority_weight(priority: Priority) -> u8 {
    match priority {
        Priority::High => 3,
        Priority::Medium => 2,
        Priority::Low => 1,
    }
}

/// Deadline proximity relative to `now`, in calendar days (UTC).
pub fn deadline_weight(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>, due_soon_days: i64) -> u8 {
    let Some(deadline) = deadline else {
        return 0;
    };
    if deadline < now {
        return 3;
    }
    let days_ahead = (deadline.date_naive() - now.date_naive()).num_days();
    if days_ahead == 0 {
        2
    } else if days_ahead <= due_soon_days {
        1
    } else {
        0
    }
}

pub fn status_weight(status: &Status) -> u8 {
    match status {
        Status::InProgress => 2,
        _ => 1,
    }
}

/// Rank already-filtered incomplete items, returning at most `limit`.
pub fn rank_by_priority<'a, I>(
    entries: I,
    now: DateTime<Utc>,
    params: &RankingParams,
    limit: usize,
) -> Vec<RankedEntity>
where
    I: IntoIterator<Item = &'a IndexEntry<Entity>>,
{
    let urgency = TermVector::from_text(URGENCY_PHRASE);

    let mut ranked: Vec<(Option<DateTime<Utc>>, RankedEntity)> = entries
        .into_iter()
        .map(|entry| {
            let entity = &entry.source;
            let deadline = entity.deadline_at();
            if deadline.is_none() && entity.deadline.as_deref().is_some_and(|d| !d.trim().is_empty()) {
                warn!(id = %entity.id, deadline = ?entity.deadline, "unparseable deadline; treating as none");
            }

            let factors = RankFactors {
                priority: priority_weight(entity.priority),
                deadline: deadline_weight(deadline, now, params.due_soon_days),
                status: status_weight(&entity.status),
                similarity: cosine_similarity(&entry.vector, &urgency),
            };
            let score = factors.priority as f64 * params.priority_weight
                + factors.deadline as f64 * params.deadline_weight
                + factors.status as f64 * params.status_weight
                + factors.similarity * params.similarity_weight;

            (
                deadline,
                ScoredResult {
                    item: entity.clone(),
                    score,
                    explain: Some(factors),
                },
            )
        })
        .collect();

    ranked.sort_by(|(da, a), (db, b)| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| match (da, db) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    });

    ranked.into_iter().take(limit).map(|(_, r)| r).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Index;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 13, 10, 0, 0).unwrap()
    }

    fn task(title: &str, priority: Priority, deadline: Option<DateTime<Utc>>, status: Status) -> Entity {
        Entity {
            id: title.to_lowercase().replace(' ', "-"),
            title: title.to_string(),
            content: None,
            status,
            priority,
            deadline: deadline.map(|d| d.to_rfc3339()),
            owner: "u1".to_string(),
            project: None,
        }
    }

    fn rank(items: &[Entity]) -> Vec<String> {
        let index = Index::build(items);
        rank_by_priority(index.entries(), now(), &RankingParams::default(), 10)
            .into_iter()
            .map(|r| r.item.title)
            .collect()
    }

    #[test]
    fn test_deadline_weight_buckets() {
        let n = now();
        assert_eq!(deadline_weight(None, n, 3), 0);
        assert_eq!(deadline_weight(Some(n - Duration::hours(1)), n, 3), 3);
        assert_eq!(deadline_weight(Some(n + Duration::hours(2)), n, 3), 2);
        assert_eq!(deadline_weight(Some(n + Duration::days(2)), n, 3), 1);
        assert_eq!(deadline_weight(Some(n + Duration::days(3)), n, 3), 1);
        assert_eq!(deadline_weight(Some(n + Duration::days(4)), n, 3), 0);
    }

    #[test]
    fn test_high_beats_low_with_equal_deadline() {
        let d = Some(now() + Duration::days(1));
        let items = vec![
            task("Low thing", Priority::Low, d, Status::NotStarted),
            task("High thing", Priority::High, d, Status::NotStarted),
        ];
        assert_eq!(rank(&items), vec!["High thing", "Low thing"]);
    }

    #[test]
    fn test_earlier_deadline_wins_with_equal_priority() {
        let items = vec![
            task("Later", Priority::Medium, Some(now() + Duration::days(10)), Status::NotStarted),
            task("Overdue", Priority::Medium, Some(now() - Duration::days(2)), Status::NotStarted),
        ];
        assert_eq!(rank(&items), vec!["Overdue", "Later"]);
    }

    #[test]
    fn test_exact_tie_uses_deadline_then_input_order() {
        let items = vec![
            task("Same", Priority::Medium, Some(now() - Duration::days(1)), Status::NotStarted),
            task("Same", Priority::Medium, Some(now() - Duration::days(5)), Status::NotStarted),
            task("Same", Priority::Medium, None, Status::NotStarted),
        ];
        let index = Index::build(&items);
        let ranked = rank_by_priority(index.entries(), now(), &RankingParams::default(), 10);
        let deadlines: Vec<Option<String>> = ranked.iter().map(|r| r.item.deadline.clone()).collect();
        assert_eq!(deadlines[0], items[1].deadline);
        assert_eq!(deadlines[1], items[0].deadline);
        assert_eq!(deadlines[2], None);
    }

    #[test]
    fn test_login_bug_before_docs() {
        let items = vec![
            task("Write docs", Priority::Low, Some(now() + Duration::days(10)), Status::parse("todo")),
            task("Fix login bug", Priority::High, Some(now() - Duration::days(1)), Status::parse("todo")),
        ];
        assert_eq!(rank(&items), vec!["Fix login bug", "Write docs"]);
    }

    #[test]
    fn test_malformed_deadline_scores_as_none() {
        let mut bad = task("Bad date", Priority::Medium, None, Status::NotStarted);
        bad.deadline = Some("sometime soon".to_string());
        let index = Index::build(&[bad]);
        let ranked = rank_by_priority(index.entries(), now(), &RankingParams::default(), 10);
        assert_eq!(ranked[0].explain.as_ref().unwrap().deadline, 0);
    }

    #[test]
    fn test_limit_and_empty() {
        assert!(rank(&[]).is_empty());
        let items: Vec<Entity> = (0..5)
            .map(|i| task(&format!("Task {}", i), Priority::Low, None, Status::NotStarted))
            .collect();
        let index = Index::build(&items);
        assert_eq!(rank_by_priority(index.entries(), now(), &RankingParams::default(), 2).len(), 2);
    }

    #[test]
    fn test_in_progress_breaks_ties() {
        let items = vec![
            task("Alpha", Priority::Medium, None, Status::NotStarted),
            task("Alpha", Priority::Medium, None, Status::InProgress),
        ];
        let index = Index::build(&items);
        let ranked = rank_by_priority(index.entries(), now(), &RankingParams::default(), 10);
        assert_eq!(ranked[0].item.status, Status::InProgress);
    }
}
