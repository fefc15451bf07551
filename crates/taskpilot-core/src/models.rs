//! Core data models used throughout Taskpilot.
//!
//! These types represent the two corpora the engine reads (help documents
//! and work-item entities) and the results it produces. Corpus items are
//! owned by the external store and only borrowed while an index is built.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::intent::IntentCategory;
use crate::text::normalize;

/// Lifecycle state of a work item.
///
/// Parsed leniently from free text: unknown labels are preserved in
/// [`Status::Other`] rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    NotStarted,
    InProgress,
    Done,
    Other(String),
}

impl Status {
    /// Parse a status label (English or Vietnamese, any case or accents).
    pub fn parse(raw: &str) -> Self {
        match normalize(raw).as_str() {
            "todo" | "to do" | "not started" | "new" | "open" | "pending"
            | "chua bat dau" | "chua lam" | "moi" => Status::NotStarted,
            "in progress" | "doing" | "started" | "active" | "dang lam"
            | "dang thuc hien" | "dang tien hanh" => Status::InProgress,
            "done" | "completed" | "complete" | "finished" | "closed" | "resolved"
            | "da xong" | "hoan thanh" | "da hoan thanh" | "xong" => Status::Done,
            _ => Status::Other(raw.trim().to_string()),
        }
    }

    /// Canonical display label.
    pub fn label(&self) -> &str {
        match self {
            Status::NotStarted => "not started",
            Status::InProgress => "in progress",
            Status::Done => "done",
            Status::Other(s) => s,
        }
    }

    /// Whether the item still needs work (anything outside the done set).
    pub fn is_incomplete(&self) -> bool {
        !matches!(self, Status::Done)
    }
}

impl From<String> for Status {
    fn from(raw: String) -> Self {
        Status::parse(&raw)
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.label().to_string()
    }
}

/// Urgency level of a work item.
///
/// Anything not recognised as high or medium is treated as low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn parse(raw: &str) -> Self {
        let n = normalize(raw);
        if n.contains("high") || n.contains("cao") {
            Priority::High
        } else if n.contains("medium") || n.contains("trung") {
            Priority::Medium
        } else {
            Priority::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl From<String> for Priority {
    fn from(raw: String) -> Self {
        Priority::parse(&raw)
    }
}

impl From<Priority> for String {
    fn from(p: Priority) -> Self {
        p.label().to_string()
    }
}

/// A work item belonging to an owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    pub status: Status,
    pub priority: Priority,
    /// Raw deadline as supplied by the store. See [`Entity::deadline_at`].
    #[serde(default)]
    pub deadline: Option<String>,
    pub owner: String,
    /// Project the item is filed under, if any.
    #[serde(default)]
    pub project: Option<String>,
}

impl Entity {
    /// Parse the deadline into a UTC timestamp.
    ///
    /// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (interpreted
    /// as end of that day, UTC). Anything else yields `None`, which callers
    /// treat as "no deadline".
    pub fn deadline_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.deadline.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .map(|dt| dt.and_utc())
    }

    pub fn is_incomplete(&self) -> bool {
        self.status.is_incomplete()
    }
}

/// A static help article in the knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    pub id: String,
    pub category: String,
    pub title: String,
    /// Phrasings that should route straight to this document.
    #[serde(default)]
    pub question_patterns: Vec<String>,
    pub answer_text: String,
}

/// A classified user request. Lives for one request only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    pub raw: String,
    pub normalized: String,
    pub intent: IntentCategory,
}

/// An item paired with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResult<T, E = ()> {
    pub item: T,
    pub score: f64,
    /// Scoring breakdown (populated when requested).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explain: Option<E>,
}

impl<T, E> ScoredResult<T, E> {
    pub fn new(item: T, score: f64) -> Self {
        Self {
            item,
            score,
            explain: None,
        }
    }
}

/// Outcome of a retrieval or ranking call.
///
/// Distinguishes "there was nothing to search" from "nothing matched".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "results", rename_all = "snake_case")]
pub enum Retrieved<T> {
    /// The corpus itself had no items.
    EmptyCorpus,
    /// The corpus had items but none qualified.
    NoMatch,
    Found(Vec<T>),
}

impl<T> Retrieved<T> {
    /// Wrap a result list, mapping an empty list to [`Retrieved::NoMatch`].
    pub fn from_results(corpus_len: usize, results: Vec<T>) -> Self {
        if corpus_len == 0 {
            Retrieved::EmptyCorpus
        } else if results.is_empty() {
            Retrieved::NoMatch
        } else {
            Retrieved::Found(results)
        }
    }

    pub fn items(&self) -> &[T] {
        match self {
            Retrieved::Found(items) => items,
            _ => &[],
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Retrieved::Found(items) => items,
            _ => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }
}

/// One work block in the schedule grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleSlot {
    /// Zero-based day offset from the schedule's start date.
    pub day_index: u32,
    pub date: NaiveDate,
    pub start_hour: u32,
    pub end_hour: u32,
    /// `None` when the slot was not filled.
    pub item: Option<Entity>,
}

/// Output of the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    pub slots: Vec<ScheduleSlot>,
    /// Ranked items that did not fit in the grid.
    pub unscheduled_count: usize,
}

impl Schedule {
    pub fn filled(&self) -> impl Iterator<Item = &ScheduleSlot> {
        self.slots.iter().filter(|s| s.item.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(deadline: Option<&str>) -> Entity {
        Entity {
            id: "t1".to_string(),
            title: "Fix login bug".to_string(),
            content: None,
            status: Status::NotStarted,
            priority: Priority::High,
            deadline: deadline.map(str::to_string),
            owner: "u1".to_string(),
            project: None,
        }
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(Status::parse("Đã Xong"), Status::Done);
        assert_eq!(Status::parse("in_progress"), Status::InProgress);
        assert_eq!(Status::parse("todo"), Status::NotStarted);
        assert_eq!(Status::parse("Blocked"), Status::Other("Blocked".to_string()));
        assert!(Status::parse("Blocked").is_incomplete());
        assert!(!Status::parse("completed").is_incomplete());
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!(Priority::parse("HIGH"), Priority::High);
        assert_eq!(Priority::parse("Cao"), Priority::High);
        assert_eq!(Priority::parse("trung bình"), Priority::Medium);
        assert_eq!(Priority::parse("whatever"), Priority::Low);
        assert_eq!(Priority::parse("urgent"), Priority::Low);
        assert_eq!(Priority::parse("normal"), Priority::Low);
    }

    #[test]
    fn test_deadline_parse() {
        assert!(entity(Some("2026-03-01T10:00:00Z")).deadline_at().is_some());
        let date_only = entity(Some("2026-03-01")).deadline_at().unwrap();
        assert_eq!(date_only.date_naive().to_string(), "2026-03-01");
        assert!(entity(Some("next tuesday")).deadline_at().is_none());
        assert!(entity(Some("")).deadline_at().is_none());
        assert!(entity(None).deadline_at().is_none());
    }

    #[test]
    fn test_entity_json_roundtrip_is_lenient() {
        let json = r#"{
            "id": "t9",
            "title": "Viết tài liệu",
            "status": "đang làm",
            "priority": "cao",
            "owner": "u1"
        }"#;
        let e: Entity = serde_json::from_str(json).unwrap();
        assert_eq!(e.status, Status::InProgress);
        assert_eq!(e.priority, Priority::High);
        assert!(e.deadline.is_none());
        let out = serde_json::to_value(&e).unwrap();
        assert_eq!(out["status"], "in progress");
        assert_eq!(out["priority"], "high");
    }

    #[test]
    fn test_retrieved_markers() {
        let empty: Retrieved<u8> = Retrieved::from_results(0, vec![]);
        assert_eq!(empty, Retrieved::EmptyCorpus);
        let none: Retrieved<u8> = Retrieved::from_results(3, vec![]);
        assert_eq!(none, Retrieved::NoMatch);
        assert!(none.is_empty());
        let found = Retrieved::from_results(3, vec![1u8]);
        assert_eq!(found.len(), 1);
    }
}
