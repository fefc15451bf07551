//! Response rendering.
//!
//! The composer is a pure function of the query and an already-computed
//! [`Payload`]: it selects the template for the query's intent and fills it
//! with structured items. It performs no retrieval and reads no clock, so
//! identical inputs always produce an identical [`Answer`].
//!
//! An empty payload never yields an empty answer. Empty corpora and
//! "nothing relevant" each get their own fixed response.

use serde::Serialize;

use crate::intent::IntentCategory;
use crate::models::{Entity, KnowledgeDocument, Query, Retrieved, Schedule};
use crate::rank::RankedEntity;
use crate::search::SearchHit;
use crate::summary::{ProjectProgress, StatusCount, NO_PROJECT};
use crate::text::excerpt;

/// Characters of entity content shown in listings.
const EXCERPT_CHARS: usize = 80;

const BLANK_QUERY_TEXT: &str = "Please type a question so I can help.";

/// Upstream results handed to the composer.
#[derive(Debug, Clone)]
pub enum Payload {
    Knowledge(Retrieved<SearchHit<KnowledgeDocument>>),
    Entities(Retrieved<SearchHit<Entity>>),
    /// Most urgent open items, plus how many open items exist in total.
    Ranked {
        ranked: Retrieved<RankedEntity>,
        open: usize,
    },
    Plan {
        ranked: Retrieved<RankedEntity>,
        open: usize,
        schedule: Schedule,
    },
    Progress(Retrieved<ProjectProgress>),
    Report(Retrieved<StatusCount>),
    Upcoming(Retrieved<Entity>),
}

/// Whether the answer carries results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    Answered,
    NoMatch,
    EmptyCorpus,
}

/// Structured item attached to an answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerItem {
    Document {
        id: String,
        title: String,
        category: String,
        score: f64,
    },
    Entity {
        id: String,
        title: String,
        status: String,
        priority: String,
        deadline: Option<String>,
        project: Option<String>,
        excerpt: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        score: Option<f64>,
    },
    Slot {
        day_index: u32,
        date: String,
        start_hour: u32,
        end_hour: u32,
        entity_id: String,
        title: String,
    },
    Progress {
        project: String,
        done: usize,
        total: usize,
        percent: u32,
    },
    StatusCount {
        status: String,
        count: usize,
    },
}

/// The rendered response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub intent: IntentCategory,
    pub status: AnswerStatus,
    pub text: String,
    pub items: Vec<AnswerItem>,
}

/// Render the answer for `query` from `payload`.
pub fn compose(query: &Query, payload: &Payload) -> Answer {
    if query.normalized.is_empty() {
        return Answer {
            intent: query.intent,
            status: AnswerStatus::NoMatch,
            text: BLANK_QUERY_TEXT.to_string(),
            items: Vec::new(),
        };
    }

    if let Some(status) = empty_status(payload) {
        return Answer {
            intent: query.intent,
            status,
            text: empty_text(query, payload, status),
            items: Vec::new(),
        };
    }

    let (text, items) = match (query.intent, payload) {
        (IntentCategory::TaskContext, Payload::Entities(hits)) => task_context(hits),
        (_, Payload::Knowledge(hits)) => knowledge(hits),
        (_, Payload::Entities(hits)) => entity_list(query, hits),
        (_, Payload::Ranked { ranked, open }) => ranked_list(ranked, *open),
        (_, Payload::Plan {
            ranked,
            open,
            schedule,
        }) => plan(ranked, *open, schedule),
        (_, Payload::Progress(rows)) => progress(rows),
        (_, Payload::Report(rows)) => report(rows),
        (_, Payload::Upcoming(items)) => upcoming(items),
    };

    Answer {
        intent: query.intent,
        status: AnswerStatus::Answered,
        text,
        items,
    }
}

fn empty_status(payload: &Payload) -> Option<AnswerStatus> {
    fn status_of<T>(r: &Retrieved<T>) -> Option<AnswerStatus> {
        match r {
            Retrieved::EmptyCorpus => Some(AnswerStatus::EmptyCorpus),
            Retrieved::NoMatch => Some(AnswerStatus::NoMatch),
            Retrieved::Found(_) => None,
        }
    }
    match payload {
        Payload::Knowledge(r) => status_of(r),
        Payload::Entities(r) => status_of(r),
        Payload::Ranked { ranked, .. } => status_of(ranked),
        Payload::Plan { ranked, .. } => status_of(ranked),
        Payload::Progress(r) => status_of(r),
        Payload::Report(r) => status_of(r),
        Payload::Upcoming(r) => status_of(r),
    }
}

fn empty_text(query: &Query, payload: &Payload, status: AnswerStatus) -> String {
    match (status, payload) {
        (AnswerStatus::EmptyCorpus, Payload::Knowledge(_)) => {
            "The help library is empty, so there is nothing to look up yet.".to_string()
        }
        (AnswerStatus::EmptyCorpus, _) => {
            "You don't have any tasks yet. Create one to get started.".to_string()
        }
        (_, Payload::Ranked { .. }) | (_, Payload::Plan { .. }) => {
            "Everything is done. You have no open tasks.".to_string()
        }
        (_, Payload::Upcoming(_)) => "Nothing is due soon.".to_string(),
        _ => format!(
            "I couldn't find anything relevant to \"{}\". Try rephrasing your question.",
            query.raw.trim()
        ),
    }
}

fn entity_item(e: &Entity, score: Option<f64>) -> AnswerItem {
    AnswerItem::Entity {
        id: e.id.clone(),
        title: e.title.clone(),
        status: e.status.label().to_string(),
        priority: e.priority.label().to_string(),
        deadline: e.deadline.clone(),
        project: e.project.clone(),
        excerpt: e
            .content
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(|c| excerpt(c, EXCERPT_CHARS)),
        score,
    }
}

fn entity_line(n: usize, e: &Entity) -> String {
    let mut line = format!(
        "{}. {} [{}, {} priority",
        n,
        e.title,
        e.status.label(),
        e.priority.label()
    );
    if let Some(deadline) = &e.deadline {
        line.push_str(", due ");
        line.push_str(deadline);
    }
    line.push(']');
    if let Some(content) = e.content.as_deref().filter(|c| !c.trim().is_empty()) {
        line.push_str(" - ");
        line.push_str(&excerpt(content, EXCERPT_CHARS));
    }
    line
}

fn knowledge(hits: &Retrieved<SearchHit<KnowledgeDocument>>) -> (String, Vec<AnswerItem>) {
    let items = hits.items();
    let best = &items[0].item;
    let mut text = format!("{}\n\n{}", best.title, best.answer_text.trim());
    if items.len() > 1 {
        text.push_str("\n\nRelated:");
        for hit in &items[1..] {
            text.push_str("\n- ");
            text.push_str(&hit.item.title);
        }
    }
    let items = items
        .iter()
        .map(|h| AnswerItem::Document {
            id: h.item.id.clone(),
            title: h.item.title.clone(),
            category: h.item.category.clone(),
            score: h.score,
        })
        .collect();
    (text, items)
}

fn task_context(hits: &Retrieved<SearchHit<Entity>>) -> (String, Vec<AnswerItem>) {
    let best = &hits.items()[0];
    let e = &best.item;
    let text = match &e.project {
        Some(project) => format!("\"{}\" belongs to project \"{}\".", e.title, project),
        None => format!("\"{}\" is not filed under any project.", e.title),
    };
    (text, vec![entity_item(e, Some(best.score))])
}

fn entity_list(query: &Query, hits: &Retrieved<SearchHit<Entity>>) -> (String, Vec<AnswerItem>) {
    let header = match query.intent {
        IntentCategory::Tasks => "Tasks matching your question:",
        _ => "Here is what I found:",
    };
    let mut text = header.to_string();
    for (i, hit) in hits.items().iter().enumerate() {
        text.push('\n');
        text.push_str(&entity_line(i + 1, &hit.item));
    }
    let items = hits
        .items()
        .iter()
        .map(|h| entity_item(&h.item, Some(h.score)))
        .collect();
    (text, items)
}

fn ranked_list(ranked: &Retrieved<RankedEntity>, open: usize) -> (String, Vec<AnswerItem>) {
    let shown = ranked.len();
    let mut text = if open > shown {
        format!(
            "You have {} open task(s). The {} most urgent first:",
            open, shown
        )
    } else {
        format!("You have {} open task(s), most urgent first:", shown)
    };
    for (i, r) in ranked.items().iter().enumerate() {
        text.push('\n');
        text.push_str(&entity_line(i + 1, &r.item));
    }
    let items = ranked
        .items()
        .iter()
        .map(|r| entity_item(&r.item, Some(r.score)))
        .collect();
    (text, items)
}

fn plan(
    ranked: &Retrieved<RankedEntity>,
    open: usize,
    schedule: &Schedule,
) -> (String, Vec<AnswerItem>) {
    let (mut text, mut items) = ranked_list(ranked, open);
    text.push_str("\n\nSuggested plan:");
    for slot in schedule.filled() {
        if let Some(e) = &slot.item {
            text.push_str(&format!(
                "\n- {} {:02}:00-{:02}:00: {}",
                slot.date, slot.start_hour, slot.end_hour, e.title
            ));
            items.push(AnswerItem::Slot {
                day_index: slot.day_index,
                date: slot.date.to_string(),
                start_hour: slot.start_hour,
                end_hour: slot.end_hour,
                entity_id: e.id.clone(),
                title: e.title.clone(),
            });
        }
    }
    if schedule.unscheduled_count > 0 {
        text.push_str(&format!(
            "\n{} more task(s) did not fit in this plan.",
            schedule.unscheduled_count
        ));
    }
    (text, items)
}

fn progress(rows: &Retrieved<ProjectProgress>) -> (String, Vec<AnswerItem>) {
    let mut text = "Project progress:".to_string();
    for p in rows.items() {
        let name = if p.project == NO_PROJECT { "No project" } else { p.project.as_str() };
        text.push_str(&format!(
            "\n- {}: {}/{} done ({}%)",
            name, p.done, p.total, p.percent
        ));
    }
    let items = rows
        .items()
        .iter()
        .map(|p| AnswerItem::Progress {
            project: p.project.clone(),
            done: p.done,
            total: p.total,
            percent: p.percent,
        })
        .collect();
    (text, items)
}

fn report(rows: &Retrieved<StatusCount>) -> (String, Vec<AnswerItem>) {
    let total: usize = rows.items().iter().map(|r| r.count).sum();
    let mut text = format!("Task report ({} total):", total);
    for r in rows.items() {
        text.push_str(&format!("\n- {}: {}", r.status, r.count));
    }
    let items = rows
        .items()
        .iter()
        .map(|r| AnswerItem::StatusCount {
            status: r.status.clone(),
            count: r.count,
        })
        .collect();
    (text, items)
}

fn upcoming(due: &Retrieved<Entity>) -> (String, Vec<AnswerItem>) {
    let mut text = "Coming up:".to_string();
    for (i, e) in due.items().iter().enumerate() {
        text.push('\n');
        text.push_str(&entity_line(i + 1, e));
    }
    let items = due.items().iter().map(|e| entity_item(e, None)).collect();
    (text, items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, ScoredResult, Status};
    use crate::text::normalize;

    fn query(raw: &str, intent: IntentCategory) -> Query {
        Query {
            raw: raw.to_string(),
            normalized: normalize(raw),
            intent,
        }
    }

    fn task(title: &str, project: Option<&str>) -> Entity {
        Entity {
            id: title.to_lowercase(),
            title: title.to_string(),
            content: Some("Users cannot sign in with SSO".to_string()),
            status: Status::NotStarted,
            priority: Priority::High,
            deadline: Some("2026-05-12".to_string()),
            owner: "u1".to_string(),
            project: project.map(str::to_string),
        }
    }

    #[test]
    fn test_empty_payloads_are_distinct() {
        let q = query("find the login task", IntentCategory::Tasks);
        let empty = compose(&q, &Payload::Entities(Retrieved::EmptyCorpus));
        let none = compose(&q, &Payload::Entities(Retrieved::NoMatch));
        assert_eq!(empty.status, AnswerStatus::EmptyCorpus);
        assert_eq!(none.status, AnswerStatus::NoMatch);
        assert_ne!(empty.text, none.text);
        assert!(none.text.contains("find the login task"));
        assert!(empty.items.is_empty() && none.items.is_empty());
    }

    #[test]
    fn test_blank_query_gets_prompt() {
        let q = query("   ", IntentCategory::Unknown);
        let a = compose(&q, &Payload::Knowledge(Retrieved::NoMatch));
        assert_eq!(a.status, AnswerStatus::NoMatch);
        assert!(!a.text.is_empty());
    }

    #[test]
    fn test_blank_query_wins_over_empty_corpus() {
        let q = query("  ?! ", IntentCategory::Unknown);
        let a = compose(&q, &Payload::Knowledge(Retrieved::EmptyCorpus));
        assert_eq!(a.status, AnswerStatus::NoMatch);
        assert_eq!(a.text, BLANK_QUERY_TEXT);
        assert!(a.items.is_empty());
    }

    #[test]
    fn test_ranked_list_reports_total_open() {
        let q = query("what are my tasks", IntentCategory::MyTasks);
        let ranked = Retrieved::Found(vec![
            ScoredResult::new(task("Login", None), 20.0),
            ScoredResult::new(task("Logout", None), 18.0),
        ]);
        let a = compose(&q, &Payload::Ranked { ranked: ranked.clone(), open: 15 });
        assert!(a.text.starts_with("You have 15 open task(s). The 2 most urgent first:"));
        assert_eq!(a.items.len(), 2);

        let a = compose(&q, &Payload::Ranked { ranked, open: 2 });
        assert!(a.text.starts_with("You have 2 open task(s), most urgent first:"));
    }

    #[test]
    fn test_task_context() {
        let q = query("which project is Login in", IntentCategory::TaskContext);
        let hits = Retrieved::Found(vec![ScoredResult::new(task("Login", Some("Portal")), 4.0)]);
        let a = compose(&q, &Payload::Entities(hits));
        assert_eq!(a.text, "\"Login\" belongs to project \"Portal\".");
        assert_eq!(a.items.len(), 1);
    }

    #[test]
    fn test_compose_is_deterministic() {
        let q = query("tasks about login", IntentCategory::Tasks);
        let payload = Payload::Entities(Retrieved::Found(vec![
            ScoredResult::new(task("Login", None), 3.0),
            ScoredResult::new(task("Logout", None), 1.0),
        ]));
        let a = compose(&q, &payload);
        let b = compose(&q, &payload);
        assert_eq!(a, b);
        assert!(a.text.contains("1. Login [not started, high priority, due 2026-05-12]"));
        assert!(a.text.contains("2. Logout"));
    }

    #[test]
    fn test_knowledge_answer_lists_related() {
        let doc = |id: &str, title: &str| KnowledgeDocument {
            id: id.to_string(),
            category: "tasks".to_string(),
            title: title.to_string(),
            question_patterns: vec![],
            answer_text: format!("Answer for {}", title),
        };
        let q = query("how do I create a task", IntentCategory::HowTo);
        let hits = Retrieved::Found(vec![
            ScoredResult::new(doc("a", "Creating tasks"), 12.0),
            ScoredResult::new(doc("b", "Editing tasks"), 2.0),
        ]);
        let a = compose(&q, &Payload::Knowledge(hits));
        assert!(a.text.starts_with("Creating tasks\n\nAnswer for Creating tasks"));
        assert!(a.text.contains("Related:\n- Editing tasks"));
        assert_eq!(a.items.len(), 2);
    }
}
