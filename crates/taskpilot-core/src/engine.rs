//! The assistant engine.
//!
//! [`Assistant`] is the single entry point collaborators use. It owns the
//! per-corpus [`IndexCache`] and the tuning parameters, borrows corpus
//! snapshots from a [`Store`], and exposes:
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`classify`](Assistant::classify) | Intent of a query |
//! | [`retrieve_knowledge`](Assistant::retrieve_knowledge) | Top-K help documents |
//! | [`retrieve_entities`](Assistant::retrieve_entities) | Top-K work items of an owner |
//! | [`rank_by_priority`](Assistant::rank_by_priority) | Open work items, most urgent first |
//! | [`build_schedule`](Assistant::build_schedule) | Ranked items placed into daily slots |
//! | [`answer`](Assistant::answer) | Classify, retrieve, and compose a response |
//!
//! One `Assistant` is meant to live for the whole process (or session) and
//! be shared by reference across concurrent requests.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::answer::{compose, Answer, Payload};
use crate::index::{Index, IndexCache};
use crate::intent::{classify_normalized, IntentCategory};
use crate::models::{Entity, KnowledgeDocument, Query, Retrieved, Schedule};
use crate::rank::{self, RankedEntity, RankingParams};
use crate::schedule::{self, ScheduleParams};
use crate::search::{retrieve, RetrievalParams, SearchHit, SearchRequest};
use crate::store::Store;
use crate::summary;
use crate::text::normalize;

/// Tuning for every component, bundled.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantParams {
    pub retrieval: RetrievalParams,
    pub ranking: RankingParams,
    pub schedule: ScheduleParams,
    /// Knowledge results used by [`Assistant::answer`].
    pub knowledge_limit: usize,
    /// Entity results used by [`Assistant::answer`].
    pub entity_limit: usize,
}

impl Default for AssistantParams {
    fn default() -> Self {
        Self {
            retrieval: RetrievalParams::default(),
            ranking: RankingParams::default(),
            schedule: ScheduleParams::default(),
            knowledge_limit: 3,
            entity_limit: 5,
        }
    }
}

/// Options for a single knowledge retrieval.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetrieveOptions {
    pub explain: bool,
    /// Return every document with its score, including `<= 0`.
    pub include_non_positive: bool,
}

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Retrieval-and-ranking engine over one [`Store`].
pub struct Assistant<S> {
    store: S,
    params: AssistantParams,
    cache: IndexCache,
    clock: Clock,
}

impl<S: Store> Assistant<S> {
    pub fn new(store: S, params: AssistantParams) -> Self {
        Self {
            store,
            params,
            cache: IndexCache::new(),
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the wall clock used for deadline proximity and scheduling.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn params(&self) -> &AssistantParams {
        &self.params
    }

    /// Number of index builds performed so far.
    pub fn index_builds(&self) -> usize {
        self.cache.builds()
    }

    pub fn classify(&self, query: &str) -> IntentCategory {
        classify_normalized(&normalize(query))
    }

    /// Normalize and classify raw query text.
    pub fn parse_query(&self, raw: &str) -> Query {
        let normalized = normalize(raw);
        let intent = classify_normalized(&normalized);
        Query {
            raw: raw.to_string(),
            normalized,
            intent,
        }
    }

    async fn knowledge_index(&self) -> Result<Arc<Index<KnowledgeDocument>>> {
        if let Some(index) = self.cache.knowledge() {
            return Ok(index);
        }
        let docs = self.store.fetch_knowledge_corpus().await?;
        Ok(self.cache.knowledge_or_build(&docs))
    }

    async fn entity_index(&self, owner: &str) -> Result<Arc<Index<Entity>>> {
        let snapshot = self.store.fetch_entities_for_owner(owner).await?;
        Ok(self.cache.entities_or_build(owner, &snapshot))
    }

    pub async fn retrieve_knowledge(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Retrieved<SearchHit<KnowledgeDocument>>> {
        self.retrieve_knowledge_with(query, k, RetrieveOptions::default())
            .await
    }

    pub async fn retrieve_knowledge_with(
        &self,
        query: &str,
        k: usize,
        opts: RetrieveOptions,
    ) -> Result<Retrieved<SearchHit<KnowledgeDocument>>> {
        let index = self.knowledge_index().await?;
        let normalized = normalize(query);
        let req = SearchRequest {
            normalized_query: &normalized,
            limit: k,
            include_non_positive: opts.include_non_positive,
            explain: opts.explain,
            params: &self.params.retrieval,
        };
        let hits = retrieve(&index, &req, |_| true);
        Ok(Retrieved::from_results(index.len(), hits))
    }

    pub async fn retrieve_entities(
        &self,
        query: &str,
        owner: &str,
        k: usize,
    ) -> Result<Retrieved<SearchHit<Entity>>> {
        let index = self.entity_index(owner).await?;
        let normalized = normalize(query);
        // The overview adjustment belongs to the help library only.
        let params = RetrievalParams {
            overview_id: None,
            ..self.params.retrieval.clone()
        };
        let req = SearchRequest {
            normalized_query: &normalized,
            limit: k,
            include_non_positive: false,
            explain: false,
            params: &params,
        };
        let hits = retrieve(&index, &req, |_| true);
        Ok(Retrieved::from_results(index.len(), hits))
    }

    /// Rank the owner's incomplete items. `limit` defaults to the configured
    /// ranking limit.
    pub async fn rank_by_priority(
        &self,
        owner: &str,
        limit: Option<usize>,
    ) -> Result<Retrieved<RankedEntity>> {
        let index = self.entity_index(owner).await?;
        let limit = limit.unwrap_or(self.params.ranking.default_limit);
        let ranked = rank::rank_by_priority(
            index.entries().iter().filter(|e| e.source.is_incomplete()),
            (self.clock)(),
            &self.params.ranking,
            limit,
        );
        Ok(Retrieved::from_results(index.len(), ranked))
    }

    /// Schedule every incomplete item of the owner over `days` days
    /// (defaults to the configured number), starting today.
    pub async fn build_schedule(&self, owner: &str, days: Option<u32>) -> Result<Schedule> {
        let index = self.entity_index(owner).await?;
        let ranked = rank::rank_by_priority(
            index.entries().iter().filter(|e| e.source.is_incomplete()),
            (self.clock)(),
            &self.params.ranking,
            usize::MAX,
        );
        Ok(self.schedule_ranked(&ranked, days))
    }

    fn schedule_ranked(&self, ranked: &[RankedEntity], days: Option<u32>) -> Schedule {
        let days = days.unwrap_or(self.params.schedule.default_days);
        schedule::build_schedule(
            ranked.iter().map(|r| r.item.clone()).collect(),
            days,
            (self.clock)().date_naive(),
            &self.params.schedule,
        )
    }

    fn top_ranked(&self, all: Retrieved<RankedEntity>) -> Retrieved<RankedEntity> {
        match all {
            Retrieved::Found(mut items) => {
                items.truncate(self.params.ranking.default_limit);
                Retrieved::Found(items)
            }
            other => other,
        }
    }

    /// Answer a free-text query on behalf of `owner`.
    pub async fn answer(&self, query: &str, owner: &str) -> Result<Answer> {
        let query = self.parse_query(query);
        debug!(intent = %query.intent, owner, "answering");

        let payload = match query.intent {
            IntentCategory::TaskContext | IntentCategory::Tasks => Payload::Entities(
                self.retrieve_entities(&query.raw, owner, self.params.entity_limit)
                    .await?,
            ),
            IntentCategory::MyTasks => {
                let all = self.rank_by_priority(owner, Some(usize::MAX)).await?;
                let open = all.len();
                Payload::Ranked {
                    ranked: self.top_ranked(all),
                    open,
                }
            }
            IntentCategory::Management => {
                let all = self.rank_by_priority(owner, Some(usize::MAX)).await?;
                let open = all.len();
                let schedule = self.schedule_ranked(all.items(), None);
                Payload::Plan {
                    ranked: self.top_ranked(all),
                    open,
                    schedule,
                }
            }
            IntentCategory::ProjectProgress => {
                let entities = self.store.fetch_entities_for_owner(owner).await?;
                Payload::Progress(Retrieved::from_results(
                    entities.len(),
                    summary::project_progress(&entities),
                ))
            }
            IntentCategory::Reports => {
                let entities = self.store.fetch_entities_for_owner(owner).await?;
                Payload::Report(Retrieved::from_results(
                    entities.len(),
                    summary::status_counts(&entities),
                ))
            }
            IntentCategory::Calendar => {
                let entities = self.store.fetch_entities_for_owner(owner).await?;
                Payload::Upcoming(Retrieved::from_results(
                    entities.len(),
                    summary::upcoming(
                        &entities,
                        (self.clock)(),
                        self.params.ranking.due_soon_days,
                    ),
                ))
            }
            IntentCategory::CreateTask
            | IntentCategory::HowTo
            | IntentCategory::Team
            | IntentCategory::General
            | IntentCategory::Unknown => Payload::Knowledge(
                self.retrieve_knowledge(&query.raw, self.params.knowledge_limit)
                    .await?,
            ),
        };

        Ok(compose(&query, &payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::AnswerStatus;
    use crate::models::{Priority, Status};
    use crate::store::memory::InMemoryStore;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 13, 10, 0, 0).unwrap()
    }

    fn task(id: &str, title: &str, priority: &str, deadline: Option<DateTime<Utc>>, status: &str) -> Entity {
        Entity {
            id: id.to_string(),
            title: title.to_string(),
            content: None,
            status: Status::parse(status),
            priority: Priority::parse(priority),
            deadline: deadline.map(|d| d.to_rfc3339()),
            owner: "u1".to_string(),
            project: Some("Portal".to_string()),
        }
    }

    fn docs() -> Vec<KnowledgeDocument> {
        vec![
            KnowledgeDocument {
                id: "overview".to_string(),
                category: "general".to_string(),
                title: "What Taskpilot does".to_string(),
                question_patterns: vec!["what can you do".to_string()],
                answer_text: "Taskpilot tracks tasks, projects and teams.".to_string(),
            },
            KnowledgeDocument {
                id: "create-task".to_string(),
                category: "tasks".to_string(),
                title: "Creating a task".to_string(),
                question_patterns: vec!["create a task".to_string()],
                answer_text: "Press New task on the board.".to_string(),
            },
        ]
    }

    fn assistant(entities: Vec<Entity>) -> Assistant<InMemoryStore> {
        Assistant::new(
            InMemoryStore::with_corpora(docs(), entities),
            AssistantParams::default(),
        )
        .with_clock(now)
    }

    fn sample() -> Vec<Entity> {
        vec![
            task("2", "Write docs", "low", Some(now() + Duration::days(10)), "todo"),
            task("1", "Fix login bug", "high", Some(now() - Duration::days(1)), "todo"),
            task("3", "Ship release", "medium", Some(now() + Duration::days(1)), "done"),
        ]
    }

    #[tokio::test]
    async fn test_rank_by_priority_excludes_done() {
        let a = assistant(sample());
        let ranked = a.rank_by_priority("u1", None).await.unwrap();
        let titles: Vec<&str> = ranked.items().iter().map(|r| r.item.title.as_str()).collect();
        assert_eq!(titles, vec!["Fix login bug", "Write docs"]);
    }

    #[tokio::test]
    async fn test_empty_entities_marker() {
        let a = assistant(Vec::new());
        assert_eq!(
            a.rank_by_priority("u1", None).await.unwrap(),
            Retrieved::EmptyCorpus
        );
        assert_eq!(
            a.retrieve_entities("login", "u1", 5).await.unwrap(),
            Retrieved::EmptyCorpus
        );
        let answer = a.answer("what are my tasks", "u1").await.unwrap();
        assert_eq!(answer.status, AnswerStatus::EmptyCorpus);
        assert!(answer.items.is_empty());
    }

    #[tokio::test]
    async fn test_schedule_two_days_five_items() {
        let items: Vec<Entity> = (0..5)
            .map(|i| task(&i.to_string(), &format!("Task {}", i), "medium", None, "todo"))
            .collect();
        let a = assistant(items);
        let s = a.build_schedule("u1", Some(2)).await.unwrap();
        assert_eq!(s.filled().count(), 4);
        assert_eq!(s.unscheduled_count, 1);
        assert_eq!(s.slots[0].date, now().date_naive());
    }

    #[tokio::test]
    async fn test_index_reused_across_queries() {
        let a = assistant(sample());
        a.retrieve_entities("login", "u1", 5).await.unwrap();
        a.rank_by_priority("u1", None).await.unwrap();
        a.build_schedule("u1", None).await.unwrap();
        assert_eq!(a.index_builds(), 1);

        a.retrieve_knowledge("create a task", 3).await.unwrap();
        a.retrieve_knowledge("overview", 3).await.unwrap();
        assert_eq!(a.index_builds(), 2);
    }

    #[tokio::test]
    async fn test_snapshot_change_triggers_rebuild() {
        let a = assistant(sample());
        a.rank_by_priority("u1", None).await.unwrap();
        a.store()
            .upsert_entity(task("4", "Rotate keys", "high", None, "doing"));
        let ranked = a.rank_by_priority("u1", None).await.unwrap();
        assert_eq!(ranked.len(), 3);
        assert_eq!(a.index_builds(), 2);
    }

    #[tokio::test]
    async fn test_answer_routes_by_intent() {
        let a = assistant(sample());

        let how = a.answer("how do I create a task", "u1").await.unwrap();
        assert_eq!(how.intent, IntentCategory::HowTo);
        assert!(how.text.starts_with("Creating a task"));

        let ctx = a
            .answer("which project does Fix login bug belong to", "u1")
            .await
            .unwrap();
        assert_eq!(ctx.intent, IntentCategory::TaskContext);
        assert!(ctx.text.contains("\"Fix login bug\" belongs to project \"Portal\""));

        let plan = a.answer("what should I do first", "u1").await.unwrap();
        assert_eq!(plan.intent, IntentCategory::Management);
        assert!(plan.text.contains("Suggested plan:"));

        let report = a.answer("weekly report", "u1").await.unwrap();
        assert!(report.text.starts_with("Task report (3 total)"));
    }

    #[tokio::test]
    async fn test_entity_named_overview_is_not_damped() {
        let mut first = task("overview", "Fix login bug on login page", "low", None, "todo");
        first.project = None;
        let mut second = task("t2", "Login copy tweak", "low", None, "todo");
        second.project = None;
        let a = assistant(vec![first, second]);

        let hits = a.retrieve_entities("fix login bug", "u1", 5).await.unwrap();
        let ids: Vec<&str> = hits.items().iter().map(|h| h.item.id.as_str()).collect();
        assert_eq!(ids, vec!["overview", "t2"]);
    }

    #[tokio::test]
    async fn test_my_tasks_answer_counts_all_open_items() {
        let items: Vec<Entity> = (0..12)
            .map(|i| task(&i.to_string(), &format!("Task {}", i), "medium", None, "todo"))
            .collect();
        let a = assistant(items);
        let answer = a.answer("what are my tasks", "u1").await.unwrap();
        assert!(answer
            .text
            .starts_with("You have 12 open task(s). The 10 most urgent first:"));
        assert_eq!(answer.items.len(), 10);
    }

    #[tokio::test]
    async fn test_calendar_answer_with_huge_window() {
        let params = AssistantParams {
            ranking: RankingParams {
                due_soon_days: 100_000_000,
                ..RankingParams::default()
            },
            ..AssistantParams::default()
        };
        let a = Assistant::new(InMemoryStore::with_corpora(docs(), sample()), params).with_clock(now);
        let answer = a.answer("upcoming deadlines", "u1").await.unwrap();
        assert_eq!(answer.intent, IntentCategory::Calendar);
        assert_eq!(answer.status, AnswerStatus::Answered);
        assert_eq!(answer.items.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_query_is_unknown_no_match() {
        let a = assistant(sample());
        let answer = a.answer("   ", "u1").await.unwrap();
        assert_eq!(answer.intent, IntentCategory::Unknown);
        assert_eq!(answer.status, AnswerStatus::NoMatch);
    }

    #[tokio::test]
    async fn test_knowledge_respects_k() {
        let a = assistant(Vec::new());
        let hits = a
            .retrieve_knowledge_with(
                "task",
                1,
                RetrieveOptions {
                    explain: true,
                    include_non_positive: true,
                },
            )
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits.items()[0].explain.is_some());
    }

    #[tokio::test]
    async fn test_concurrent_requests_build_once() {
        let a = Arc::new(assistant(sample()));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let a = a.clone();
            handles.push(tokio::spawn(async move {
                a.rank_by_priority("u1", None).await.unwrap().len()
            }));
        }
        for h in handles {
            assert_eq!(h.await.unwrap(), 2);
        }
        assert_eq!(a.index_builds(), 1);
    }
}
