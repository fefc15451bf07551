//! CLI command implementations.
//!
//! Each `run_*` function loads the corpora described by the config, runs one
//! engine operation, and prints the result to stdout, either as a
//! human-readable listing or (with `--json`) as the serialized result.

use anyhow::Result;
use serde::Serialize;

use taskpilot_core::engine::{Assistant, RetrieveOptions};
use taskpilot_core::intent::classify_normalized;
use taskpilot_core::models::{Entity, Query, Retrieved, Schedule};
use taskpilot_core::search::{OverviewAdjustment, ScoreExplanation};
use taskpilot_core::store::memory::InMemoryStore;
use taskpilot_core::text::{excerpt, normalize};

use crate::config::Config;
use crate::corpus;

/// Load both corpora and wrap them in an engine configured from `config`.
pub fn open_assistant(config: &Config) -> Result<Assistant<InMemoryStore>> {
    let store = corpus::load_store(config)?;
    Ok(Assistant::new(store, config.assistant_params()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the fixed line for an empty result and return `true`, or return
/// `false` when there is something to list.
fn print_empty<T>(result: &Retrieved<T>, empty_corpus: &str) -> bool {
    match result {
        Retrieved::EmptyCorpus => {
            println!("{}", empty_corpus);
            true
        }
        Retrieved::NoMatch => {
            println!("No results.");
            true
        }
        Retrieved::Found(_) => false,
    }
}

fn entity_line(e: &Entity) -> String {
    let mut line = format!("{} [{}, {}", e.title, e.priority.label(), e.status.label());
    if let Some(deadline) = &e.deadline {
        line.push_str(&format!(", due {}", deadline));
    }
    line.push(']');
    line
}

pub fn run_classify(query: &str, json: bool) -> Result<()> {
    let normalized = normalize(query);
    let intent = classify_normalized(&normalized);
    if json {
        return print_json(&Query {
            raw: query.to_string(),
            normalized,
            intent,
        });
    }
    println!("{}", intent);
    Ok(())
}

pub async fn run_knowledge(
    config: &Config,
    query: &str,
    limit: Option<usize>,
    explain: bool,
    all: bool,
    json: bool,
) -> Result<()> {
    let assistant = open_assistant(config)?;
    let limit = limit.unwrap_or(config.retrieval.knowledge_limit);
    let opts = RetrieveOptions {
        explain,
        include_non_positive: all,
    };
    let hits = assistant.retrieve_knowledge_with(query, limit, opts).await?;

    if json {
        return print_json(&hits);
    }
    if print_empty(&hits, "No knowledge documents loaded.") {
        return Ok(());
    }

    for (i, hit) in hits.items().iter().enumerate() {
        let doc = &hit.item;
        println!("{}. [{:.2}] {} / {}", i + 1, hit.score, doc.category, doc.title);
        println!("    id: {}", doc.id);
        println!("    excerpt: \"{}\"", excerpt(&doc.answer_text, 100));
        if let Some(ref ex) = hit.explain {
            println!("    explain: {}", explain_line(ex));
        }
        println!();
    }
    Ok(())
}

fn explain_line(ex: &ScoreExplanation) -> String {
    let mut line = format!(
        "patterns={} similarity={:.3} keywords={} category=+{:.1}",
        ex.pattern_hits, ex.similarity, ex.keyword_overlap, ex.category_bonus
    );
    match ex.overview {
        Some(OverviewAdjustment::Damped) => line.push_str(" overview=damped"),
        Some(OverviewAdjustment::Boosted) => line.push_str(" overview=boosted"),
        None => {}
    }
    line
}

pub async fn run_tasks(
    config: &Config,
    query: &str,
    owner: &str,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let assistant = open_assistant(config)?;
    let limit = limit.unwrap_or(config.retrieval.entity_limit);
    let hits = assistant.retrieve_entities(query, owner, limit).await?;

    if json {
        return print_json(&hits);
    }
    if print_empty(&hits, &format!("No tasks found for {}.", owner)) {
        return Ok(());
    }

    for (i, hit) in hits.items().iter().enumerate() {
        println!("{}. [{:.2}] {}", i + 1, hit.score, entity_line(&hit.item));
        if let Some(ref project) = hit.item.project {
            println!("    project: {}", project);
        }
        println!("    id: {}", hit.item.id);
    }
    Ok(())
}

pub async fn run_rank(config: &Config, owner: &str, limit: Option<usize>, json: bool) -> Result<()> {
    let assistant = open_assistant(config)?;
    let ranked = assistant.rank_by_priority(owner, limit).await?;

    if json {
        return print_json(&ranked);
    }
    if print_empty(&ranked, &format!("No tasks found for {}.", owner)) {
        return Ok(());
    }

    for (i, r) in ranked.items().iter().enumerate() {
        println!("{}. [{:.2}] {}", i + 1, r.score, entity_line(&r.item));
        if let Some(ref f) = r.explain {
            println!(
                "    priority={} deadline={} status={} similarity={:.2}",
                f.priority, f.deadline, f.status, f.similarity
            );
        }
    }
    Ok(())
}

pub async fn run_schedule(config: &Config, owner: &str, days: Option<u32>, json: bool) -> Result<()> {
    let assistant = open_assistant(config)?;
    let schedule = assistant.build_schedule(owner, days).await?;

    if json {
        return print_json(&schedule);
    }
    print_schedule(&schedule);
    Ok(())
}

fn print_schedule(schedule: &Schedule) {
    let mut current_day = None;
    for slot in &schedule.slots {
        if current_day != Some(slot.day_index) {
            if current_day.is_some() {
                println!();
            }
            println!("Day {} ({})", slot.day_index + 1, slot.date.format("%Y-%m-%d"));
            current_day = Some(slot.day_index);
        }
        let what = match &slot.item {
            Some(e) => entity_line(e),
            None => "(free)".to_string(),
        };
        println!("  {:02}:00-{:02}:00  {}", slot.start_hour, slot.end_hour, what);
    }
    if !schedule.slots.is_empty() {
        println!();
    }
    println!("Unscheduled: {}", schedule.unscheduled_count);
}

pub async fn run_ask(config: &Config, query: &str, owner: &str, json: bool) -> Result<()> {
    let assistant = open_assistant(config)?;
    let answer = assistant.answer(query, owner).await?;

    if json {
        return print_json(&answer);
    }
    println!("{}", answer.text);
    Ok(())
}
