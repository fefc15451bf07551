//! Corpus statistics.
//!
//! A quick summary of what was loaded: help documents per category, work
//! items per owner and, for one owner, breakdowns by status, priority, and
//! project. Used by `tp stats` to confirm the config points at the right
//! files.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use taskpilot_core::models::{Entity, Priority};
use taskpilot_core::store::Store;
use taskpilot_core::summary::{self, ProjectProgress, StatusCount};

use crate::config::Config;
use crate::corpus;

#[derive(Debug, Serialize)]
struct CategoryCount {
    category: String,
    count: usize,
}

#[derive(Debug, Serialize)]
struct OwnerCount {
    owner: String,
    count: usize,
}

#[derive(Debug, Serialize)]
struct PriorityCount {
    priority: &'static str,
    count: usize,
}

#[derive(Debug, Serialize)]
struct OwnerStats {
    owner: String,
    total: usize,
    open: usize,
    by_status: Vec<StatusCount>,
    by_priority: Vec<PriorityCount>,
    by_project: Vec<ProjectProgress>,
}

#[derive(Debug, Serialize)]
struct CorpusStats {
    knowledge_root: String,
    documents: usize,
    categories: Vec<CategoryCount>,
    entities: usize,
    owners: Vec<OwnerCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<OwnerStats>,
}

/// Run the stats command: load the corpora and print a summary.
pub async fn run_stats(config: &Config, owner: Option<&str>, json: bool) -> Result<()> {
    let store = corpus::load_store(config)?;
    let docs = store.fetch_knowledge_corpus().await?;

    let mut categories: BTreeMap<&str, usize> = BTreeMap::new();
    for doc in &docs {
        *categories.entry(doc.category.as_str()).or_insert(0) += 1;
    }

    let mut owners = Vec::new();
    let mut entities = 0;
    for name in store.owners() {
        let count = store.fetch_entities_for_owner(&name).await?.len();
        entities += count;
        owners.push(OwnerCount { owner: name, count });
    }

    let owner = match owner {
        Some(name) => {
            let items = store.fetch_entities_for_owner(name).await?;
            Some(owner_stats(name, &items))
        }
        None => None,
    };

    let stats = CorpusStats {
        knowledge_root: config.knowledge.root.display().to_string(),
        documents: docs.len(),
        categories: categories
            .into_iter()
            .map(|(c, count)| CategoryCount {
                category: c.to_string(),
                count,
            })
            .collect(),
        entities,
        owners,
        owner,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_stats(&stats);
    }
    Ok(())
}

fn owner_stats(owner: &str, items: &[Entity]) -> OwnerStats {
    let by_priority = [Priority::High, Priority::Medium, Priority::Low]
        .into_iter()
        .map(|p| PriorityCount {
            priority: p.label(),
            count: items.iter().filter(|e| e.priority == p).count(),
        })
        .filter(|c| c.count > 0)
        .collect();

    OwnerStats {
        owner: owner.to_string(),
        total: items.len(),
        open: items.iter().filter(|e| e.is_incomplete()).count(),
        by_status: summary::status_counts(items),
        by_priority,
        by_project: summary::project_progress(items),
    }
}

fn print_stats(stats: &CorpusStats) {
    println!("Taskpilot Corpus Stats");
    println!("======================");
    println!();
    println!("  Knowledge:   {}", stats.knowledge_root);
    println!("  Documents:   {}", stats.documents);
    println!("  Work items:  {}", stats.entities);

    if !stats.categories.is_empty() {
        println!();
        println!("  By category:");
        println!("  {:<20} {:>6}", "CATEGORY", "DOCS");
        for c in &stats.categories {
            println!("  {:<20} {:>6}", c.category, c.count);
        }
    }

    if !stats.owners.is_empty() {
        println!();
        println!("  By owner:");
        println!("  {:<20} {:>6}", "OWNER", "ITEMS");
        for o in &stats.owners {
            println!("  {:<20} {:>6}", o.owner, o.count);
        }
    }

    if let Some(ref o) = stats.owner {
        println!();
        println!("  Owner {}: {} items, {} open", o.owner, o.total, o.open);
        for s in &o.by_status {
            println!("    {:<18} {:>6}", s.status, s.count);
        }
        println!();
        for p in &o.by_priority {
            println!("    {:<18} {:>6}", p.priority, p.count);
        }
        if !o.by_project.is_empty() {
            println!();
            println!("    {:<18} {:>6} {:>6} {:>5}", "PROJECT", "DONE", "TOTAL", "%");
            for p in &o.by_project {
                println!(
                    "    {:<18} {:>6} {:>6} {:>4}%",
                    p.project, p.done, p.total, p.percent
                );
            }
        }
    }
    println!();
}
