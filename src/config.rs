//! TOML configuration.
//!
//! Maps the on-disk `taskpilot.toml` onto the core crate's tuning structs.
//! Every section except `[knowledge]` is optional and falls back to the
//! defaults documented on each field.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use taskpilot_core::engine::AssistantParams;
use taskpilot_core::rank::RankingParams;
use taskpilot_core::schedule::ScheduleParams;
use taskpilot_core::search::RetrievalParams;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub entities: EntitiesConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KnowledgeConfig {
    /// Directory holding help documents as JSON files.
    pub root: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.json".to_string()]
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct EntitiesConfig {
    /// JSON array of work items. Absent means no work items.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_knowledge_limit")]
    pub knowledge_limit: usize,
    #[serde(default = "default_entity_limit")]
    pub entity_limit: usize,
    #[serde(default = "default_pattern_weight")]
    pub pattern_weight: f64,
    #[serde(default = "default_similarity_weight")]
    pub similarity_weight: f64,
    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: f64,
    #[serde(default = "default_category_bonus")]
    pub category_bonus: f64,
    #[serde(default = "default_overview_id")]
    pub overview_id: Option<String>,
    #[serde(default = "default_overview_damping")]
    pub overview_damping: f64,
    #[serde(default = "default_overview_bonus")]
    pub overview_bonus: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            knowledge_limit: default_knowledge_limit(),
            entity_limit: default_entity_limit(),
            pattern_weight: default_pattern_weight(),
            similarity_weight: default_similarity_weight(),
            keyword_weight: default_keyword_weight(),
            category_bonus: default_category_bonus(),
            overview_id: default_overview_id(),
            overview_damping: default_overview_damping(),
            overview_bonus: default_overview_bonus(),
        }
    }
}

fn default_knowledge_limit() -> usize {
    3
}
fn default_entity_limit() -> usize {
    5
}
fn default_pattern_weight() -> f64 {
    10.0
}
fn default_similarity_weight() -> f64 {
    3.0
}
fn default_keyword_weight() -> f64 {
    2.0
}
fn default_category_bonus() -> f64 {
    3.0
}
fn default_overview_id() -> Option<String> {
    Some("overview".to_string())
}
fn default_overview_damping() -> f64 {
    0.1
}
fn default_overview_bonus() -> f64 {
    20.0
}

#[derive(Debug, Deserialize, Clone)]
pub struct RankingConfig {
    #[serde(default = "default_rank_limit")]
    pub limit: usize,
    #[serde(default = "default_priority_weight")]
    pub priority_weight: f64,
    #[serde(default = "default_deadline_weight")]
    pub deadline_weight: f64,
    #[serde(default = "default_status_weight")]
    pub status_weight: f64,
    #[serde(default = "default_similarity_weight")]
    pub similarity_weight: f64,
    #[serde(default = "default_due_soon_days")]
    pub due_soon_days: i64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            limit: default_rank_limit(),
            priority_weight: default_priority_weight(),
            deadline_weight: default_deadline_weight(),
            status_weight: default_status_weight(),
            similarity_weight: default_similarity_weight(),
            due_soon_days: default_due_soon_days(),
        }
    }
}

fn default_rank_limit() -> usize {
    10
}
fn default_priority_weight() -> f64 {
    5.0
}
fn default_deadline_weight() -> f64 {
    2.0
}
fn default_status_weight() -> f64 {
    1.0
}
fn default_due_soon_days() -> i64 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScheduleConfig {
    #[serde(default = "default_days")]
    pub days: u32,
    /// `[start_hour, end_hour]` pairs; exactly two are required.
    #[serde(default = "default_slots")]
    pub slots: Vec<[u32; 2]>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            days: default_days(),
            slots: default_slots(),
        }
    }
}

fn default_days() -> u32 {
    3
}
fn default_slots() -> Vec<[u32; 2]> {
    vec![[8, 12], [13, 17]]
}

impl Config {
    /// Translate into the core crate's tuning parameters.
    pub fn assistant_params(&self) -> AssistantParams {
        let r = &self.retrieval;
        let fallback = ScheduleParams::default().slots;
        let slot = |i: usize| {
            self.schedule
                .slots
                .get(i)
                .map(|[start, end]| (*start, *end))
                .unwrap_or(fallback[i])
        };
        let slots = [slot(0), slot(1)];
        AssistantParams {
            retrieval: RetrievalParams {
                pattern_weight: r.pattern_weight,
                similarity_weight: r.similarity_weight,
                keyword_weight: r.keyword_weight,
                category_bonus: r.category_bonus,
                overview_id: r.overview_id.clone().filter(|id| !id.is_empty()),
                overview_damping: r.overview_damping,
                overview_bonus: r.overview_bonus,
            },
            ranking: RankingParams {
                priority_weight: self.ranking.priority_weight,
                deadline_weight: self.ranking.deadline_weight,
                status_weight: self.ranking.status_weight,
                similarity_weight: self.ranking.similarity_weight,
                due_soon_days: self.ranking.due_soon_days,
                default_limit: self.ranking.limit,
            },
            schedule: ScheduleParams {
                slots,
                default_days: self.schedule.days,
            },
            knowledge_limit: r.knowledge_limit,
            entity_limit: r.entity_limit,
        }
    }
}

/// Upper bound for `ranking.due_soon_days` (ten years).
const MAX_DUE_SOON_DAYS: i64 = 3650;

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    // Validate retrieval
    let r = &config.retrieval;
    if r.knowledge_limit < 1 || r.entity_limit < 1 {
        bail!("retrieval.knowledge_limit and retrieval.entity_limit must be >= 1");
    }
    for (name, w) in [
        ("pattern_weight", r.pattern_weight),
        ("similarity_weight", r.similarity_weight),
        ("keyword_weight", r.keyword_weight),
        ("category_bonus", r.category_bonus),
        ("overview_bonus", r.overview_bonus),
    ] {
        if w < 0.0 {
            bail!("retrieval.{} must be >= 0", name);
        }
    }
    if !(0.0..=1.0).contains(&r.overview_damping) {
        bail!("retrieval.overview_damping must be in [0.0, 1.0]");
    }

    // Validate ranking
    if config.ranking.limit < 1 {
        bail!("ranking.limit must be >= 1");
    }
    if !(0..=MAX_DUE_SOON_DAYS).contains(&config.ranking.due_soon_days) {
        bail!("ranking.due_soon_days must be in [0, {}]", MAX_DUE_SOON_DAYS);
    }

    // Validate schedule
    let slots = &config.schedule.slots;
    if config.schedule.days < 1 {
        bail!("schedule.days must be >= 1");
    }
    if slots.len() != 2 {
        bail!("schedule.slots must contain exactly two [start, end] pairs");
    }
    for [start, end] in slots {
        if start >= end || *end > 24 {
            bail!(
                "schedule slot [{}, {}] must satisfy start < end <= 24",
                start,
                end
            );
        }
    }
    if slots[0][1] > slots[1][0] {
        bail!("schedule.slots must be ordered and non-overlapping");
    }

    Ok(())
}
