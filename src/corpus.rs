//! Loads the two corpora from disk into an in-memory store.
//!
//! - Help documents: every file under `[knowledge].root` matching the
//!   include globs (and none of the exclude globs). A file holds either one
//!   document object or an array of them. Files are read in path order and
//!   documents keep their in-file order, which fixes the corpus order used
//!   for tie-breaking.
//! - Work items: one JSON array at `[entities].path`.
//!
//! Everything is read once at startup; the engine never touches the disk.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};
use walkdir::WalkDir;

use taskpilot_core::models::{Entity, KnowledgeDocument};
use taskpilot_core::store::memory::InMemoryStore;

use crate::config::{Config, KnowledgeConfig};

#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentFile {
    Many(Vec<KnowledgeDocument>),
    One(KnowledgeDocument),
}

/// Read every help document under the configured knowledge root.
pub fn scan_knowledge(config: &KnowledgeConfig) -> Result<Vec<KnowledgeDocument>> {
    let root = &config.root;
    if !root.exists() {
        bail!("Knowledge root does not exist: {}", root.display());
    }

    let include_set = build_globset(&config.include_globs)?;
    let exclude_set = build_globset(&config.exclude_globs)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(config.follow_symlinks) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();

        if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
            continue;
        }
        files.push((rel_str, path.to_path_buf()));
    }

    // Sort for deterministic corpus order
    files.sort_by(|a, b| a.0.cmp(&b.0));

    let mut docs = Vec::new();
    for (rel_str, path) in files {
        match read_documents(&path) {
            Ok(mut batch) => docs.append(&mut batch),
            Err(e) => warn!(file = %rel_str, error = %e, "skipping unreadable knowledge file"),
        }
    }

    info!(documents = docs.len(), root = %root.display(), "knowledge loaded");
    Ok(docs)
}

fn read_documents(path: &Path) -> Result<Vec<KnowledgeDocument>> {
    let content = std::fs::read_to_string(path)?;
    let parsed: DocumentFile = serde_json::from_str(&content)?;
    Ok(match parsed {
        DocumentFile::Many(docs) => docs,
        DocumentFile::One(doc) => vec![doc],
    })
}

/// Read the work-item snapshot file.
pub fn load_entities(path: &Path) -> Result<Vec<Entity>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read entities file: {}", path.display()))?;
    let entities: Vec<Entity> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse entities file: {}", path.display()))?;
    info!(entities = entities.len(), path = %path.display(), "entities loaded");
    Ok(entities)
}

/// Load both corpora described by `config` into an [`InMemoryStore`].
pub fn load_store(config: &Config) -> Result<InMemoryStore> {
    let knowledge = scan_knowledge(&config.knowledge)?;
    let entities = match &config.entities.path {
        Some(path) => load_entities(path)?,
        None => Vec::new(),
    };
    Ok(InMemoryStore::with_corpora(knowledge, entities))
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn knowledge_config(root: &Path) -> KnowledgeConfig {
        KnowledgeConfig {
            root: root.to_path_buf(),
            include_globs: vec!["**/*.json".to_string()],
            exclude_globs: vec!["drafts/**".to_string()],
            follow_symlinks: false,
        }
    }

    #[test]
    fn test_scan_knowledge_orders_and_filters() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("drafts")).unwrap();
        fs::write(
            root.join("b.json"),
            r#"[{"id":"b1","category":"tasks","title":"B1","answer_text":"x"},
                {"id":"b2","category":"tasks","title":"B2","answer_text":"y"}]"#,
        )
        .unwrap();
        fs::write(
            root.join("a.json"),
            r#"{"id":"a","category":"general","title":"A","question_patterns":["hi"],"answer_text":"z"}"#,
        )
        .unwrap();
        fs::write(root.join("notes.txt"), "ignored").unwrap();
        fs::write(root.join("broken.json"), "{ not json").unwrap();
        fs::write(
            root.join("drafts/c.json"),
            r#"{"id":"c","category":"x","title":"C","answer_text":"w"}"#,
        )
        .unwrap();

        let docs = scan_knowledge(&knowledge_config(root)).unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b1", "b2"]);
        assert_eq!(docs[0].question_patterns, vec!["hi"]);
    }

    #[test]
    fn test_scan_knowledge_missing_root() {
        let tmp = TempDir::new().unwrap();
        assert!(scan_knowledge(&knowledge_config(&tmp.path().join("nope"))).is_err());
    }

    #[test]
    fn test_load_entities() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tasks.json");
        fs::write(
            &path,
            r#"[{"id":"1","title":"Fix login bug","status":"todo","priority":"high",
                 "deadline":"2026-05-12","owner":"u1","project":"Portal"}]"#,
        )
        .unwrap();
        let entities = load_entities(&path).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].project.as_deref(), Some("Portal"));

        fs::write(&path, "[{]").unwrap();
        assert!(load_entities(&path).is_err());
    }
}
