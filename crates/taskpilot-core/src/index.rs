//! In-memory corpus index and the per-corpus index cache.
//!
//! An [`Index`] is built from exactly one corpus snapshot by vectorizing and
//! keyword-extracting every item, preserving the corpus order. There is no
//! incremental update: a changed corpus means a new index.
//!
//! [`IndexCache`] holds at most one index per corpus identity:
//!
//! | Corpus | Identity | Rebuilt when |
//! |--------|----------|--------------|
//! | knowledge base | fixed | never (loaded once) |
//! | entities of owner `R` | owner id + snapshot fingerprint | the snapshot fingerprint changes |
//!
//! Builds go through a `OnceLock`, so concurrent callers racing on a cold
//! cache block on the single in-flight build instead of starting their own.
//! Once built, an index is immutable and shared via `Arc` without locking.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::embedding::TermVector;
use crate::keywords::extract_keywords;
use crate::models::{Entity, KnowledgeDocument};
use crate::text::normalize;

/// A corpus item that can be indexed and retrieved.
pub trait Indexable: Clone {
    /// Stable identifier within the corpus.
    fn id(&self) -> &str;
    /// Vector representation used for similarity.
    fn vector(&self) -> TermVector;
    /// Text keywords are extracted from.
    fn keyword_text(&self) -> String;
    /// Phrasings that route directly to this item.
    fn question_patterns(&self) -> &[String] {
        &[]
    }
    /// Category name used for the category bonus.
    fn category(&self) -> Option<&str> {
        None
    }
}

impl Indexable for KnowledgeDocument {
    fn id(&self) -> &str {
        &self.id
    }

    fn vector(&self) -> TermVector {
        TermVector::for_document(self)
    }

    fn keyword_text(&self) -> String {
        let mut text = self.title.clone();
        for p in &self.question_patterns {
            text.push(' ');
            text.push_str(p);
        }
        text
    }

    fn question_patterns(&self) -> &[String] {
        &self.question_patterns
    }

    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }
}

impl Indexable for Entity {
    fn id(&self) -> &str {
        &self.id
    }

    fn vector(&self) -> TermVector {
        TermVector::for_entity(self)
    }

    fn keyword_text(&self) -> String {
        match &self.content {
            Some(content) => format!("{} {}", self.title, content),
            None => self.title.clone(),
        }
    }

    fn category(&self) -> Option<&str> {
        self.project.as_deref()
    }
}

/// One indexed corpus item.
#[derive(Debug, Clone)]
pub struct IndexEntry<T> {
    pub source: T,
    pub vector: TermVector,
    pub keywords: BTreeSet<String>,
    /// Normalized question patterns (empty for entities).
    pub patterns: Vec<String>,
    /// Normalized category, if the item has one.
    pub category: Option<String>,
}

/// Precomputed representation of one corpus snapshot.
#[derive(Debug, Clone)]
pub struct Index<T> {
    entries: Vec<IndexEntry<T>>,
}

impl<T: Indexable> Index<T> {
    /// Build an index over `items`, keeping their order.
    pub fn build(items: &[T]) -> Self {
        let entries = items
            .iter()
            .map(|item| IndexEntry {
                source: item.clone(),
                vector: item.vector(),
                keywords: extract_keywords(&item.keyword_text()),
                patterns: item
                    .question_patterns()
                    .iter()
                    .map(|p| normalize(p))
                    .filter(|p| !p.is_empty())
                    .collect(),
                category: item
                    .category()
                    .map(normalize)
                    .filter(|c| !c.is_empty()),
            })
            .collect();
        Self { entries }
    }
}

impl<T> Index<T> {
    pub fn entries(&self) -> &[IndexEntry<T>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// SHA-256 fingerprint of an entity snapshot, order-sensitive.
pub fn fingerprint_entities(entities: &[Entity]) -> String {
    let mut hasher = Sha256::new();
    for e in entities {
        for field in [
            Some(e.id.as_str()),
            Some(e.title.as_str()),
            e.content.as_deref(),
            Some(e.status.label()),
            Some(e.priority.label()),
            e.deadline.as_deref(),
            Some(e.owner.as_str()),
            e.project.as_deref(),
        ] {
            hasher.update(field.unwrap_or("").as_bytes());
            hasher.update([0x1f]);
        }
        hasher.update([0x1e]);
    }
    format!("{:x}", hasher.finalize())
}

struct EntitySlot {
    fingerprint: String,
    index: OnceLock<Arc<Index<Entity>>>,
}

/// Per-corpus index cache with at-most-once build semantics.
#[derive(Default)]
pub struct IndexCache {
    knowledge: OnceLock<Arc<Index<KnowledgeDocument>>>,
    entities: Mutex<HashMap<String, Arc<EntitySlot>>>,
    builds: AtomicUsize,
}

impl IndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The knowledge index, if it has been built.
    pub fn knowledge(&self) -> Option<Arc<Index<KnowledgeDocument>>> {
        self.knowledge.get().cloned()
    }

    /// Return the knowledge index, building it from `docs` on first use.
    ///
    /// `docs` is ignored once the index exists.
    pub fn knowledge_or_build(&self, docs: &[KnowledgeDocument]) -> Arc<Index<KnowledgeDocument>> {
        self.knowledge
            .get_or_init(|| {
                self.builds.fetch_add(1, Ordering::SeqCst);
                let index = Index::build(docs);
                debug!(corpus = "knowledge", entries = index.len(), "index built");
                Arc::new(index)
            })
            .clone()
    }

    /// Return the entity index for `owner`, building it when the snapshot
    /// differs from the one the cached index was built from.
    pub fn entities_or_build(&self, owner: &str, snapshot: &[Entity]) -> Arc<Index<Entity>> {
        let fingerprint = fingerprint_entities(snapshot);

        let slot = {
            let mut slots = self.entities.lock().unwrap_or_else(|e| e.into_inner());
            match slots.get(owner) {
                Some(slot) if slot.fingerprint == fingerprint => slot.clone(),
                _ => {
                    let slot = Arc::new(EntitySlot {
                        fingerprint: fingerprint.clone(),
                        index: OnceLock::new(),
                    });
                    slots.insert(owner.to_string(), slot.clone());
                    slot
                }
            }
        };

        slot.index
            .get_or_init(|| {
                self.builds.fetch_add(1, Ordering::SeqCst);
                let index = Index::build(snapshot);
                debug!(
                    corpus = "entities",
                    owner,
                    entries = index.len(),
                    fingerprint = %&fingerprint[..12],
                    "index built"
                );
                Arc::new(index)
            })
            .clone()
    }

    /// Total number of index builds performed by this cache.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}
