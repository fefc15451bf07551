//! Collaborator abstraction for the two corpora.
//!
//! The engine never owns corpus data. It asks a [`Store`] for a snapshot
//! of the knowledge base or of one owner's work items, indexes it, and
//! treats the snapshot as immutable for the rest of the request.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Entity, KnowledgeDocument};

/// Source of corpus snapshots.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`fetch_knowledge_corpus`](Store::fetch_knowledge_corpus) | All help documents (static) |
/// | [`fetch_entities_for_owner`](Store::fetch_entities_for_owner) | Current work items of one owner |
#[async_trait]
pub trait Store: Send + Sync {
    /// Return every help document, in a stable order.
    async fn fetch_knowledge_corpus(&self) -> Result<Vec<KnowledgeDocument>>;

    /// Return the current work items belonging to `owner`.
    async fn fetch_entities_for_owner(&self, owner: &str) -> Result<Vec<Entity>>;
}
