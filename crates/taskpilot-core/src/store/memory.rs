//! In-memory [`Store`] implementation.
//!
//! Holds already-materialized corpora behind `std::sync::RwLock`. The
//! application loads files into it at startup; tests mutate it directly to
//! simulate a changing work-item collection.

use std::collections::BTreeSet;
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Entity, KnowledgeDocument};

use super::Store;

/// In-memory store for the CLI and tests.
pub struct InMemoryStore {
    knowledge: RwLock<Vec<KnowledgeDocument>>,
    entities: RwLock<Vec<Entity>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            knowledge: RwLock::new(Vec::new()),
            entities: RwLock::new(Vec::new()),
        }
    }

    pub fn with_corpora(knowledge: Vec<KnowledgeDocument>, entities: Vec<Entity>) -> Self {
        Self {
            knowledge: RwLock::new(knowledge),
            entities: RwLock::new(entities),
        }
    }

    /// Insert an entity, replacing any existing one with the same id.
    pub fn upsert_entity(&self, entity: Entity) {
        let mut entities = self.entities.write().unwrap_or_else(|e| e.into_inner());
        match entities.iter_mut().find(|e| e.id == entity.id) {
            Some(existing) => *existing = entity,
            None => entities.push(entity),
        }
    }

    /// Remove an entity by id. Returns whether it existed.
    pub fn remove_entity(&self, id: &str) -> bool {
        let mut entities = self.entities.write().unwrap_or_else(|e| e.into_inner());
        let before = entities.len();
        entities.retain(|e| e.id != id);
        entities.len() != before
    }

    /// Distinct owners, sorted.
    pub fn owners(&self) -> Vec<String> {
        let entities = self.entities.read().unwrap_or_else(|e| e.into_inner());
        entities
            .iter()
            .map(|e| e.owner.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn fetch_knowledge_corpus(&self) -> Result<Vec<KnowledgeDocument>> {
        let knowledge = self.knowledge.read().unwrap_or_else(|e| e.into_inner());
        Ok(knowledge.clone())
    }

    async fn fetch_entities_for_owner(&self, owner: &str) -> Result<Vec<Entity>> {
        let entities = self.entities.read().unwrap_or_else(|e| e.into_inner());
        Ok(entities.iter().filter(|e| e.owner == owner).cloned().collect())
    }
}
