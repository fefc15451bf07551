//! # Taskpilot Core
//!
//! Pure retrieval-and-ranking logic for Taskpilot: text normalization,
//! sparse term vectors, intent classification, top-K retrieval, urgency
//! ranking, slot scheduling, and answer composition.
//!
//! This crate contains no filesystem I/O, no async runtime, and no
//! process-wide state. Corpora come in through the [`store::Store`] trait
//! and all caching lives inside an [`engine::Assistant`] value.
//!
//! ## Pipeline
//!
//! ```text
//! query ─▶ normalize ─▶ classify ─┬─▶ retrieve(knowledge index) ─────────┐
//!                                 └─▶ retrieve / rank / schedule          │
//!                                     (entity index of the owner) ───────┴─▶ compose ─▶ Answer
//! ```

pub mod answer;
pub mod embedding;
pub mod engine;
pub mod index;
pub mod intent;
pub mod keywords;
pub mod models;
pub mod rank;
pub mod schedule;
pub mod search;
pub mod store;
pub mod summary;
pub mod text;
