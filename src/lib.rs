//! # Taskpilot
//!
//! A retrieval-and-ranking assistant for a task-management workspace.
//!
//! Given a free-text question and the asking user, Taskpilot classifies the
//! question, retrieves the most relevant help documents or work items,
//! ranks open work by urgency, lays out a short work plan, and renders a
//! plain-text answer. The engine lives in [`taskpilot_core`]; this crate
//! loads corpora from disk and exposes it as the `tp` CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐
//! │  knowledge/  │──▶│ InMemoryStore│──▶│    Assistant     │
//! │  tasks.json  │   │  (corpus.rs) │   │ classify/retrieve│
//! └──────────────┘   └──────────────┘   │ rank/schedule    │
//!                                       │ answer           │
//!                                       └────────┬─────────┘
//!                                                ▼
//!                                          ┌──────────┐
//!                                          │   CLI    │
//!                                          │   (tp)   │
//!                                          └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! tp classify "what should I do first"
//! tp knowledge "how do I create a task" --explain
//! tp rank --owner alice
//! tp schedule --owner alice --days 2
//! tp ask "what are my tasks" --owner alice
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`corpus`] | Knowledge directory and work-item file loading |
//! | [`commands`] | CLI command implementations |
//! | [`stats`] | Corpus statistics |

pub mod commands;
pub mod config;
pub mod corpus;
pub mod stats;
