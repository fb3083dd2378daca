//! # Topic Curator
//!
//! Builds topical collections of child-development articles from a web search
//! provider and serves them ranked by trust and recency.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────────────┐   ┌──────────┐
//! │ Search API   │──▶│ Ingestion job            │──▶│  SQLite  │
//! │ (rate-limited)│  │ normalize/dedupe/score   │   │ content  │
//! └──────────────┘   └──────────────────────────┘   └────┬─────┘
//!                                                        │
//!                                   ┌────────────────────┤
//!                                   ▼                    ▼
//!                              ┌──────────┐        ┌──────────┐
//!                              │   CLI    │        │   HTTP   │
//!                              │ (curate) │        │  (axum)  │
//!                              └──────────┘        └──────────┘
//! ```
//!
//! The pure pipeline stages and the ranking contract live in
//! [`curator_core`]; this crate adds configuration, SQLite persistence, the
//! HTTP search client, rate limiting, and the command and HTTP surfaces.
//!
//! ## Quick Start
//!
//! ```bash
//! curate init
//! curate populate sleep_patterns
//! curate fetch sleep_patterns --limit 5
//! curate serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite content store |
//! | [`search_client`] | HTTP search provider |
//! | [`limiter`] | Rate-limited provider wrapper |
//! | [`ingest`] | Ingestion job |
//! | [`retrieval`] | CLI read surface |
//! | [`server`] | HTTP read API |

pub mod admin;
pub mod config;
pub mod db;
pub mod ingest;
pub mod limiter;
pub mod logging;
pub mod migrate;
pub mod retrieval;
pub mod search_client;
pub mod server;
pub mod sqlite_store;
pub mod stats;
pub mod topics;
