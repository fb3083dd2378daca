//! Storage abstraction for Topic Curator.
//!
//! The [`ContentStore`] trait defines every storage operation the ingestion
//! job and the retrieval service need, enabling pluggable backends (SQLite,
//! in-memory).
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;

use crate::models::{ContentItem, Topic, TopicStats};

/// Filters and bounds for one topic's ranked read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopicQuery {
    pub topic: Topic,
    /// Inclusive quality floor.
    pub min_quality: f64,
    /// Maximum number of items returned.
    pub limit: usize,
}

/// Abstract content store.
///
/// The ingestion job is the sole writer; the retrieval service only calls
/// [`select_ranked`](ContentStore::select_ranked).
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`all_urls`](ContentStore::all_urls) | Every stored URL, any topic or active flag |
/// | [`insert_batch`](ContentStore::insert_batch) | All-or-nothing bulk insert |
/// | [`select_ranked`](ContentStore::select_ranked) | Active items of a topic above a quality floor, ranked |
/// | [`set_active`](ContentStore::set_active) | Flip the soft-delete flag |
/// | [`count_url`](ContentStore::count_url) | Rows holding a URL |
/// | [`topic_stats`](ContentStore::topic_stats) | Per-topic aggregates |
/// | [`clear`](ContentStore::clear) | Administrative full clear |
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Every URL present in the store, regardless of topic or active flag.
    async fn all_urls(&self) -> Result<HashSet<String>>;

    /// Insert a batch of new items atomically.
    ///
    /// If any item is rejected (for example its URL already exists, or
    /// appears twice in the batch) nothing is written and an error is
    /// returned. Returns the number of rows inserted.
    async fn insert_batch(&self, items: &[ContentItem]) -> Result<u64>;

    /// Active items of `query.topic` with `quality_score >= query.min_quality`,
    /// ordered by quality desc, publication date desc, URL asc, and capped
    /// at `query.limit`.
    async fn select_ranked(&self, query: &TopicQuery) -> Result<Vec<ContentItem>>;

    /// Set the soft-delete flag for a URL. Returns `false` when no row has it.
    async fn set_active(&self, url: &str, active: bool) -> Result<bool>;

    /// Number of rows holding `url` (0 or 1 while the unique key holds).
    async fn count_url(&self, url: &str) -> Result<u64>;

    /// Per-topic totals for topics that have at least one row.
    async fn topic_stats(&self) -> Result<Vec<TopicStats>>;

    /// Remove every row. Returns the number of rows deleted.
    async fn clear(&self) -> Result<u64>;
}
