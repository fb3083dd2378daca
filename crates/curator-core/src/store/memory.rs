//! In-memory [`ContentStore`] implementation for tests and embedding.
//!
//! Rows live in a `Vec` behind a `std::sync::RwLock`, with a URL index that
//! enforces the same unique key as the SQLite table. A batch is validated
//! in full before the write lock mutates anything, so readers observe either
//! none or all of it.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use crate::models::{ContentItem, Topic, TopicStats};
use crate::retrieval::rank_order;

use super::{ContentStore, TopicQuery};

#[derive(Default)]
struct Rows {
    items: Vec<ContentItem>,
    by_url: HashMap<String, usize>,
}

/// In-memory content store.
#[derive(Default)]
pub struct InMemoryStore {
    rows: RwLock<Rows>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `items` (bypassing batch semantics).
    pub fn with_items(items: Vec<ContentItem>) -> Result<Self> {
        let store = Self::new();
        {
            let mut rows = store.write()?;
            for item in items {
                if rows.by_url.contains_key(&item.url) {
                    bail!("duplicate url in seed data: {}", item.url);
                }
                let slot = rows.items.len();
                rows.by_url.insert(item.url.clone(), slot);
                rows.items.push(item);
            }
        }
        Ok(store)
    }

    /// Snapshot of every row, in insertion order.
    pub fn items(&self) -> Result<Vec<ContentItem>> {
        Ok(self.read()?.items.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Rows>> {
        self.rows
            .read()
            .map_err(|_| anyhow!("content store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Rows>> {
        self.rows
            .write()
            .map_err(|_| anyhow!("content store lock poisoned"))
    }
}

#[async_trait]
impl ContentStore for InMemoryStore {
    async fn all_urls(&self) -> Result<HashSet<String>> {
        Ok(self.read()?.by_url.keys().cloned().collect())
    }

    async fn insert_batch(&self, items: &[ContentItem]) -> Result<u64> {
        let mut rows = self.write()?;

        let mut batch_urls: HashSet<&str> = HashSet::with_capacity(items.len());
        for item in items {
            if rows.by_url.contains_key(&item.url) {
                bail!("UNIQUE constraint failed: content_items.url ({})", item.url);
            }
            if !batch_urls.insert(item.url.as_str()) {
                bail!(
                    "UNIQUE constraint failed: content_items.url ({}) repeated in batch",
                    item.url
                );
            }
        }

        for item in items {
            let slot = rows.items.len();
            rows.by_url.insert(item.url.clone(), slot);
            rows.items.push(item.clone());
        }
        Ok(items.len() as u64)
    }

    async fn select_ranked(&self, query: &TopicQuery) -> Result<Vec<ContentItem>> {
        let rows = self.read()?;
        let mut selected: Vec<ContentItem> = rows
            .items
            .iter()
            .filter(|i| i.is_active && i.topic == query.topic && i.quality_score >= query.min_quality)
            .cloned()
            .collect();
        selected.sort_by(rank_order);
        selected.truncate(query.limit);
        Ok(selected)
    }

    async fn set_active(&self, url: &str, active: bool) -> Result<bool> {
        let mut rows = self.write()?;
        let Some(&slot) = rows.by_url.get(url) else {
            return Ok(false);
        };
        rows.items[slot].is_active = active;
        Ok(true)
    }

    async fn count_url(&self, url: &str) -> Result<u64> {
        let rows = self.read()?;
        Ok(rows.items.iter().filter(|i| i.url == url).count() as u64)
    }

    async fn topic_stats(&self) -> Result<Vec<TopicStats>> {
        let rows = self.read()?;
        let mut stats = Vec::new();
        for topic in Topic::ALL {
            let items: Vec<&ContentItem> = rows.items.iter().filter(|i| i.topic == topic).collect();
            if items.is_empty() {
                continue;
            }
            let active: Vec<&&ContentItem> = items.iter().filter(|i| i.is_active).collect();
            let avg_quality = if active.is_empty() {
                None
            } else {
                Some(active.iter().map(|i| i.quality_score).sum::<f64>() / active.len() as f64)
            };
            stats.push(TopicStats {
                topic,
                total: items.len() as i64,
                active: active.len() as i64,
                avg_quality,
                latest_publication: items.iter().map(|i| i.publication_date).max(),
            });
        }
        Ok(stats)
    }

    async fn clear(&self) -> Result<u64> {
        let mut rows = self.write()?;
        let removed = rows.items.len() as u64;
        rows.items.clear();
        rows.by_url.clear();
        Ok(removed)
    }
}
