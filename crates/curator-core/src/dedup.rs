//! URL deduplication for one ingestion job.
//!
//! Two structures cooperate:
//!
//! - [`SeenUrls`] is the job's set of URLs that are already taken: it starts
//!   as every URL in the store (any topic, active or not) and grows by each
//!   query's URLs once that query has been processed.
//! - [`DraftSet`] collects the drafts that will be written, keyed by URL.
//!   Inserting a URL that is already present overwrites the earlier draft in
//!   place (last write wins), so iteration order stays the order in which
//!   URLs were first seen.
//!
//! Together they guarantee that the job never emits two drafts with the same
//! URL and never emits a URL that the store already holds.

use std::collections::{HashMap, HashSet};

use crate::models::ContentDraft;

/// URLs that can no longer be claimed by a draft in this job.
#[derive(Debug, Clone, Default)]
pub struct SeenUrls {
    urls: HashSet<String>,
}

impl SeenUrls {
    /// Seed from the URLs already present in the content store.
    pub fn from_stored(stored: impl IntoIterator<Item = String>) -> Self {
        Self {
            urls: stored.into_iter().collect(),
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Mark URLs as taken.
    pub fn extend<'a>(&mut self, urls: impl IntoIterator<Item = &'a str>) {
        self.urls.extend(urls.into_iter().map(str::to_string));
    }
}

/// Drafts accumulated during a run, unique by URL.
#[derive(Debug, Clone, Default)]
pub struct DraftSet {
    slots: Vec<ContentDraft>,
    index: HashMap<String, usize>,
}

impl DraftSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a draft, replacing any earlier draft with the same URL.
    ///
    /// Returns `true` when an earlier draft was overwritten.
    pub fn insert(&mut self, draft: ContentDraft) -> bool {
        match self.index.get(&draft.url) {
            Some(&slot) => {
                self.slots[slot] = draft;
                true
            }
            None => {
                self.index.insert(draft.url.clone(), self.slots.len());
                self.slots.push(draft);
                false
            }
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.index.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContentDraft> {
        self.slots.iter()
    }

    pub fn into_drafts(self) -> Vec<ContentDraft> {
        self.slots
    }
}

/// Result of deduplicating one query's drafts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupeOutcome {
    /// Drafts newly added to the set.
    pub kept: usize,
    /// Drafts dropped because their URL was already taken.
    pub already_taken: usize,
    /// Drafts that replaced an earlier draft of the same query.
    pub overwritten: usize,
}

/// Deduplicate one query's drafts into `set`.
///
/// Drafts whose URL is in `seen` are discarded. Survivors are inserted into
/// `set` with last-write-wins semantics. Afterwards every URL of this batch
/// is marked as seen, so later queries treat it as taken.
pub fn dedupe(drafts: Vec<ContentDraft>, seen: &mut SeenUrls, set: &mut DraftSet) -> DedupeOutcome {
    let mut outcome = DedupeOutcome::default();
    let mut batch_urls: Vec<String> = Vec::with_capacity(drafts.len());

    for draft in drafts {
        if seen.contains(&draft.url) {
            outcome.already_taken += 1;
            continue;
        }
        batch_urls.push(draft.url.clone());
        if set.insert(draft) {
            outcome.overwritten += 1;
        } else {
            outcome.kept += 1;
        }
    }

    seen.extend(batch_urls.iter().map(String::as_str));
    outcome
}
