//! Ranked, quality-filtered retrieval of curated content.
//!
//! The retrieval algorithm operates entirely through the [`ContentStore`]
//! trait. The calling application decides the defaults (quality floor and
//! limit) and passes the appropriate store implementation.
//!
//! # Ranking
//!
//! 1. Keep active items of the requested topic with
//!    `quality_score >= min_quality`.
//! 2. Sort by `quality_score` (desc), `publication_date` (desc), `url` (asc).
//! 3. Truncate to `limit`.
//!
//! Multi-topic reads fetch every topic independently with the same contract,
//! concatenate the results, and re-sort the combined list with the same rule.

use std::cmp::Ordering;

use crate::error::RetrievalError;
use crate::models::{ContentItem, Topic};
use crate::store::{ContentStore, TopicQuery};

/// Default quality floor applied when the caller does not supply one.
pub const DEFAULT_MIN_QUALITY: f64 = 0.4;

/// Default "top shelf" size.
pub const DEFAULT_LIMIT: usize = 12;

/// Total order used for every ranked list: most trustworthy first, most
/// recent as tie-break, URL for determinism.
pub fn rank_order(a: &ContentItem, b: &ContentItem) -> Ordering {
    b.quality_score
        .partial_cmp(&a.quality_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.publication_date.cmp(&a.publication_date))
        .then_with(|| a.url.cmp(&b.url))
}

/// Reject a quality floor outside `[0, 1]` and a zero limit.
pub fn validate_query(min_quality: f64, limit: usize) -> Result<(), RetrievalError> {
    if !(0.0..=1.0).contains(&min_quality) {
        return Err(RetrievalError::InvalidQuery(format!(
            "min_quality must be in [0.0, 1.0], got {}",
            min_quality
        )));
    }
    if limit == 0 {
        return Err(RetrievalError::InvalidQuery(
            "limit must be >= 1".to_string(),
        ));
    }
    Ok(())
}

/// Fetch up to `query.limit` ranked items for one topic.
pub async fn fetch<S: ContentStore + ?Sized>(
    store: &S,
    query: &TopicQuery,
) -> Result<Vec<ContentItem>, RetrievalError> {
    validate_query(query.min_quality, query.limit)?;

    let mut items = store
        .select_ranked(query)
        .await
        .map_err(|e| RetrievalError::Unavailable(e.into()))?;

    items.retain(|i| i.is_active && i.topic == query.topic && i.quality_score >= query.min_quality);
    items.sort_by(rank_order);
    items.truncate(query.limit);
    Ok(items)
}

/// Fetch several topics and merge them into one ranked list.
///
/// Each topic is capped at `limit` on its own; the combined list is not
/// truncated further. Duplicate topics in `topics` are fetched once.
pub async fn fetch_many<S: ContentStore + ?Sized>(
    store: &S,
    topics: &[Topic],
    min_quality: f64,
    limit: usize,
) -> Result<Vec<ContentItem>, RetrievalError> {
    validate_query(min_quality, limit)?;

    let mut seen: Vec<Topic> = Vec::with_capacity(topics.len());
    let mut combined = Vec::new();
    for &topic in topics {
        if seen.contains(&topic) {
            continue;
        }
        seen.push(topic);
        let query = TopicQuery {
            topic,
            min_quality,
            limit,
        };
        combined.extend(fetch(store, &query).await?);
    }
    combined.sort_by(rank_order);
    Ok(combined)
}
