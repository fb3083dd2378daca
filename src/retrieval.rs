//! Read surface over the ranking service.
//!
//! Both `curate fetch` and the HTTP server go through
//! [`curator_core::retrieval`]. The CLI renders through [`fetch_or_empty`]:
//! bad arguments are an error, an unavailable store shows "No content.".

use anyhow::{bail, Result};

use curator_core::models::{ContentItem, Topic};
use curator_core::retrieval::{fetch_many, validate_query};
use curator_core::store::ContentStore;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

/// Fetch and merge `topics`, returning an empty list when retrieval fails.
///
/// The failure is logged with its full source chain.
pub async fn fetch_or_empty<S: ContentStore + ?Sized>(
    store: &S,
    topics: &[Topic],
    min_quality: f64,
    limit: usize,
) -> Vec<ContentItem> {
    match fetch_many(store, topics, min_quality, limit).await {
        Ok(items) => items,
        Err(e) => {
            let detail = std::error::Error::source(&e)
                .map(|s| s.to_string())
                .unwrap_or_default();
            tracing::warn!(error = %e, detail = %detail, "retrieval failed; showing no content");
            Vec::new()
        }
    }
}

/// `curate fetch`: print the ranked list for one or more topics.
pub async fn run_fetch(
    config: &Config,
    topics: &[String],
    min_quality: Option<f64>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    if topics.is_empty() {
        bail!("at least one topic is required");
    }
    let topics = topics
        .iter()
        .map(|t| t.parse::<Topic>())
        .collect::<Result<Vec<_>, _>>()?;

    let min_quality = min_quality.unwrap_or(config.retrieval.min_quality);
    let limit = limit.unwrap_or(config.retrieval.final_limit);

    validate_query(min_quality, limit)?;

    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);
    let items = fetch_or_empty(&store, &topics, min_quality, limit).await;
    store.close().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("No content.");
        return Ok(());
    }

    for (i, item) in items.iter().enumerate() {
        println!(
            "{}. [{:.2}] {} ({}, {})",
            i + 1,
            item.quality_score,
            item.title,
            item.source_domain,
            item.publication_date
        );
        println!("    topic: {}", item.topic);
        println!("    url: {}", item.url);
        println!("    {}", item.summary);
        println!();
    }

    Ok(())
}
