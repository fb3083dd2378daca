//! Administrative writes outside the ingestion job: soft-delete toggles
//! and the full clear.

use anyhow::{bail, Result};

use curator_core::store::ContentStore;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

/// `curate deactivate` / `curate reactivate`.
pub async fn run_set_active(config: &Config, url: &str, active: bool) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);
    let found = store.set_active(url, active).await;
    store.close().await;

    if !found? {
        bail!("No content item with url: {}", url);
    }
    let verb = if active { "reactivated" } else { "deactivated" };
    tracing::info!(url = %url, "{}", verb);
    println!("{} {}", verb, url);
    Ok(())
}

/// `curate clear --yes`.
pub async fn run_clear(config: &Config, confirmed: bool) -> Result<()> {
    if !confirmed {
        bail!("Refusing to clear all content without --yes");
    }
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);
    let removed = store.clear().await;
    store.close().await;

    let removed = removed?;
    tracing::warn!(removed, "content store cleared");
    println!("cleared {} item(s)", removed);
    Ok(())
}
