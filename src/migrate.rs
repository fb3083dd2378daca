use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

/// Create the schema on a fresh database. Safe to run repeatedly.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply(&pool).await?;
    pool.close().await;

    tracing::info!(db = %config.db.path.display(), "schema ready");
    Ok(())
}

pub async fn apply(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS content_items (
            id TEXT PRIMARY KEY,
            topic TEXT NOT NULL,
            url TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            summary TEXT NOT NULL,
            source_domain TEXT NOT NULL,
            publication_date TEXT NOT NULL,
            quality_score REAL NOT NULL,
            refresh_cycle INTEGER NOT NULL DEFAULT 1,
            is_active INTEGER NOT NULL DEFAULT 1,
            tags_json TEXT NOT NULL DEFAULT '[]',
            age_range TEXT NOT NULL DEFAULT 'all',
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Matches the retrieval filter and ordering.
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_content_items_ranking
        ON content_items(topic, is_active, quality_score DESC, publication_date DESC)
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
