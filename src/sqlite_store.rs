//! SQLite-backed [`ContentStore`] implementation.
//!
//! Rows live in the `content_items` table created by [`crate::migrate`].
//! Dates are stored as `YYYY-MM-DD` text so that lexical order matches
//! chronological order, and tags as a JSON array.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::collections::HashSet;

use curator_core::models::{ContentItem, Topic, TopicStats};
use curator_core::store::{ContentStore, TopicQuery};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite implementation of the [`ContentStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn item_from_row(row: &SqliteRow) -> Result<ContentItem> {
    let topic: String = row.try_get("topic")?;
    let date: String = row.try_get("publication_date")?;
    let tags_json: String = row.try_get("tags_json")?;
    let url: String = row.try_get("url")?;

    Ok(ContentItem {
        id: row.try_get("id")?,
        topic: topic.parse::<Topic>()?,
        title: row.try_get("title")?,
        summary: row.try_get("summary")?,
        source_domain: row.try_get("source_domain")?,
        publication_date: NaiveDate::parse_from_str(&date, DATE_FORMAT)
            .with_context(|| format!("bad publication_date '{}' for {}", date, url))?,
        quality_score: row.try_get("quality_score")?,
        refresh_cycle: row.try_get("refresh_cycle")?,
        is_active: row.try_get::<i64, _>("is_active")? != 0,
        tags: serde_json::from_str(&tags_json)
            .with_context(|| format!("bad tags_json for {}", url))?,
        age_range: row.try_get("age_range")?,
        url,
    })
}

#[async_trait]
impl ContentStore for SqliteStore {
    async fn all_urls(&self) -> Result<HashSet<String>> {
        let urls: Vec<String> = sqlx::query_scalar("SELECT url FROM content_items")
            .fetch_all(&self.pool)
            .await?;
        Ok(urls.into_iter().collect())
    }

    async fn insert_batch(&self, items: &[ContentItem]) -> Result<u64> {
        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        for item in items {
            let tags_json = serde_json::to_string(&item.tags)?;
            sqlx::query(
                r#"
                INSERT INTO content_items (id, topic, url, title, summary, source_domain,
                                           publication_date, quality_score, refresh_cycle,
                                           is_active, tags_json, age_range, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&item.id)
            .bind(item.topic.as_str())
            .bind(&item.url)
            .bind(&item.title)
            .bind(&item.summary)
            .bind(&item.source_domain)
            .bind(item.publication_date.format(DATE_FORMAT).to_string())
            .bind(item.quality_score)
            .bind(item.refresh_cycle)
            .bind(item.is_active as i64)
            .bind(&tags_json)
            .bind(&item.age_range)
            .bind(now)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("insert failed for {}", item.url))?;
        }

        tx.commit().await?;
        Ok(items.len() as u64)
    }

    async fn select_ranked(&self, query: &TopicQuery) -> Result<Vec<ContentItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, topic, url, title, summary, source_domain, publication_date,
                   quality_score, refresh_cycle, is_active, tags_json, age_range
            FROM content_items
            WHERE topic = ? AND is_active = 1 AND quality_score >= ?
            ORDER BY quality_score DESC, publication_date DESC, url ASC
            LIMIT ?
            "#,
        )
        .bind(query.topic.as_str())
        .bind(query.min_quality)
        .bind(query.limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(item_from_row).collect()
    }

    async fn set_active(&self, url: &str, active: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE content_items SET is_active = ? WHERE url = ?")
            .bind(active as i64)
            .bind(url)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_url(&self, url: &str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM content_items WHERE url = ?")
            .bind(url)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn topic_stats(&self) -> Result<Vec<TopicStats>> {
        let rows = sqlx::query(
            r#"
            SELECT
                topic,
                COUNT(*) AS total,
                SUM(CASE WHEN is_active = 1 THEN 1 ELSE 0 END) AS active,
                AVG(CASE WHEN is_active = 1 THEN quality_score END) AS avg_quality,
                MAX(publication_date) AS latest
            FROM content_items
            GROUP BY topic
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut stats = Vec::with_capacity(rows.len());
        for row in &rows {
            let topic: String = row.try_get("topic")?;
            let latest: Option<String> = row.try_get("latest")?;
            stats.push(TopicStats {
                topic: topic.parse::<Topic>()?,
                total: row.try_get("total")?,
                active: row.try_get("active")?,
                avg_quality: row.try_get("avg_quality")?,
                latest_publication: latest
                    .map(|d| NaiveDate::parse_from_str(&d, DATE_FORMAT))
                    .transpose()?,
            });
        }
        stats.sort_by_key(|s| s.topic);
        Ok(stats)
    }

    async fn clear(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM content_items")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
