//! Per-topic summary of the content store, printed by `curate stats`.

use anyhow::Result;

use curator_core::store::ContentStore;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

/// Run the stats command: query the database and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);
    let stats = store.topic_stats().await;
    store.close().await;
    let stats = stats?;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);
    let total: i64 = stats.iter().map(|s| s.total).sum();
    let active: i64 = stats.iter().map(|s| s.active).sum();

    println!("Topic Curator content stats");
    println!("=============================");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!();
    println!("  Items:       {}", total);
    println!("  Active:      {}", active);

    if !stats.is_empty() {
        println!();
        println!("  By topic:");
        println!(
            "  {:<22} {:>6} {:>7} {:>8}   {}",
            "TOPIC", "TOTAL", "ACTIVE", "AVG Q", "LATEST"
        );
        println!("  {}", "-".repeat(60));

        for s in &stats {
            let avg = s
                .avg_quality
                .map(|q| format!("{:.2}", q))
                .unwrap_or_else(|| "-".to_string());
            let latest = s
                .latest_publication
                .map(|d| d.to_string())
                .unwrap_or_else(|| "never".to_string());
            println!(
                "  {:<22} {:>6} {:>7} {:>8}   {}",
                s.topic.as_str(),
                s.total,
                s.active,
                avg,
                latest
            );
        }
    }

    println!();
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
