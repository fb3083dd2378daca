//! `SqliteStore` against a real database file in a temp directory.

use chrono::NaiveDate;
use tempfile::TempDir;

use curator_core::error::RetrievalError;
use curator_core::models::{ContentItem, Topic};
use curator_core::retrieval::{fetch, fetch_many};
use curator_core::store::{ContentStore, TopicQuery};
use topic_curator::config::Config;
use topic_curator::retrieval::fetch_or_empty;
use topic_curator::sqlite_store::SqliteStore;
use topic_curator::{db, migrate};

fn test_config(tmp: &TempDir) -> Config {
    Config::with_db_path(tmp.path().join("data").join("curate.sqlite"))
}

async fn open_store(tmp: &TempDir) -> SqliteStore {
    let cfg = test_config(tmp);
    migrate::run_migrations(&cfg).await.unwrap();
    SqliteStore::new(db::connect(&cfg).await.unwrap())
}

fn item(url: &str, topic: Topic, score: f64, date: (i32, u32, u32)) -> ContentItem {
    ContentItem {
        id: format!("id-{url}"),
        topic,
        url: url.to_string(),
        title: format!("Title for {url}"),
        summary: "Summary text long enough to be stored as-is in the table.".to_string(),
        source_domain: "example.org".to_string(),
        publication_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        quality_score: score,
        refresh_cycle: 1,
        is_active: true,
        tags: vec!["health & safety".to_string(), "childproofing".to_string()],
        age_range: "all".to_string(),
    }
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    migrate::run_migrations(&cfg).await.unwrap();
    migrate::run_migrations(&cfg).await.unwrap();
    assert!(cfg.db.path.exists());
}

#[tokio::test]
async fn rows_round_trip() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;

    let original = item("https://cdc.gov/home", Topic::HealthSafety, 0.85, (2026, 2, 28));
    assert_eq!(store.insert_batch(&[original.clone()]).await.unwrap(), 1);

    let got = store
        .select_ranked(&TopicQuery {
            topic: Topic::HealthSafety,
            min_quality: 0.0,
            limit: 10,
        })
        .await
        .unwrap();
    assert_eq!(got, vec![original]);
}

#[tokio::test]
async fn batch_is_all_or_nothing() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;

    store
        .insert_batch(&[item("https://a.org/1", Topic::SleepPatterns, 0.65, (2026, 1, 1))])
        .await
        .unwrap();

    let err = store
        .insert_batch(&[
            item("https://a.org/2", Topic::SleepPatterns, 0.65, (2026, 1, 2)),
            item("https://a.org/1", Topic::SleepPatterns, 0.85, (2026, 1, 3)),
        ])
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("UNIQUE"));

    assert_eq!(store.count_url("https://a.org/1").await.unwrap(), 1);
    assert_eq!(store.count_url("https://a.org/2").await.unwrap(), 0);
    assert_eq!(store.all_urls().await.unwrap().len(), 1);
}

#[tokio::test]
async fn health_safety_top_shelf_returns_exactly_twelve() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;

    let items: Vec<ContentItem> = (0..20u32)
        .map(|i| {
            let score = match i {
                0..=5 => 0.85,
                6..=14 => 0.65,
                _ => 0.3,
            };
            item(
                &format!("https://hs.org/{i:02}"),
                Topic::HealthSafety,
                score,
                (2026, 1, 1 + i),
            )
        })
        .collect();
    store.insert_batch(&items).await.unwrap();

    let got = fetch(
        &store,
        &TopicQuery {
            topic: Topic::HealthSafety,
            min_quality: 0.4,
            limit: 12,
        },
    )
    .await
    .unwrap();

    assert_eq!(got.len(), 12);
    assert!(got.iter().all(|i| i.quality_score >= 0.4));
    for pair in got.windows(2) {
        assert!(pair[0].quality_score >= pair[1].quality_score);
        if pair[0].quality_score == pair[1].quality_score {
            assert!(pair[0].publication_date >= pair[1].publication_date);
        }
    }
    // Six trusted items newest first, then the newest baseline items.
    assert_eq!(got[0].url, "https://hs.org/05");
    assert_eq!(got[5].url, "https://hs.org/00");
    assert_eq!(got[6].url, "https://hs.org/14");
    assert_eq!(got[11].url, "https://hs.org/09");
}

#[tokio::test]
async fn deactivated_items_are_hidden_but_still_block_reinsertion() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;
    store
        .insert_batch(&[
            item("https://s.org/1", Topic::SleepPatterns, 0.85, (2026, 1, 1)),
            item("https://s.org/2", Topic::SleepPatterns, 0.65, (2026, 1, 1)),
        ])
        .await
        .unwrap();

    assert!(store.set_active("https://s.org/1", false).await.unwrap());
    assert!(!store.set_active("https://missing.org", false).await.unwrap());

    let got = fetch_many(&store, &[Topic::SleepPatterns], 0.4, 12)
        .await
        .unwrap();
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].url, "https://s.org/2");
    assert!(store.all_urls().await.unwrap().contains("https://s.org/1"));

    store.set_active("https://s.org/1", true).await.unwrap();
    let got = fetch_many(&store, &[Topic::SleepPatterns], 0.4, 12)
        .await
        .unwrap();
    assert_eq!(got.len(), 2);
}

#[tokio::test]
async fn stats_and_clear() {
    let tmp = TempDir::new().unwrap();
    let store = open_store(&tmp).await;
    store
        .insert_batch(&[
            item("https://f.org/1", Topic::FeedingNutrition, 0.85, (2026, 1, 5)),
            item("https://f.org/2", Topic::FeedingNutrition, 0.65, (2026, 2, 7)),
            item("https://h.org/1", Topic::HealthSafety, 0.65, (2026, 1, 1)),
        ])
        .await
        .unwrap();
    store.set_active("https://f.org/2", false).await.unwrap();

    let stats = store.topic_stats().await.unwrap();
    assert_eq!(stats.len(), 2);
    let feeding = &stats[0];
    assert_eq!(feeding.topic, Topic::FeedingNutrition);
    assert_eq!(feeding.total, 2);
    assert_eq!(feeding.active, 1);
    assert!((feeding.avg_quality.unwrap() - 0.85).abs() < 1e-9);
    assert_eq!(feeding.latest_publication, NaiveDate::from_ymd_opt(2026, 2, 7));

    assert_eq!(store.clear().await.unwrap(), 3);
    assert!(store.topic_stats().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_schema_surfaces_as_unavailable() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    // Connect without running migrations.
    let store = SqliteStore::new(db::connect(&cfg).await.unwrap());

    let err = fetch(
        &store,
        &TopicQuery {
            topic: Topic::SleepPatterns,
            min_quality: 0.4,
            limit: 12,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, RetrievalError::Unavailable(_)));
    assert_eq!(err.to_string(), "content store unavailable");
    assert_eq!(err.code(), "retrieval_unavailable");

    let items = fetch_or_empty(&store, &[Topic::SleepPatterns], 0.4, 12).await;
    assert!(items.is_empty());
}
