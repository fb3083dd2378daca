//! End-to-end ingestion tests against the in-memory store with a scripted
//! search provider.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::NaiveDate;

use curator_core::error::{SearchFailure, SearchFailureCause};
use curator_core::models::{ContentItem, RawHit, Topic, TopicStats};
use curator_core::normalize::FilterRules;
use curator_core::provider::{SearchOptions, SearchProvider};
use curator_core::scoring::{TrustPolicy, TrustedDomains};
use curator_core::store::memory::InMemoryStore;
use curator_core::store::{ContentStore, TopicQuery};
use topic_curator::ingest::{IngestError, IngestJob, JobSettings, TopicPlan};

// ─── Test doubles ───────────────────────────────────────────────────

/// Provider answering from a fixed script and recording every call.
#[derive(Default)]
struct ScriptedProvider {
    responses: HashMap<String, Result<Vec<RawHit>, SearchFailureCause>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn with(mut self, query: &str, hits: Vec<RawHit>) -> Self {
        self.responses.insert(query.to_string(), Ok(hits));
        self
    }

    fn failing(mut self, query: &str, cause: SearchFailureCause) -> Self {
        self.responses.insert(query.to_string(), Err(cause));
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn search(
        &self,
        query: &str,
        _options: &SearchOptions,
    ) -> Result<Vec<RawHit>, SearchFailure> {
        self.calls.lock().unwrap().push(query.to_string());
        match self.responses.get(query) {
            Some(Ok(hits)) => Ok(hits.clone()),
            Some(Err(cause)) => Err(SearchFailure::new(query, cause.clone())),
            None => Ok(Vec::new()),
        }
    }
}

/// Store whose batch writes fail for one topic.
struct FlakyStore {
    inner: InMemoryStore,
    broken: Topic,
}

#[async_trait]
impl ContentStore for FlakyStore {
    async fn all_urls(&self) -> Result<HashSet<String>> {
        self.inner.all_urls().await
    }

    async fn insert_batch(&self, items: &[ContentItem]) -> Result<u64> {
        if items.iter().any(|i| i.topic == self.broken) {
            bail!("disk I/O error");
        }
        self.inner.insert_batch(items).await
    }

    async fn select_ranked(&self, query: &TopicQuery) -> Result<Vec<ContentItem>> {
        self.inner.select_ranked(query).await
    }

    async fn set_active(&self, url: &str, active: bool) -> Result<bool> {
        self.inner.set_active(url, active).await
    }

    async fn count_url(&self, url: &str) -> Result<u64> {
        self.inner.count_url(url).await
    }

    async fn topic_stats(&self) -> Result<Vec<TopicStats>> {
        self.inner.topic_stats().await
    }

    async fn clear(&self) -> Result<u64> {
        self.inner.clear().await
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

const LONG: &str =
    "A practical guide for parents covering routines, safety, and what to expect at each stage.";

fn hit(url: &str) -> RawHit {
    RawHit {
        url: Some(url.to_string()),
        title: Some(format!("Article at {url}")),
        description: Some(LONG.to_string()),
        result_source: Some("web".to_string()),
    }
}

fn short_hit(url: &str) -> RawHit {
    RawHit {
        description: Some("Too short.".to_string()),
        ..hit(url)
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
}

fn settings(per_query_cap: usize) -> JobSettings {
    JobSettings {
        search: SearchOptions::default(),
        rules: FilterRules {
            per_query_cap,
            ..FilterRules::default()
        },
        policy: TrustPolicy::default(),
        concurrency: 1,
        today: today(),
        dry_run: false,
    }
}

fn plan(topic: Topic, queries: &[&str], trusted: &[&str]) -> TopicPlan {
    TopicPlan {
        topic,
        queries: queries.iter().map(|q| q.to_string()).collect(),
        trusted: TrustedDomains::new(trusted),
    }
}

fn stored_item(url: &str, topic: Topic) -> ContentItem {
    ContentItem {
        id: "seed".to_string(),
        topic,
        url: url.to_string(),
        title: "Safe sleep".to_string(),
        summary: LONG.to_string(),
        source_domain: "aap.org".to_string(),
        publication_date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
        quality_score: 0.85,
        refresh_cycle: 1,
        is_active: true,
        tags: vec!["sleep".to_string()],
        age_range: "all".to_string(),
    }
}

fn urls(store: &InMemoryStore) -> Vec<String> {
    store
        .items()
        .unwrap()
        .into_iter()
        .map(|i| i.url)
        .collect()
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn failed_query_is_skipped_and_others_are_kept() {
    let provider = ScriptedProvider::default()
        .with("q1", vec![hit("https://one.org/a")])
        .with("q2", vec![hit("https://two.org/a")])
        .failing("q3", SearchFailureCause::Status(500))
        .with("q4", vec![hit("https://four.org/a")])
        .with("q5", vec![hit("https://five.org/a")]);
    let store = InMemoryStore::new();

    let mut job = IngestJob::start(&store, &provider, settings(5)).await.unwrap();
    let report = job
        .populate_topic(&plan(
            Topic::FeedingNutrition,
            &["q1", "q2", "q3", "q4", "q5"],
            &[],
        ))
        .await
        .unwrap();

    assert_eq!(report.queries_run, 5);
    assert_eq!(report.failed_queries.len(), 1);
    assert_eq!(report.failed_queries[0].query, "q3");
    assert_eq!(report.inserted_count, 4);
    assert_eq!(
        urls(&store),
        vec![
            "https://one.org/a",
            "https://two.org/a",
            "https://four.org/a",
            "https://five.org/a"
        ]
    );
    assert_eq!(provider.calls(), vec!["q1", "q2", "q3", "q4", "q5"]);
}

#[tokio::test]
async fn sleep_patterns_two_queries_with_rejects_and_overlap() {
    let q1 = "infant sleep training";
    let q2 = "baby nap schedule";

    let mut first: Vec<RawHit> = (0..6)
        .map(|i| hit(&format!("https://sleep{i}.org/guide")))
        .collect();
    first.push(short_hit("https://short1.org/a"));
    first.push(short_hit("https://short2.org/a"));

    let mut second: Vec<RawHit> = (0..4)
        .map(|i| hit(&format!("https://naps{i}.org/guide")))
        .collect();
    second.push(short_hit("https://short3.org/a"));
    // Also returned by the first query.
    second.push(hit("https://sleep0.org/guide"));

    assert_eq!(first.len(), 8);
    assert_eq!(second.len(), 6);

    let provider = ScriptedProvider::default()
        .with(q1, first)
        .with(q2, second);
    let store = InMemoryStore::new();

    let mut job = IngestJob::start(&store, &provider, settings(10)).await.unwrap();
    let report = job
        .populate_topic(&plan(Topic::SleepPatterns, &[q1, q2], &[]))
        .await
        .unwrap();

    // (8 - 2) + (6 - 1) - 1
    assert_eq!(report.inserted_count, 10);
    assert_eq!(report.rejected.short_description, 3);
    assert_eq!(report.already_taken, 1);
    assert_eq!(report.hits, 14);

    let items = store.items().unwrap();
    let unique: HashSet<&str> = items.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(unique.len(), items.len());

    let overlap = items
        .iter()
        .find(|i| i.url == "https://sleep0.org/guide")
        .unwrap();
    assert_eq!(overlap.tags, vec!["sleep".to_string(), "infant".to_string()]);
    assert!(items.iter().all(|i| i.publication_date == today()));
}

#[tokio::test]
async fn stored_url_is_never_reinserted() {
    let store = InMemoryStore::with_items(vec![stored_item(
        "https://aap.org/sleep-guide",
        Topic::SleepPatterns,
    )])
    .unwrap();
    let provider = ScriptedProvider::default().with(
        "infant sleep training",
        vec![
            hit("https://aap.org/sleep-guide"),
            hit("https://healthychildren.org/naps"),
        ],
    );

    let mut job = IngestJob::start(&store, &provider, settings(5)).await.unwrap();
    let report = job
        .populate_topic(&plan(
            Topic::SleepPatterns,
            &["infant sleep training"],
            &["aap.org"],
        ))
        .await
        .unwrap();

    assert_eq!(report.inserted_count, 1);
    assert_eq!(report.already_taken, 1);
    assert_eq!(
        store.count_url("https://aap.org/sleep-guide").await.unwrap(),
        1
    );
}

#[tokio::test]
async fn second_identical_run_inserts_nothing() {
    let provider = ScriptedProvider::default().with(
        "childproofing checklist",
        vec![hit("https://safekids.org/home"), hit("https://cdc.gov/safety")],
    );
    let store = InMemoryStore::new();
    let topic_plan = plan(Topic::HealthSafety, &["childproofing checklist"], &["cdc.gov"]);

    let mut first = IngestJob::start(&store, &provider, settings(5)).await.unwrap();
    assert_eq!(first.populate_topic(&topic_plan).await.unwrap().inserted_count, 2);

    let mut second = IngestJob::start(&store, &provider, settings(5)).await.unwrap();
    let report = second.populate_topic(&topic_plan).await.unwrap();
    assert_eq!(report.inserted_count, 0);
    assert_eq!(report.already_taken, 2);
    assert_eq!(store.items().unwrap().len(), 2);
}

#[tokio::test]
async fn trusted_sources_score_higher() {
    let provider = ScriptedProvider::default().with(
        "car seat safety guidelines",
        vec![
            hit("https://www.nhtsa.gov/car-seats"),
            hit("https://randomblog.net/car-seats"),
        ],
    );
    let store = InMemoryStore::new();

    let mut job = IngestJob::start(&store, &provider, settings(5)).await.unwrap();
    job.populate_topic(&plan(
        Topic::HealthSafety,
        &["car seat safety guidelines"],
        &["nhtsa.gov"],
    ))
    .await
    .unwrap();

    let items = store.items().unwrap();
    let score_of = |url: &str| items.iter().find(|i| i.url == url).unwrap().quality_score;
    assert!((score_of("https://www.nhtsa.gov/car-seats") - 0.85).abs() < 1e-9);
    assert!((score_of("https://randomblog.net/car-seats") - 0.65).abs() < 1e-9);
    assert!(items.iter().all(|i| i.is_active && i.refresh_cycle == 1));
}

#[tokio::test]
async fn topics_share_seen_urls_and_fail_independently() {
    let provider = ScriptedProvider::default()
        .with("solids", vec![hit("https://shared.org/a"), hit("https://food.org/a")])
        .with("tantrums", vec![hit("https://feelings.org/a")])
        .with("milestones", vec![hit("https://shared.org/a"), hit("https://motor.org/a")]);
    let store = FlakyStore {
        inner: InMemoryStore::new(),
        broken: Topic::SocialEmotional,
    };

    let plans = vec![
        plan(Topic::FeedingNutrition, &["solids"], &[]),
        plan(Topic::SocialEmotional, &["tantrums"], &[]),
        plan(Topic::PhysicalDevelopment, &["milestones"], &[]),
    ];
    let mut job = IngestJob::start(&store, &provider, settings(5)).await.unwrap();
    let outcomes = job.run(&plans).await;

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].1.as_ref().unwrap().inserted_count, 2);
    assert!(matches!(
        outcomes[1].1,
        Err(IngestError::Store {
            topic: Topic::SocialEmotional,
            ..
        })
    ));
    let physical = outcomes[2].1.as_ref().unwrap();
    assert_eq!(physical.inserted_count, 1);
    assert_eq!(physical.already_taken, 1);

    assert_eq!(store.count_url("https://shared.org/a").await.unwrap(), 1);
    assert_eq!(store.count_url("https://feelings.org/a").await.unwrap(), 0);
}

#[tokio::test]
async fn dry_run_counts_without_writing() {
    let provider = ScriptedProvider::default().with(
        "toddler language milestones",
        vec![hit("https://zerotothree.org/talk"), hit("https://youtube.com/watch")],
    );
    let store = InMemoryStore::new();
    let mut dry = settings(5);
    dry.dry_run = true;

    let mut job = IngestJob::start(&store, &provider, dry).await.unwrap();
    let report = job
        .populate_topic(&plan(
            Topic::CognitiveDevelopment,
            &["toddler language milestones"],
            &[],
        ))
        .await
        .unwrap();

    assert_eq!(report.candidates, 1);
    assert_eq!(report.rejected.blocked_domain, 1);
    assert_eq!(report.inserted_count, 0);
    assert!(store.items().unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_queries_keep_query_order() {
    let provider = ScriptedProvider::default()
        .with("a", vec![hit("https://x.org/1"), hit("https://x.org/2")])
        .with("b", vec![hit("https://x.org/2"), hit("https://x.org/3")])
        .with("c", vec![hit("https://x.org/4")]);
    let store = InMemoryStore::new();
    let mut concurrent = settings(5);
    concurrent.concurrency = 3;

    let mut job = IngestJob::start(&store, &provider, concurrent).await.unwrap();
    let report = job
        .populate_topic(&plan(Topic::SleepPatterns, &["a", "b", "c"], &[]))
        .await
        .unwrap();

    assert_eq!(report.inserted_count, 4);
    assert_eq!(report.already_taken, 1);
    assert_eq!(
        urls(&store),
        vec![
            "https://x.org/1",
            "https://x.org/2",
            "https://x.org/3",
            "https://x.org/4"
        ]
    );
    assert!(job.seen().contains("https://x.org/4"));
}
