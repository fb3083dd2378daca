//! Ingestion job orchestration.
//!
//! For each topic: search every configured query, filter and normalize the
//! hits, deduplicate against everything already stored or already seen in
//! this job, score the survivors, and write them in one all-or-nothing batch.
//!
//! ```text
//! queries ──▶ provider ──▶ normalize ──▶ dedupe ──▶ score ──▶ insert_batch
//!            (limited)     (per query)   (SeenUrls)             (per topic)
//! ```
//!
//! A failed query is logged and skipped. A failed store write fails only its
//! topic. Topics run one after another and share one [`SeenUrls`].

use anyhow::{bail, Result};
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};

use curator_core::dedup::{dedupe, DraftSet, SeenUrls};
use curator_core::error::{BoxError, SearchFailure};
use curator_core::models::Topic;
use curator_core::normalize::{normalize, FilterRules, RejectionCounts};
use curator_core::provider::{SearchOptions, SearchProvider};
use curator_core::scoring::{score_all, TrustPolicy, TrustedDomains};
use curator_core::store::ContentStore;

use crate::config::Config;
use crate::db;
use crate::limiter::RateLimitedProvider;
use crate::search_client;
use crate::sqlite_store::SqliteStore;

/// Failures that stop a job or a topic.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to load stored URLs")]
    LoadSeen(#[source] BoxError),
    #[error("store write failed for topic {topic}")]
    Store {
        topic: Topic,
        #[source]
        source: BoxError,
    },
}

/// Queries and trusted sources for one topic run.
#[derive(Debug, Clone)]
pub struct TopicPlan {
    pub topic: Topic,
    pub queries: Vec<String>,
    pub trusted: TrustedDomains,
}

impl TopicPlan {
    /// Plan from the topic's configuration, with optional CLI overrides
    /// replacing the configured queries or trusted domains.
    pub fn from_config(
        config: &Config,
        topic: Topic,
        queries: &[String],
        trusted: &[String],
    ) -> Self {
        let topic_cfg = config.topics.get(&topic).cloned().unwrap_or_default();
        let configured_trusted = topic_cfg.trusted();
        let queries = if queries.is_empty() {
            topic_cfg.queries
        } else {
            queries.to_vec()
        };
        let trusted = if trusted.is_empty() {
            configured_trusted
        } else {
            TrustedDomains::new(trusted)
        };
        Self {
            topic,
            queries,
            trusted,
        }
    }
}

/// Knobs shared by every topic of a job.
#[derive(Debug, Clone)]
pub struct JobSettings {
    pub search: SearchOptions,
    pub rules: FilterRules,
    pub policy: TrustPolicy,
    /// Queries of one topic in flight at once.
    pub concurrency: usize,
    /// Stamped as the publication date of new items.
    pub today: NaiveDate,
    pub dry_run: bool,
}

impl JobSettings {
    pub fn from_config(config: &Config, today: NaiveDate, dry_run: bool) -> Self {
        Self {
            search: config.search.options(),
            rules: config.ingest.filter_rules(),
            policy: config.ingest.trust_policy(),
            concurrency: config.rate_limit.concurrency,
            today,
            dry_run,
        }
    }
}

/// Outcome of one topic.
#[derive(Debug)]
pub struct TopicReport {
    pub topic: Topic,
    pub queries_run: usize,
    pub failed_queries: Vec<SearchFailure>,
    pub hits: usize,
    pub rejected: RejectionCounts,
    pub over_cap: usize,
    /// Drafts dropped because the URL was stored or already claimed.
    pub already_taken: usize,
    /// Drafts replaced by a later hit for the same URL.
    pub overwritten: usize,
    /// Items scored and ready to write.
    pub candidates: usize,
    pub inserted_count: u64,
}

impl TopicReport {
    fn new(topic: Topic) -> Self {
        Self {
            topic,
            queries_run: 0,
            failed_queries: Vec::new(),
            hits: 0,
            rejected: RejectionCounts::default(),
            over_cap: 0,
            already_taken: 0,
            overwritten: 0,
            candidates: 0,
            inserted_count: 0,
        }
    }
}

/// One ingestion run. Owns the set of URLs considered taken.
pub struct IngestJob<'a, S: ContentStore + ?Sized, P: SearchProvider + ?Sized> {
    store: &'a S,
    provider: &'a P,
    settings: JobSettings,
    seen: SeenUrls,
}

impl<'a, S: ContentStore + ?Sized, P: SearchProvider + ?Sized> IngestJob<'a, S, P> {
    /// Load every stored URL and prepare the job.
    pub async fn start(
        store: &'a S,
        provider: &'a P,
        settings: JobSettings,
    ) -> Result<Self, IngestError> {
        let stored = store
            .all_urls()
            .await
            .map_err(|e| IngestError::LoadSeen(e.into()))?;
        tracing::debug!(stored = stored.len(), "loaded stored urls");

        Ok(Self {
            store,
            provider,
            settings,
            seen: SeenUrls::from_stored(stored),
        })
    }

    /// URLs currently considered taken.
    pub fn seen(&self) -> &SeenUrls {
        &self.seen
    }

    /// Run one topic to completion.
    pub async fn populate_topic(&mut self, plan: &TopicPlan) -> Result<TopicReport, IngestError> {
        let topic = plan.topic;
        let mut report = TopicReport::new(topic);
        let mut drafts = DraftSet::new();

        let provider = self.provider;
        let options = &self.settings.search;
        let results: Vec<_> = stream::iter(plan.queries.iter())
            .map(|query| async move { (query, provider.search(query, options).await) })
            .buffered(self.settings.concurrency.max(1))
            .collect()
            .await;

        for (query, result) in results {
            report.queries_run += 1;
            let hits = match result {
                Ok(hits) => hits,
                Err(failure) => {
                    tracing::warn!(
                        topic = %topic,
                        query = %query,
                        error = %failure,
                        "search failed; skipping query"
                    );
                    report.failed_queries.push(failure);
                    continue;
                }
            };

            let outcome = normalize(
                &hits,
                topic,
                query,
                self.settings.today,
                &self.settings.rules,
            );
            report.hits += hits.len();
            report.rejected.merge(&outcome.rejected);
            report.over_cap += outcome.over_cap;

            let dd = dedupe(outcome.drafts, &mut self.seen, &mut drafts);
            report.already_taken += dd.already_taken;
            report.overwritten += dd.overwritten;

            tracing::info!(
                topic = %topic,
                query = %query,
                hits = hits.len(),
                rejected = outcome.rejected.total(),
                kept = dd.kept,
                "query processed"
            );
        }

        let items = score_all(drafts.into_drafts(), &plan.trusted, &self.settings.policy);
        report.candidates = items.len();

        if self.settings.dry_run || items.is_empty() {
            return Ok(report);
        }

        report.inserted_count = self
            .store
            .insert_batch(&items)
            .await
            .map_err(|e| IngestError::Store {
                topic,
                source: e.into(),
            })?;

        tracing::info!(topic = %topic, inserted = report.inserted_count, "topic stored");
        Ok(report)
    }

    /// Run several topics in order. A failing topic does not stop the rest.
    pub async fn run(
        &mut self,
        plans: &[TopicPlan],
    ) -> Vec<(Topic, Result<TopicReport, IngestError>)> {
        let mut outcomes = Vec::with_capacity(plans.len());
        for plan in plans {
            let result = self.populate_topic(plan).await;
            if let Err(e) = &result {
                tracing::error!(topic = %plan.topic, error = %error_chain(e), "topic failed");
            }
            outcomes.push((plan.topic, result));
        }
        outcomes
    }
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(s) = source {
        msg.push_str(": ");
        msg.push_str(&s.to_string());
        source = s.source();
    }
    msg
}

/// Resolve the `populate` target into plans.
///
/// `all` expands to every configured topic that has queries; overrides are
/// only accepted for a single topic.
pub fn resolve_plans(
    config: &Config,
    target: &str,
    queries: &[String],
    trusted: &[String],
) -> Result<Vec<TopicPlan>> {
    if target == "all" {
        if !queries.is_empty() || !trusted.is_empty() {
            bail!("--query and --trusted require a single topic, not 'all'");
        }
        let plans: Vec<TopicPlan> = Topic::ALL
            .into_iter()
            .map(|t| TopicPlan::from_config(config, t, &[], &[]))
            .filter(|p| !p.queries.is_empty())
            .collect();
        if plans.is_empty() {
            bail!("No topics have queries configured. Add [topics.<topic>] sections to the config.");
        }
        return Ok(plans);
    }

    let topic: Topic = target.parse()?;
    let plan = TopicPlan::from_config(config, topic, queries, trusted);
    if plan.queries.is_empty() {
        bail!(
            "Topic '{}' has no queries. Configure [topics.{}] or pass --query.",
            topic,
            topic
        );
    }
    Ok(vec![plan])
}

/// `curate populate`: run the job against the configured store and provider.
pub async fn run_populate(
    config: &Config,
    target: &str,
    queries: &[String],
    trusted: &[String],
    dry_run: bool,
) -> Result<()> {
    let plans = resolve_plans(config, target, queries, trusted)?;

    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool);
    let provider = RateLimitedProvider::from_config(
        search_client::provider_from_config(&config.search, dry_run)?,
        &config.rate_limit,
    );

    let today = chrono::Utc::now().date_naive();
    let settings = JobSettings::from_config(config, today, dry_run);
    let mut job = IngestJob::start(&store, &provider, settings).await?;
    let outcomes = job.run(&plans).await;
    store.close().await;

    let mut failed = 0usize;
    for (topic, outcome) in &outcomes {
        match outcome {
            Ok(report) => print_report(report, dry_run),
            Err(e) => {
                failed += 1;
                println!("populate {}", topic);
                println!("  error: {}", error_chain(e));
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} topic(s) failed", failed, outcomes.len());
    }
    println!("ok");
    Ok(())
}

fn print_report(report: &TopicReport, dry_run: bool) {
    if dry_run {
        println!("populate {} (dry-run)", report.topic);
    } else {
        println!("populate {}", report.topic);
    }
    println!(
        "  queries: {} ({} failed)",
        report.queries_run,
        report.failed_queries.len()
    );
    println!("  hits: {}", report.hits);
    let r = &report.rejected;
    println!(
        "  rejected: {} (missing {}, invalid url {}, short {}, suggestion {}, blocked {})",
        r.total(),
        r.missing_field,
        r.invalid_url,
        r.short_description,
        r.provider_suggestion,
        r.blocked_domain
    );
    println!("  over cap: {}", report.over_cap);
    println!("  already stored: {}", report.already_taken);
    if dry_run {
        println!("  would insert: {}", report.candidates);
    } else {
        println!("  inserted: {}", report.inserted_count);
    }
}
