//! TOML configuration parsing and validation.
//!
//! The configuration file (default `./config/curate.toml`) describes the
//! database location, the search provider, rate limiting, ingestion
//! thresholds, retrieval defaults, the HTTP bind address, and the queries and
//! trusted sources of every topic.
//!
//! ```toml
//! [db]
//! path = "./data/curate.sqlite"
//!
//! [search]
//! endpoint = "https://search.example.com/v1/search"
//!
//! [topics.sleep_patterns]
//! queries = ["infant sleep training", "baby nap schedule"]
//! trusted_domains = ["aap.org", "healthychildren.org"]
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use curator_core::models::Topic;
use curator_core::normalize::{
    FilterRules, DEFAULT_BLOCKED_DOMAINS, DEFAULT_EXCLUDED_RESULT_SOURCES,
};
use curator_core::provider::SearchOptions;
use curator_core::retrieval::{DEFAULT_LIMIT, DEFAULT_MIN_QUALITY};
use curator_core::scoring::{TrustPolicy, TrustedDomains};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default, deserialize_with = "deserialize_topics")]
    pub topics: BTreeMap<Topic, TopicConfig>,
}

/// Topic tables are keyed by identifier; unknown identifiers are an error.
fn deserialize_topics<'de, D>(deserializer: D) -> Result<BTreeMap<Topic, TopicConfig>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = BTreeMap::<String, TopicConfig>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, cfg)| {
            key.parse::<Topic>()
                .map(|topic| (topic, cfg))
                .map_err(serde::de::Error::custom)
        })
        .collect()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Provider endpoint. Required for `populate` unless `--dry-run`.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_engine")]
    pub engine: String,
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key_env: default_api_key_env(),
            engine: default_engine(),
            result_limit: default_result_limit(),
            country: default_country(),
            language: default_language(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "SEARCH_API_KEY".to_string()
}
fn default_engine() -> String {
    "web".to_string()
}
fn default_result_limit() -> usize {
    8
}
fn default_country() -> String {
    "us".to_string()
}
fn default_language() -> String {
    "en".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl SearchConfig {
    pub fn options(&self) -> SearchOptions {
        SearchOptions {
            result_limit: self.result_limit,
            region: self.country.clone(),
            language: self.language.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    /// Minimum spacing between provider calls; `0` disables limiting.
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
    #[serde(default = "default_burst")]
    pub burst: u32,
    /// Queries of one topic in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
            burst: default_burst(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_min_interval_ms() -> u64 {
    1500
}
fn default_burst() -> u32 {
    1
}
fn default_concurrency() -> usize {
    1
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    #[serde(default = "default_per_query_cap")]
    pub per_query_cap: usize,
    #[serde(default = "default_min_description_chars")]
    pub min_description_chars: usize,
    #[serde(default = "default_trusted_score")]
    pub trusted_score: f64,
    #[serde(default = "default_baseline_score")]
    pub baseline_score: f64,
    #[serde(default = "default_blocked_domains")]
    pub blocked_domains: Vec<String>,
    #[serde(default = "default_excluded_result_sources")]
    pub excluded_result_sources: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            per_query_cap: default_per_query_cap(),
            min_description_chars: default_min_description_chars(),
            trusted_score: default_trusted_score(),
            baseline_score: default_baseline_score(),
            blocked_domains: default_blocked_domains(),
            excluded_result_sources: default_excluded_result_sources(),
        }
    }
}

fn default_per_query_cap() -> usize {
    5
}
fn default_min_description_chars() -> usize {
    50
}
fn default_trusted_score() -> f64 {
    0.85
}
fn default_baseline_score() -> f64 {
    0.65
}
fn default_blocked_domains() -> Vec<String> {
    DEFAULT_BLOCKED_DOMAINS.iter().map(|d| d.to_string()).collect()
}
fn default_excluded_result_sources() -> Vec<String> {
    DEFAULT_EXCLUDED_RESULT_SOURCES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl IngestConfig {
    pub fn filter_rules(&self) -> FilterRules {
        FilterRules {
            min_description_chars: self.min_description_chars,
            per_query_cap: self.per_query_cap,
            blocked_domains: self.blocked_domains.clone(),
            excluded_result_sources: self.excluded_result_sources.clone(),
        }
    }

    pub fn trust_policy(&self) -> TrustPolicy {
        TrustPolicy {
            trusted_score: self.trusted_score,
            baseline_score: self.baseline_score,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_min_quality")]
    pub min_quality: f64,
    #[serde(default = "default_final_limit")]
    pub final_limit: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            min_quality: default_min_quality(),
            final_limit: default_final_limit(),
        }
    }
}

fn default_min_quality() -> f64 {
    DEFAULT_MIN_QUALITY
}
fn default_final_limit() -> usize {
    DEFAULT_LIMIT
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}

/// Queries and trusted sources of one topic.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TopicConfig {
    #[serde(default)]
    pub queries: Vec<String>,
    #[serde(default)]
    pub trusted_domains: Vec<String>,
}

impl TopicConfig {
    pub fn trusted(&self) -> TrustedDomains {
        TrustedDomains::new(&self.trusted_domains)
    }
}

impl Config {
    /// Configuration with defaults everywhere and the given database path.
    pub fn with_db_path(path: impl Into<PathBuf>) -> Self {
        Self {
            db: DbConfig { path: path.into() },
            search: SearchConfig::default(),
            rate_limit: RateLimitConfig::default(),
            ingest: IngestConfig::default(),
            retrieval: RetrievalConfig::default(),
            server: ServerConfig::default(),
            topics: BTreeMap::new(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Check cross-field constraints that serde cannot express.
pub fn validate(config: &Config) -> Result<()> {
    // Validate search
    if config.search.result_limit == 0 {
        anyhow::bail!("search.result_limit must be >= 1");
    }
    if config.search.timeout_secs == 0 {
        anyhow::bail!("search.timeout_secs must be >= 1");
    }
    if let Some(endpoint) = &config.search.endpoint {
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            anyhow::bail!("search.endpoint must be an http(s) URL, got '{}'", endpoint);
        }
    }

    // Validate rate limiting
    if config.rate_limit.burst == 0 {
        anyhow::bail!("rate_limit.burst must be >= 1");
    }
    if config.rate_limit.concurrency == 0 {
        anyhow::bail!("rate_limit.concurrency must be >= 1");
    }

    // Validate ingestion
    if config.ingest.per_query_cap == 0 {
        anyhow::bail!("ingest.per_query_cap must be >= 1");
    }
    for (name, value) in [
        ("ingest.trusted_score", config.ingest.trusted_score),
        ("ingest.baseline_score", config.ingest.baseline_score),
    ] {
        if !(0.0..=1.0).contains(&value) {
            anyhow::bail!("{} must be in [0.0, 1.0]", name);
        }
    }
    if config.ingest.trusted_score < config.ingest.baseline_score {
        anyhow::bail!("ingest.trusted_score must be >= ingest.baseline_score");
    }

    // Validate retrieval
    if !(0.0..=1.0).contains(&config.retrieval.min_quality) {
        anyhow::bail!("retrieval.min_quality must be in [0.0, 1.0]");
    }
    if config.retrieval.final_limit < 1 {
        anyhow::bail!("retrieval.final_limit must be >= 1");
    }

    // Validate topics
    for (topic, topic_cfg) in &config.topics {
        if topic_cfg.queries.iter().any(|q| q.trim().is_empty()) {
            anyhow::bail!("topics.{}.queries must not contain empty queries", topic);
        }
    }

    Ok(())
}
