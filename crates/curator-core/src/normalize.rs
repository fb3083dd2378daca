//! Result filtering and normalization.
//!
//! Turns the raw hits of one search query into [`ContentDraft`]s. A hit
//! must pass every rule below to become a draft; rejected hits are only
//! counted, never logged individually.
//!
//! # Rules
//!
//! 1. `url` and `description` present and non-blank.
//! 2. `url` is an absolute `http`/`https` URL with a host.
//! 3. `description` longer than `min_description_chars` characters.
//! 4. The provider's own classification is not a suggestion/autocomplete.
//! 5. The host is not on (or under) the blocklist of non-article platforms.
//!
//! # Normalization
//!
//! - Title trimmed and truncated to [`MAX_TITLE_CHARS`]; a missing title
//!   falls back to the source domain.
//! - Summary is the description truncated to [`MAX_SUMMARY_CHARS`], with
//!   [`ELLIPSIS`] appended when anything was cut.
//! - `source_domain` is the lower-cased host without a leading `www.`.
//! - The URL fragment is dropped so `#section` links collapse onto one URL.
//!
//! After filtering, at most `per_query_cap` drafts are kept, in provider
//! order.

use chrono::NaiveDate;
use url::Url;

use crate::models::{ContentDraft, RawHit, Topic};

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_SUMMARY_CHARS: usize = 300;
pub const ELLIPSIS: &str = "...";

/// Video, social, and pin-board platforms that never host articles.
pub const DEFAULT_BLOCKED_DOMAINS: [&str; 9] = [
    "youtube.com",
    "youtu.be",
    "vimeo.com",
    "facebook.com",
    "instagram.com",
    "tiktok.com",
    "twitter.com",
    "x.com",
    "pinterest.com",
];

/// Provider classifications that mark meta-results rather than pages.
pub const DEFAULT_EXCLUDED_RESULT_SOURCES: [&str; 2] = ["suggestion", "autocomplete"];

/// Filtering thresholds, decoupled from application config.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterRules {
    /// Descriptions must be strictly longer than this.
    pub min_description_chars: usize,
    /// Maximum drafts kept per query after filtering.
    pub per_query_cap: usize,
    pub blocked_domains: Vec<String>,
    pub excluded_result_sources: Vec<String>,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            min_description_chars: 50,
            per_query_cap: 5,
            blocked_domains: DEFAULT_BLOCKED_DOMAINS.iter().map(|d| d.to_string()).collect(),
            excluded_result_sources: DEFAULT_EXCLUDED_RESULT_SOURCES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Why a hit was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    MissingField,
    InvalidUrl,
    ShortDescription,
    ProviderSuggestion,
    BlockedDomain,
}

/// Aggregate rejection counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RejectionCounts {
    pub missing_field: usize,
    pub invalid_url: usize,
    pub short_description: usize,
    pub provider_suggestion: usize,
    pub blocked_domain: usize,
}

impl RejectionCounts {
    pub fn record(&mut self, reason: RejectReason) {
        match reason {
            RejectReason::MissingField => self.missing_field += 1,
            RejectReason::InvalidUrl => self.invalid_url += 1,
            RejectReason::ShortDescription => self.short_description += 1,
            RejectReason::ProviderSuggestion => self.provider_suggestion += 1,
            RejectReason::BlockedDomain => self.blocked_domain += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.missing_field
            + self.invalid_url
            + self.short_description
            + self.provider_suggestion
            + self.blocked_domain
    }

    pub fn merge(&mut self, other: &RejectionCounts) {
        self.missing_field += other.missing_field;
        self.invalid_url += other.invalid_url;
        self.short_description += other.short_description;
        self.provider_suggestion += other.provider_suggestion;
        self.blocked_domain += other.blocked_domain;
    }
}

/// Drafts produced from one query's hits, plus what was dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeOutcome {
    pub drafts: Vec<ContentDraft>,
    pub rejected: RejectionCounts,
    /// Hits that passed every rule but fell beyond the per-query cap.
    pub over_cap: usize,
}

/// Filter and normalize the hits of a single query.
///
/// `today` is stamped as the publication date of every draft.
pub fn normalize(
    hits: &[RawHit],
    topic: Topic,
    query: &str,
    today: NaiveDate,
    rules: &FilterRules,
) -> NormalizeOutcome {
    let mut outcome = NormalizeOutcome::default();
    let tags = build_tags(topic, query);

    for hit in hits {
        match to_draft(hit, topic, today, &tags, rules) {
            Ok(draft) => {
                if outcome.drafts.len() < rules.per_query_cap {
                    outcome.drafts.push(draft);
                } else {
                    outcome.over_cap += 1;
                }
            }
            Err(reason) => outcome.rejected.record(reason),
        }
    }

    outcome
}

fn to_draft(
    hit: &RawHit,
    topic: Topic,
    today: NaiveDate,
    tags: &[String],
    rules: &FilterRules,
) -> Result<ContentDraft, RejectReason> {
    let raw_url = non_blank(hit.url.as_deref()).ok_or(RejectReason::MissingField)?;
    let description = non_blank(hit.description.as_deref()).ok_or(RejectReason::MissingField)?;

    let mut url = Url::parse(raw_url).map_err(|_| RejectReason::InvalidUrl)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(RejectReason::InvalidUrl);
    }
    let host = url.host_str().ok_or(RejectReason::InvalidUrl)?;
    let domain = source_domain(host);

    if description.chars().count() <= rules.min_description_chars {
        return Err(RejectReason::ShortDescription);
    }

    if let Some(kind) = hit.result_source.as_deref() {
        let kind = kind.trim();
        if rules
            .excluded_result_sources
            .iter()
            .any(|s| s.eq_ignore_ascii_case(kind))
        {
            return Err(RejectReason::ProviderSuggestion);
        }
    }

    if rules
        .blocked_domains
        .iter()
        .any(|blocked| host_matches(&domain, &source_domain(blocked)))
    {
        return Err(RejectReason::BlockedDomain);
    }

    url.set_fragment(None);

    let title = match non_blank(hit.title.as_deref()) {
        Some(t) => truncate_chars(t, MAX_TITLE_CHARS).0,
        None => domain.clone(),
    };

    let (mut summary, truncated) = truncate_chars(description, MAX_SUMMARY_CHARS);
    if truncated {
        summary.push_str(ELLIPSIS);
    }

    Ok(ContentDraft {
        topic,
        url: url.to_string(),
        title,
        summary,
        source_domain: domain,
        publication_date: today,
        tags: tags.to_vec(),
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn build_tags(topic: Topic, query: &str) -> Vec<String> {
    let mut tags = vec![topic.label().to_string()];
    if let Some(token) = query.split_whitespace().next() {
        tags.push(token.to_lowercase());
    }
    tags
}

/// Lower-case a host and strip a leading `www.`.
pub fn source_domain(host: &str) -> String {
    let host = host.trim().to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

/// True when `host` is `domain` or one of its subdomains.
pub fn host_matches(host: &str, domain: &str) -> bool {
    if domain.is_empty() {
        return false;
    }
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Truncate to at most `max` Unicode scalar values.
///
/// Returns the (trimmed) text and whether anything was cut.
pub fn truncate_chars(text: &str, max: usize) -> (String, bool) {
    let text = text.trim();
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => (text[..byte_idx].trim_end().to_string(), true),
        None => (text.to_string(), false),
    }
}
