//! Two-tier trust scoring.
//!
//! A draft from a trusted domain of its topic scores `trusted_score`;
//! everything else scores `baseline_score`. Ties inside a tier are expected
//! and are broken by recency at retrieval time.

use url::Url;

use crate::models::{ContentDraft, ContentItem};
use crate::normalize::{host_matches, source_domain};

/// Score assigned to each tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrustPolicy {
    pub trusted_score: f64,
    pub baseline_score: f64,
}

impl Default for TrustPolicy {
    fn default() -> Self {
        Self {
            trusted_score: 0.85,
            baseline_score: 0.65,
        }
    }
}

/// Authoritative sources configured for one topic.
///
/// A plain entry (`aap.org`) matches that domain and its subdomains. An
/// entry with a path (`nih.gov/health`) matches that path and anything below
/// it, but not `nih.gov/healthy-snacks`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedDomains {
    domains: Vec<String>,
    prefixes: Vec<String>,
}

impl TrustedDomains {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut trusted = Self::default();
        for entry in entries {
            let entry = entry.as_ref().trim();
            let entry = entry
                .strip_prefix("https://")
                .or_else(|| entry.strip_prefix("http://"))
                .unwrap_or(entry)
                .trim_end_matches('/');
            if entry.is_empty() {
                continue;
            }
            match entry.split_once('/') {
                Some((host, path)) => trusted
                    .prefixes
                    .push(format!("{}/{}", source_domain(host), path)),
                None => trusted.domains.push(source_domain(entry)),
            }
        }
        trusted
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty() && self.prefixes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.domains.len() + self.prefixes.len()
    }

    /// Whether the draft comes from one of these sources.
    pub fn matches(&self, draft: &ContentDraft) -> bool {
        if self
            .domains
            .iter()
            .any(|d| host_matches(&draft.source_domain, d))
        {
            return true;
        }
        if self.prefixes.is_empty() {
            return false;
        }
        let Ok(url) = Url::parse(&draft.url) else {
            return false;
        };
        let location = format!("{}{}", draft.source_domain, url.path());
        self.prefixes.iter().any(|p| under_prefix(&location, p))
    }
}

fn under_prefix(location: &str, prefix: &str) -> bool {
    match location.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Quality score of a draft under the given policy.
pub fn score(draft: &ContentDraft, trusted: &TrustedDomains, policy: &TrustPolicy) -> f64 {
    if trusted.matches(draft) {
        policy.trusted_score
    } else {
        policy.baseline_score
    }
}

/// Score every draft and promote it to a storable [`ContentItem`].
pub fn score_all(
    drafts: Vec<ContentDraft>,
    trusted: &TrustedDomains,
    policy: &TrustPolicy,
) -> Vec<ContentItem> {
    drafts
        .into_iter()
        .map(|d| {
            let s = score(&d, trusted, policy);
            ContentItem::from_draft(d, s)
        })
        .collect()
}
