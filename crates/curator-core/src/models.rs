//! Core data models used throughout Topic Curator.
//!
//! These types represent the provider hits, drafts, and stored content items
//! that flow through the ingestion and retrieval pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Development topic that content is organized under.
///
/// The set is closed: unknown identifiers are rejected when parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    FeedingNutrition,
    SleepPatterns,
    CognitiveDevelopment,
    PhysicalDevelopment,
    SocialEmotional,
    HealthSafety,
}

impl Topic {
    /// Every topic, in display order.
    pub const ALL: [Topic; 6] = [
        Topic::FeedingNutrition,
        Topic::SleepPatterns,
        Topic::CognitiveDevelopment,
        Topic::PhysicalDevelopment,
        Topic::SocialEmotional,
        Topic::HealthSafety,
    ];

    /// Stable identifier used in config files, the database, and the HTTP API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::FeedingNutrition => "feeding_nutrition",
            Topic::SleepPatterns => "sleep_patterns",
            Topic::CognitiveDevelopment => "cognitive_development",
            Topic::PhysicalDevelopment => "physical_development",
            Topic::SocialEmotional => "social_emotional",
            Topic::HealthSafety => "health_safety",
        }
    }

    /// Short tag label stamped as the first tag of every item.
    pub fn label(&self) -> &'static str {
        match self {
            Topic::FeedingNutrition => "feeding",
            Topic::SleepPatterns => "sleep",
            Topic::CognitiveDevelopment => "cognitive",
            Topic::PhysicalDevelopment => "physical",
            Topic::SocialEmotional => "social-emotional",
            Topic::HealthSafety => "health-safety",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Topic::FeedingNutrition => "Feeding & Nutrition",
            Topic::SleepPatterns => "Sleep Patterns",
            Topic::CognitiveDevelopment => "Cognitive Development",
            Topic::PhysicalDevelopment => "Physical Development",
            Topic::SocialEmotional => "Social & Emotional",
            Topic::HealthSafety => "Health & Safety",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown topic identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown topic '{0}'")]
pub struct UnknownTopic(pub String);

impl FromStr for Topic {
    type Err = UnknownTopic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace('-', "_");
        Topic::ALL
            .into_iter()
            .find(|t| t.as_str() == needle)
            .ok_or_else(|| UnknownTopic(s.to_string()))
    }
}

/// A single hit as returned by the external search provider.
///
/// Every field is optional: the provider is not trusted to fill them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawHit {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// The provider's own classification of the hit (e.g. `"web"`, `"suggestion"`).
    #[serde(default, rename = "source")]
    pub result_source: Option<String>,
}

/// A candidate content item after filtering and normalization, before
/// scoring and storage.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentDraft {
    pub topic: Topic,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub source_domain: String,
    pub publication_date: NaiveDate,
    pub tags: Vec<String>,
}

/// A curated content item as persisted in the content store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub topic: Topic,
    pub url: String,
    pub title: String,
    pub summary: String,
    pub source_domain: String,
    pub publication_date: NaiveDate,
    pub quality_score: f64,
    pub refresh_cycle: i64,
    pub is_active: bool,
    pub tags: Vec<String>,
    pub age_range: String,
}

/// First generation of every freshly written item.
pub const INITIAL_REFRESH_CYCLE: i64 = 1;

/// Age band stamped on every item until age segmentation exists.
pub const DEFAULT_AGE_RANGE: &str = "all";

impl ContentItem {
    /// Promote a scored draft into a storable item with a fresh UUID.
    pub fn from_draft(draft: ContentDraft, quality_score: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            topic: draft.topic,
            url: draft.url,
            title: draft.title,
            summary: draft.summary,
            source_domain: draft.source_domain,
            publication_date: draft.publication_date,
            quality_score,
            refresh_cycle: INITIAL_REFRESH_CYCLE,
            is_active: true,
            tags: draft.tags,
            age_range: DEFAULT_AGE_RANGE.to_string(),
        }
    }
}

/// Per-topic aggregate used by `curate stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicStats {
    pub topic: Topic,
    pub total: i64,
    pub active: i64,
    pub avg_quality: Option<f64>,
    pub latest_publication: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_round_trips_through_str() {
        for topic in Topic::ALL {
            assert_eq!(topic.as_str().parse::<Topic>().unwrap(), topic);
        }
    }

    #[test]
    fn topic_parse_accepts_dashes_and_case() {
        assert_eq!(
            "Health-Safety".parse::<Topic>().unwrap(),
            Topic::HealthSafety
        );
    }

    #[test]
    fn topic_parse_rejects_unknown() {
        let err = "astrology".parse::<Topic>().unwrap_err();
        assert_eq!(err.to_string(), "unknown topic 'astrology'");
    }

    #[test]
    fn topic_serde_uses_snake_case() {
        let json = serde_json::to_string(&Topic::SocialEmotional).unwrap();
        assert_eq!(json, "\"social_emotional\"");
    }

    #[test]
    fn raw_hit_reads_provider_source_field() {
        let hit: RawHit = serde_json::from_str(
            r#"{"url":"https://a.org/x","title":"T","description":"D","source":"suggestion"}"#,
        )
        .unwrap();
        assert_eq!(hit.result_source.as_deref(), Some("suggestion"));
    }

    #[test]
    fn from_draft_sets_lifecycle_defaults() {
        let draft = ContentDraft {
            topic: Topic::SleepPatterns,
            url: "https://aap.org/sleep-guide".into(),
            title: "Sleep".into(),
            summary: "Summary".into(),
            source_domain: "aap.org".into(),
            publication_date: NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
            tags: vec!["sleep".into(), "infant".into()],
        };
        let item = ContentItem::from_draft(draft, 0.85);
        assert_eq!(item.refresh_cycle, 1);
        assert!(item.is_active);
        assert_eq!(item.age_range, "all");
        assert_eq!(item.quality_score, 0.85);
        assert!(uuid::Uuid::parse_str(&item.id).is_ok());
    }
}
