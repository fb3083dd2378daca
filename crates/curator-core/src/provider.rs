//! Search provider abstraction.
//!
//! The ingestion job talks to the external search service only through
//! [`SearchProvider`]. The HTTP implementation and the rate-limited wrapper
//! live in the application crate; tests plug in scripted providers.

use async_trait::async_trait;

use crate::error::SearchFailure;
use crate::models::RawHit;

/// Per-call search options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum number of hits requested from the provider.
    pub result_limit: usize,
    /// Country/region code (e.g. `"us"`).
    pub region: String,
    /// Language code (e.g. `"en"`).
    pub language: String,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            result_limit: 8,
            region: "us".to_string(),
            language: "en".to_string(),
        }
    }
}

/// An external search service.
///
/// Each call is independent and stateless. Implementations enforce their own
/// timeout and map every failure (transport, timeout, non-success response,
/// malformed payload) to a [`SearchFailure`] carrying the query.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Run one query and return the provider's hits in relevance order.
    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<RawHit>, SearchFailure>;
}

#[async_trait]
impl SearchProvider for Box<dyn SearchProvider> {
    fn name(&self) -> &str {
        self.as_ref().name()
    }

    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<RawHit>, SearchFailure> {
        self.as_ref().search(query, options).await
    }
}

/// Provider that never returns hits.
///
/// Used when no API key is configured, so `populate --dry-run` can still
/// exercise the rest of the pipeline.
pub struct NoopSearchProvider;

#[async_trait]
impl SearchProvider for NoopSearchProvider {
    fn name(&self) -> &str {
        "noop"
    }

    async fn search(
        &self,
        _query: &str,
        _options: &SearchOptions,
    ) -> Result<Vec<RawHit>, SearchFailure> {
        Ok(Vec::new())
    }
}
