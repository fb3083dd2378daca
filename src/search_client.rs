//! HTTP client for the external web search provider.
//!
//! Sends `POST {endpoint}` with a JSON body and a bearer API key:
//!
//! ```json
//! { "query": "infant sleep training", "engine": "web", "limit": 8,
//!   "country": "us", "language": "en" }
//! ```
//!
//! and expects
//!
//! ```json
//! { "success": true,
//!   "data": [ { "url": "...", "title": "...", "description": "...", "source": "web" } ] }
//! ```
//!
//! Every failure is reported as a [`SearchFailure`] carrying the query; the
//! caller decides whether to skip the query.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use curator_core::error::{SearchFailure, SearchFailureCause};
use curator_core::models::RawHit;
use curator_core::provider::{NoopSearchProvider, SearchOptions, SearchProvider};

use crate::config::SearchConfig;

/// Search provider reached over HTTP.
pub struct HttpSearchProvider {
    endpoint: String,
    api_key: String,
    engine: String,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    engine: &'a str,
    limit: usize,
    country: &'a str,
    language: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    success: bool,
    #[serde(default)]
    data: Vec<RawHit>,
}

impl HttpSearchProvider {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        engine: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            engine: engine.into(),
            timeout,
            client,
        })
    }

    fn classify(&self, err: reqwest::Error) -> SearchFailureCause {
        if err.is_timeout() {
            SearchFailureCause::Timeout(self.timeout)
        } else {
            SearchFailureCause::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl SearchProvider for HttpSearchProvider {
    fn name(&self) -> &str {
        "http"
    }

    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<RawHit>, SearchFailure> {
        let request = SearchRequest {
            query,
            engine: &self.engine,
            limit: options.result_limit,
            country: &options.region,
            language: &options.language,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SearchFailure::new(query, self.classify(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchFailure::new(
                query,
                SearchFailureCause::Status(status.as_u16()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SearchFailure::new(query, self.classify(e)))?;

        let parsed: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| SearchFailure::new(query, SearchFailureCause::Malformed(e.to_string())))?;

        if !parsed.success {
            return Err(SearchFailure::new(query, SearchFailureCause::Unsuccessful));
        }

        Ok(parsed.data)
    }
}

/// Build the configured provider.
///
/// Without an endpoint, or when the API key variable is unset, a real run is
/// refused. A dry run falls back to [`NoopSearchProvider`] with a warning so
/// topic plans can still be inspected.
pub fn provider_from_config(
    config: &SearchConfig,
    dry_run: bool,
) -> Result<Box<dyn SearchProvider>> {
    let key = std::env::var(&config.api_key_env)
        .ok()
        .filter(|k| !k.trim().is_empty());

    let missing = match (&config.endpoint, key) {
        (Some(endpoint), Some(key)) => {
            return Ok(Box::new(HttpSearchProvider::new(
                endpoint.clone(),
                key,
                config.engine.clone(),
                config.timeout(),
            )?));
        }
        (None, _) => "search.endpoint is not configured".to_string(),
        (Some(_), None) => format!("search API key variable {} is not set", config.api_key_env),
    };

    if !dry_run {
        bail!("{}; cannot populate without a search provider", missing);
    }
    tracing::warn!(reason = %missing, "dry run without a search provider; searches return no hits");
    Ok(Box::new(NoopSearchProvider))
}
