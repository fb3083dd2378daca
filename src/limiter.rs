//! Rate-limited search provider wrapper.
//!
//! Wraps any [`SearchProvider`] with a `governor` token bucket so that every
//! provider call, across all topics of a job, respects one shared quota.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use curator_core::error::SearchFailure;
use curator_core::models::RawHit;
use curator_core::provider::{SearchOptions, SearchProvider};

use crate::config::RateLimitConfig;

type DirectRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// A provider wrapper that waits for a permit before each call.
pub struct RateLimitedProvider<P: SearchProvider> {
    inner: P,
    limiter: Option<Arc<DirectRateLimiter>>,
}

impl<P: SearchProvider> RateLimitedProvider<P> {
    /// One call per `interval`, allowing `burst` calls back to back.
    ///
    /// A zero interval disables limiting.
    pub fn new(inner: P, interval: Duration, burst: u32) -> Self {
        let limiter = Quota::with_period(interval).map(|quota| {
            let burst = NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN);
            Arc::new(RateLimiter::direct(quota.allow_burst(burst)))
        });
        Self { inner, limiter }
    }

    pub fn from_config(inner: P, config: &RateLimitConfig) -> Self {
        Self::new(
            inner,
            Duration::from_millis(config.min_interval_ms),
            config.burst,
        )
    }

    pub fn is_limited(&self) -> bool {
        self.limiter.is_some()
    }

    async fn wait_for_permit(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

#[async_trait]
impl<P: SearchProvider> SearchProvider for RateLimitedProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<RawHit>, SearchFailure> {
        self.wait_for_permit().await;
        self.inner.search(query, options).await
    }
}
