//! Typed failures crossing the core's public seams.
//!
//! Validation rejections are not errors: they are counted by
//! [`normalize`](crate::normalize) and dropped.

use std::time::Duration;

/// Boxed error used to carry backend failures without leaking their type.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A single search query that produced no usable response.
///
/// Recovered locally by the ingestion job: the query is skipped and the
/// job continues with the next one.
#[derive(Debug, thiserror::Error)]
#[error("search for {query:?} failed: {cause}")]
pub struct SearchFailure {
    pub query: String,
    pub cause: SearchFailureCause,
}

impl SearchFailure {
    pub fn new(query: impl Into<String>, cause: SearchFailureCause) -> Self {
        Self {
            query: query.into(),
            cause,
        }
    }
}

/// Why a search call failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchFailureCause {
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("provider returned HTTP {0}")]
    Status(u16),
    #[error("provider reported an unsuccessful search")]
    Unsuccessful,
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Failure of a retrieval call, surfaced to the consumer.
///
/// The `Display` output never includes backend detail; the source chain
/// keeps it for operator logs.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("invalid content query: {0}")]
    InvalidQuery(String),
    #[error("content store unavailable")]
    Unavailable(#[source] BoxError),
}

impl RetrievalError {
    /// Machine-readable code used by the HTTP error contract.
    pub fn code(&self) -> &'static str {
        match self {
            RetrievalError::InvalidQuery(_) => "bad_request",
            RetrievalError::Unavailable(_) => "retrieval_unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_failure_message_names_query_and_cause() {
        let err = SearchFailure::new("baby nap schedule", SearchFailureCause::Status(502));
        assert_eq!(
            err.to_string(),
            "search for \"baby nap schedule\" failed: provider returned HTTP 502"
        );
    }

    #[test]
    fn unavailable_hides_backend_detail() {
        let backend = anyhow::anyhow!("disk I/O error at /var/lib/secret.sqlite");
        let err = RetrievalError::Unavailable(backend.into());
        assert_eq!(err.to_string(), "content store unavailable");
        assert_eq!(err.code(), "retrieval_unavailable");
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().contains("disk I/O error"));
    }
}
