//! # Curator Core
//!
//! Shared, runtime-agnostic logic for Topic Curator: content models, result
//! filtering and normalization, URL deduplication, trust scoring, the content
//! store abstraction, and the ranked retrieval algorithm.
//!
//! This crate contains no tokio, sqlx, reqwest, or filesystem I/O. The
//! application crate supplies the concrete search provider and store.

pub mod dedup;
pub mod error;
pub mod models;
pub mod normalize;
pub mod provider;
pub mod retrieval;
pub mod scoring;
pub mod store;
