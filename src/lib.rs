//! # Tri-Source News
//!
//! Aggregates news articles from three heterogeneous providers, normalizes
//! them into one [`Article`] shape and serves them through search, category,
//! source, author and date-range filters with incremental page loading.
//!
//! ## Architecture
//!
//! Leaves first:
//! 1. **Providers** ([`providers`]): one adapter per upstream API, mapping
//!    its schema onto [`Article`] and failing soft
//! 2. **Aggregator** ([`aggregator`]): concurrent fan-out, merge, facets,
//!    filters, stable newest-first sort, continuation
//! 3. **Controller** ([`controller`]): turns user intents into page loads
//!    and owns the accumulated result list
//!
//! ```text
//! FeedController ─▶ Aggregator ─┬▶ GenericHeadlineAdapter ─▶ NewsAPI
//!                               ├▶ PublisherAAdapter      ─▶ Guardian
//!                               └▶ PublisherBAdapter      ─▶ NYT top stories
//! ```

pub mod aggregator;
pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod models;
pub mod outputs;
pub mod providers;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregator::{Aggregator, MoreStrategy};
pub use controller::{FeedController, FeedView, Filters, Phase, ScrollPosition};
pub use models::{AggregatedPage, Article, Query, Source};
pub use providers::NewsProvider;
