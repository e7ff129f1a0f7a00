//! Concurrent fan-out, merge, facet extraction, filtering and sorting.
//!
//! One [`Aggregator::aggregate`] call runs this pipeline:
//!
//! 1. **Fan-out**: every provider is asked for the same page concurrently
//! 2. **Merge**: batches are concatenated in provider order, not completion order
//! 3. **Filter**: source, then author (exact matches)
//! 4. **Sort**: newest first, stable, so equal timestamps keep merge order
//! 5. **Facets**: distinct categories and authors, each led by `"All"`
//! 6. **Category**: exact-match filter unless the wildcard is selected
//! 7. **Continuation**: decided by the configured [`MoreStrategy`]
//!
//! Nothing in here can fail. Providers absorb their own errors, so the
//! worst outcome is an empty page with `has_more = false`.

use crate::models::{AggregatedPage, Article, Query, ALL};
use crate::providers::{Batch, NewsProvider};
use futures::future::join_all;
use itertools::Itertools;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// How the aggregator decides whether another page exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoreStrategy {
    /// Run page `n+1` through the full pipeline and report whether anything
    /// survives. Exact, but doubles the upstream request volume.
    #[default]
    Lookahead,
    /// Trust provider-local hints: a full upstream page, or leftover items
    /// in an in-process slice. One round trip, but a provider whose last
    /// page happens to be exactly full causes one extra, empty load.
    ShortPage,
}

pub struct Aggregator {
    providers: Vec<Arc<dyn NewsProvider>>,
    strategy: MoreStrategy,
}

impl Aggregator {
    /// `providers` are invoked and merged in the given order.
    pub fn new(providers: Vec<Arc<dyn NewsProvider>>) -> Self {
        Self {
            providers,
            strategy: MoreStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: MoreStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> MoreStrategy {
        self.strategy
    }

    /// Fetch, merge, filter and sort one page.
    ///
    /// An invalid query (zero page, zero page size, inverted dates) is a
    /// no-op: nothing is sent upstream and the empty page is returned.
    #[instrument(level = "info", skip_all, fields(page = query.page, page_size = query.page_size))]
    pub async fn aggregate(&self, query: &Query) -> AggregatedPage {
        if let Err(e) = query.validate() {
            warn!(error = %e, "Rejecting invalid query without contacting providers");
            return AggregatedPage::empty();
        }

        let batches = self.fetch_all(query).await;
        let provider_hint = batches.iter().any(|b| b.may_have_more);
        let merged: Vec<Article> = batches.into_iter().flat_map(|b| b.articles).collect();
        let merged_count = merged.len();

        let sorted = newest_first(filter_source_and_author(merged, query));
        let categories = facet(sorted.iter().map(Article::category));
        let authors = facet(sorted.iter().map(Article::author));
        let articles = filter_category(sorted, query);

        let has_more = match self.strategy {
            MoreStrategy::Lookahead => self.probe(&query.with_page(query.page.saturating_add(1))).await,
            MoreStrategy::ShortPage => provider_hint,
        };

        info!(
            merged = merged_count,
            returned = articles.len(),
            categories = categories.len() - 1,
            authors = authors.len() - 1,
            has_more,
            "Aggregated page"
        );
        AggregatedPage {
            articles,
            categories,
            authors,
            has_more,
        }
    }

    /// Run the next page through the same fetch and filter pipeline and
    /// report whether anything survives.
    async fn probe(&self, next: &Query) -> bool {
        let merged: Vec<Article> = self
            .fetch_all(next)
            .await
            .into_iter()
            .flat_map(|b| b.articles)
            .collect();
        let surviving = filter_category(filter_source_and_author(merged, next), next).len();
        debug!(page = next.page, surviving, "Lookahead probe finished");
        surviving > 0
    }

    async fn fetch_all(&self, query: &Query) -> Vec<Batch> {
        join_all(self.providers.iter().map(|provider| {
            let upstream = upstream_query(query, provider.as_ref());
            async move { provider.fetch(&upstream).await }
        }))
        .await
    }
}

/// The query as a given provider should see it: the category is only
/// forwarded where the provider can evaluate it upstream. The post-merge
/// filter covers everyone else.
fn upstream_query(query: &Query, provider: &dyn NewsProvider) -> Query {
    let mut upstream = query.clone();
    if !provider.capabilities().server_side.category {
        upstream.category = None;
    }
    upstream
}

fn filter_source_and_author(articles: Vec<Article>, query: &Query) -> Vec<Article> {
    let author = query.author_filter();
    articles
        .into_iter()
        .filter(|a| query.source.is_none_or(|source| a.source() == source))
        .filter(|a| author.is_none_or(|author| a.author() == author))
        .collect()
}

fn filter_category(articles: Vec<Article>, query: &Query) -> Vec<Article> {
    match query.category_filter() {
        Some(category) => articles.into_iter().filter(|a| a.category() == category).collect(),
        None => articles,
    }
}

/// Stable sort, newest first.
fn newest_first(mut articles: Vec<Article>) -> Vec<Article> {
    articles.sort_by(|a, b| b.published_at().cmp(&a.published_at()));
    articles
}

/// Distinct, trimmed, non-empty values in first-seen order, led by [`ALL`].
fn facet<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    std::iter::once(ALL)
        .chain(values.map(str::trim).filter(|v| !v.is_empty()))
        .unique()
        .map(str::to_string)
        .collect()
}
