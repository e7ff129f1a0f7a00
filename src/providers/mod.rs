//! News provider adapters that map each upstream API onto [`Article`].
//!
//! Every adapter wraps exactly one external HTTP API, translates a [`Query`]
//! into that API's request shape and maps the response into canonical
//! articles.
//!
//! # Supported Providers
//!
//! | Source | Module | Upstream | Server-side support |
//! |--------|--------|----------|---------------------|
//! | `GenericHeadline` | [`headline`] | NewsAPI `/v2/everything` | term, dates, paging |
//! | `PublisherA` | [`publisher_a`] | Guardian content search | term, dates, section, paging |
//! | `PublisherB` | [`publisher_b`] | NYT top stories (fixed feed) | nothing |
//!
//! # Common Patterns
//!
//! Each adapter implements [`NewsProvider::try_fetch`] and declares its
//! [`Capabilities`]. Whatever an adapter cannot do upstream is done here, in
//! process, by [`apply_local_filters`] and [`local_page`], driven by the same
//! descriptor. That keeps provider quirks out of the aggregator.
//!
//! Adapters never fail past their own boundary: [`NewsProvider::fetch`]
//! logs the error and yields an empty [`Batch`], so the aggregator can always
//! proceed with whatever the other providers returned.

use crate::api::{HttpClient, ProviderError};
use crate::config::Settings;
use crate::models::{Article, Query, RawArticle, Source};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

pub mod headline;
pub mod publisher_a;
pub mod publisher_b;

pub use headline::GenericHeadlineAdapter;
pub use publisher_a::PublisherAAdapter;
pub use publisher_b::PublisherBAdapter;

/// Query dimensions a provider can evaluate upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterSupport {
    pub term: bool,
    pub date: bool,
    pub category: bool,
}

/// What a provider's upstream API can do on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub server_side: FilterSupport,
    pub server_side_pagination: bool,
}

/// One page worth of normalized articles from a single provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    pub articles: Vec<Article>,
    /// Provider-local hint that a further page could be non-empty: a full
    /// upstream page for paginating APIs, leftover items for sliced feeds.
    pub may_have_more: bool,
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// The tag stamped on every article this provider produces.
    fn source(&self) -> Source;

    fn capabilities(&self) -> Capabilities;

    /// Fetch and normalize one page, surfacing failures.
    async fn try_fetch(&self, query: &Query) -> Result<Batch, ProviderError>;

    /// Fetch one page, degrading any failure to an empty batch.
    async fn fetch(&self, query: &Query) -> Batch {
        match self.try_fetch(query).await {
            Ok(batch) => {
                info!(
                    source = %self.source(),
                    page = query.page,
                    count = batch.articles.len(),
                    "Fetched provider page"
                );
                batch
            }
            Err(e @ ProviderError::Status { .. }) => {
                warn!(source = %self.source(), page = query.page, error = %e, "Provider rejected request");
                Batch::default()
            }
            Err(e) => {
                error!(source = %self.source(), page = query.page, error = %e, "Provider fetch failed");
                Batch::default()
            }
        }
    }
}

/// Normalize raw records, dropping (and logging) the malformed ones.
///
/// Also drops repeated ids so one batch never contains the same
/// `(source, id)` twice.
pub fn normalize_all(source: Source, raws: Vec<RawArticle>) -> Vec<Article> {
    let mut seen = std::collections::HashSet::new();
    raws.into_iter()
        .filter_map(|raw| match raw.normalize() {
            Ok(article) => Some(article),
            Err(e) => {
                warn!(%source, reason = %e, "Dropping malformed provider record");
                None
            }
        })
        .filter(|article| seen.insert(article.id().to_string()))
        .collect()
}

/// Apply the term and date filters a provider could not apply upstream.
///
/// Term matching is a case-insensitive substring search over title,
/// description and author. Date bounds are inclusive calendar days, taken
/// in the offset the provider reported the timestamp in.
pub fn apply_local_filters(articles: Vec<Article>, query: &Query, caps: &Capabilities) -> Vec<Article> {
    let term = if caps.server_side.term {
        None
    } else {
        query.term().map(str::to_lowercase)
    };
    let (from, to) = if caps.server_side.date {
        (None, None)
    } else {
        (query.from_date, query.to_date)
    };

    articles
        .into_iter()
        .filter(|a| match &term {
            Some(term) => format!("{} {} {}", a.title(), a.description(), a.author())
                .to_lowercase()
                .contains(term.as_str()),
            None => true,
        })
        .filter(|a| {
            let day = a.published_on();
            from.is_none_or(|from| day >= from) && to.is_none_or(|to| day <= to)
        })
        .collect()
}

/// Slice one page out of a complete in-process listing.
///
/// Used by providers without upstream pagination. Pages past the end are
/// empty.
pub fn local_page(articles: Vec<Article>, query: &Query) -> Batch {
    let start = query.offset();
    let end = start.saturating_add(query.page_size as usize);
    let may_have_more = articles.len() > end;
    let articles = articles
        .into_iter()
        .skip(start)
        .take(query.page_size as usize)
        .collect();
    Batch { articles, may_have_more }
}

/// Build the three adapters in merge order from explicit settings.
pub fn build_all(settings: &Settings, http: &HttpClient) -> Vec<Arc<dyn NewsProvider>> {
    let generic_headline: Arc<dyn NewsProvider> =
        Arc::new(GenericHeadlineAdapter::new(settings.generic_headline.clone(), http.clone()));
    let publisher_a: Arc<dyn NewsProvider> =
        Arc::new(PublisherAAdapter::new(settings.publisher_a.clone(), http.clone()));
    let publisher_b: Arc<dyn NewsProvider> =
        Arc::new(PublisherBAdapter::new(settings.publisher_b.clone(), http.clone()));
    vec![generic_headline, publisher_a, publisher_b]
}
