//! Data models for normalized articles, queries and aggregated result pages.
//!
//! This module defines the core data structures used throughout the crate:
//! - [`Source`]: The closed set of providers an article can come from
//! - [`RawArticle`]: Loosely-typed provider output, before normalization
//! - [`Article`]: The canonical, provider-agnostic article
//! - [`Query`]: The transient filter and paging contract driving a fetch
//! - [`AggregatedPage`]: One merged, filtered and sorted page plus facets
//!
//! Articles are immutable once normalized. Every accessor hands out borrowed
//! data, and the only way to build one is [`RawArticle::normalize`], which
//! enforces the required fields and substitutes the sentinel values.

use crate::utils::parse_timestamp;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Author substituted when a provider omits the byline.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Category substituted when a provider has no section or taxonomy value.
pub const GENERAL_CATEGORY: &str = "General";

/// Wildcard facet value; selecting it disables the corresponding filter.
pub const ALL: &str = "All";

/// Default number of articles requested from each provider per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// The provider that produced an article.
///
/// Adapters are invoked and merged in declaration order, so the derived
/// `Ord` doubles as the merge order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Source {
    /// NewsAPI headline search.
    GenericHeadline,
    /// The Guardian content API.
    PublisherA,
    /// New York Times top stories feed.
    PublisherB,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::GenericHeadline => "GenericHeadline",
            Source::PublisherA => "PublisherA",
            Source::PublisherB => "PublisherB",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown source {0:?} (expected GenericHeadline, PublisherA or PublisherB)")]
pub struct UnknownSource(pub String);

impl FromStr for Source {
    type Err = UnknownSource;

    /// Accepts the canonical tags as well as the upstream brand names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "genericheadline" | "newsapi" => Ok(Source::GenericHeadline),
            "publishera" | "guardian" => Ok(Source::PublisherA),
            "publisherb" | "nytimes" | "nyt" => Ok(Source::PublisherB),
            _ => Err(UnknownSource(s.to_string())),
        }
    }
}

/// A provider record mapped field-by-field but not yet validated.
///
/// Adapters fill in whatever their upstream schema offers and leave the rest
/// as `None`; [`RawArticle::normalize`] decides whether the record is usable.
#[derive(Debug, Clone)]
pub struct RawArticle {
    pub source: Source,
    /// Provider-native identity (guardian path, article url, ...).
    pub native_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub published_at: Option<String>,
    pub url: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
}

impl RawArticle {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            native_id: None,
            title: None,
            description: None,
            image_url: None,
            video_url: None,
            published_at: None,
            url: None,
            author: None,
            category: None,
        }
    }

    /// Validate the record and produce a canonical [`Article`].
    ///
    /// Required: title, url, a parseable publication timestamp and a native
    /// id (the url is used when the provider has no id of its own). Optional
    /// text fields are trimmed; blank values become the documented sentinels.
    /// Media links that are not absolute URLs are discarded.
    pub fn normalize(self) -> Result<Article, MalformedArticle> {
        let title = non_blank(self.title).ok_or(MalformedArticle::MissingTitle)?;
        let url = non_blank(self.url).ok_or(MalformedArticle::MissingUrl)?;
        let raw_published = non_blank(self.published_at).ok_or(MalformedArticle::MissingPublishedAt)?;
        let published = parse_timestamp(&raw_published)
            .ok_or(MalformedArticle::BadPublishedAt(raw_published))?;
        let native_id = non_blank(self.native_id).unwrap_or_else(|| url.clone());

        Ok(Article {
            id: format!("{}:{}", self.source, native_id),
            title,
            description: non_blank(self.description).unwrap_or_default(),
            image_url: absolute_url(self.image_url),
            video_url: absolute_url(self.video_url),
            published_at: published.with_timezone(&Utc),
            published_on: published.date_naive(),
            source: self.source,
            url,
            author: non_blank(self.author).unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            category: non_blank(self.category).unwrap_or_else(|| GENERAL_CATEGORY.to_string()),
        })
    }
}

/// Why a provider record was dropped instead of normalized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedArticle {
    #[error("record has no title")]
    MissingTitle,
    #[error("record has no url")]
    MissingUrl,
    #[error("record has no publication timestamp")]
    MissingPublishedAt,
    #[error("unparseable publication timestamp {0:?}")]
    BadPublishedAt(String),
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn absolute_url(value: Option<String>) -> Option<String> {
    non_blank(value).filter(|v| Url::parse(v).is_ok())
}

/// A canonical, provider-agnostic news article.
///
/// `id` is qualified with the producing [`Source`] so records from different
/// providers can never collide. `author` and `category` are always concrete
/// values: either what the provider reported or a sentinel.
///
/// `published_at` is the instant in UTC; `published_on` is the calendar day
/// in the provider's own offset, which is what date ranges are checked
/// against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    id: String,
    title: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    video_url: Option<String>,
    published_at: DateTime<Utc>,
    #[serde(skip)]
    published_on: NaiveDate,
    source: Source,
    url: String,
    author: String,
    category: String,
}

impl Article {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn video_url(&self) -> Option<&str> {
        self.video_url.as_deref()
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    pub fn published_on(&self) -> NaiveDate {
        self.published_on
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn category(&self) -> &str {
        &self.category
    }
}

/// The filter and paging contract for one fetch.
///
/// Every filter is optional. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub term: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub source: Option<Source>,
    pub author: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            term: None,
            from_date: None,
            to_date: None,
            category: None,
            source: None,
            author: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Query {
    pub fn with_page(&self, page: u32) -> Self {
        Self { page, ..self.clone() }
    }

    /// The trimmed search term, if any.
    pub fn term(&self) -> Option<&str> {
        self.term.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// The category to filter on, ignoring blanks and the [`ALL`] wildcard.
    pub fn category_filter(&self) -> Option<&str> {
        wildcard_aware(self.category.as_deref())
    }

    /// The author to filter on, ignoring blanks and the [`ALL`] wildcard.
    pub fn author_filter(&self) -> Option<&str> {
        wildcard_aware(self.author.as_deref())
    }

    /// Zero-based offset of the first item of this page within a full listing.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.page_size as usize)
    }

    pub fn validate(&self) -> Result<(), QueryError> {
        if self.page == 0 {
            return Err(QueryError::ZeroPage);
        }
        if self.page_size == 0 {
            return Err(QueryError::ZeroPageSize);
        }
        if let (Some(from), Some(to)) = (self.from_date, self.to_date) {
            if from > to {
                return Err(QueryError::InvertedDateRange { from, to });
            }
        }
        Ok(())
    }
}

fn wildcard_aware(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != ALL)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("page numbers start at 1")]
    ZeroPage,
    #[error("page size must be at least 1")]
    ZeroPageSize,
    #[error("date range starts ({from}) after it ends ({to})")]
    InvertedDateRange { from: NaiveDate, to: NaiveDate },
}

/// One aggregated page: merged articles plus the facets derived from them.
///
/// `categories` and `authors` always start with the [`ALL`] wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedPage {
    pub articles: Vec<Article>,
    pub categories: Vec<String>,
    pub authors: Vec<String>,
    pub has_more: bool,
}

impl AggregatedPage {
    pub fn empty() -> Self {
        Self {
            articles: Vec::new(),
            categories: vec![ALL.to_string()],
            authors: vec![ALL.to_string()],
            has_more: false,
        }
    }
}
