//! Incremental-load controller driving the aggregator page by page.
//!
//! The controller owns the accumulated article list and the active filters,
//! and turns user intents into aggregator calls:
//!
//! ```text
//! Idle ──filter change──▶ Loading ──▶ Ready ──load_more──▶ LoadingMore ──▶ Ready
//!                            ▲          │
//!                            └─filter───┘        Ready with has_more = false is terminal
//! ```
//!
//! - A filter change resets to page 1 and replaces the list wholesale.
//! - `load_more` appends the next page as-is; the accumulated list is not
//!   re-sorted, so timestamps may interleave across page boundaries.
//! - `load_more` is a no-op unless the controller is `Ready` with more
//!   pages available, so overlapping triggers (button plus scroll) cannot
//!   start a second load.
//!
//! # Stale responses
//!
//! Every filter change bumps a request generation. When a response arrives
//! for a generation that is no longer current, it is dropped instead of
//! overwriting the newer state. In-flight requests are not cancelled.

use crate::aggregator::Aggregator;
use crate::models::{Article, Query, Source, ALL};
use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// Distance from the bottom of the content, in pixels, that counts as
/// "reached the end" for scroll-triggered loading.
pub const SCROLL_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    LoadingMore,
}

/// Every filter dimension at once, for batch application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub term: Option<String>,
    pub category: Option<String>,
    pub source: Option<Source>,
    pub author: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

impl Filters {
    fn apply_to(self, query: &mut Query) {
        query.term = self.term;
        query.category = self.category;
        query.source = self.source;
        query.author = self.author;
        query.from_date = self.from_date;
        query.to_date = self.to_date;
    }
}

/// Scroll geometry reported by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPosition {
    pub viewport_height: f64,
    pub scroll_offset: f64,
    pub content_height: f64,
}

impl ScrollPosition {
    pub fn near_bottom(&self) -> bool {
        self.viewport_height + self.scroll_offset >= self.content_height - SCROLL_THRESHOLD
    }
}

/// What the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedView {
    pub articles: Vec<Article>,
    pub categories: Vec<String>,
    pub authors: Vec<String>,
    pub loading: bool,
    pub loading_more: bool,
    pub has_more: bool,
    pub page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
}

#[derive(Debug)]
struct FeedState {
    phase: Phase,
    query: Query,
    articles: Vec<Article>,
    categories: Vec<String>,
    authors: Vec<String>,
    has_more: bool,
    generation: u64,
}

pub struct FeedController {
    aggregator: Aggregator,
    state: Mutex<FeedState>,
}

impl FeedController {
    pub fn new(aggregator: Aggregator, page_size: u32) -> Self {
        let query = Query { page_size, ..Query::default() };
        Self {
            aggregator,
            state: Mutex::new(FeedState {
                phase: Phase::Idle,
                query,
                articles: Vec::new(),
                categories: vec![ALL.to_string()],
                authors: vec![ALL.to_string()],
                has_more: false,
                generation: 0,
            }),
        }
    }

    /// Initial load with the current (empty) filters.
    pub async fn start(&self) {
        self.reload(|_| {}).await;
    }

    pub async fn search(&self, term: impl Into<String>) {
        let term = term.into();
        self.reload(move |q| q.term = Some(term)).await;
    }

    pub async fn select_category(&self, category: impl Into<String>) {
        let category = category.into();
        self.reload(move |q| q.category = Some(category)).await;
    }

    pub async fn select_source(&self, source: Option<Source>) {
        self.reload(move |q| q.source = source).await;
    }

    pub async fn select_author(&self, author: Option<String>) {
        self.reload(move |q| q.author = author).await;
    }

    pub async fn set_date_range(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) {
        self.reload(move |q| {
            q.from_date = from;
            q.to_date = to;
        })
        .await;
    }

    /// Replace every filter at once and reload a single time.
    pub async fn apply_filters(&self, filters: Filters) {
        self.reload(move |q| filters.apply_to(q)).await;
    }

    /// Load and append the next page.
    ///
    /// Returns `false` without doing anything while another load is in
    /// flight or when there is nothing more to load.
    #[instrument(level = "info", skip_all)]
    pub async fn load_more(&self) -> bool {
        let (next, generation) = {
            let mut state = self.state.lock().await;
            if state.phase != Phase::Ready || !state.has_more {
                debug!(phase = ?state.phase, has_more = state.has_more, "Ignoring load_more");
                return false;
            }
            state.phase = Phase::LoadingMore;
            (state.query.with_page(state.query.page + 1), state.generation)
        };

        let page = self.aggregator.aggregate(&next).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!(page = next.page, "Discarding stale load_more response");
            return true;
        }
        info!(page = next.page, appended = page.articles.len(), has_more = page.has_more, "Loaded more articles");
        state.articles.extend(page.articles);
        merge_facet(&mut state.categories, page.categories);
        merge_facet(&mut state.authors, page.authors);
        state.query.page = next.page;
        state.has_more = page.has_more;
        state.phase = Phase::Ready;
        true
    }

    /// Trigger `load_more` when the reported scroll position is near the end.
    pub async fn on_scroll(&self, position: ScrollPosition) -> bool {
        if !position.near_bottom() {
            return false;
        }
        self.load_more().await
    }

    pub async fn view(&self) -> FeedView {
        let state = self.state.lock().await;
        let empty_message = (state.phase == Phase::Ready && state.articles.is_empty())
            .then(|| format!("No articles found for \"{}\"", state.query.term().unwrap_or_default()));
        FeedView {
            articles: state.articles.clone(),
            categories: state.categories.clone(),
            authors: state.authors.clone(),
            loading: state.phase == Phase::Loading,
            loading_more: state.phase == Phase::LoadingMore,
            has_more: state.has_more,
            page: state.query.page,
            empty_message,
        }
    }

    pub async fn phase(&self) -> Phase {
        self.state.lock().await.phase
    }

    pub async fn query(&self) -> Query {
        self.state.lock().await.query.clone()
    }

    async fn reload(&self, change: impl FnOnce(&mut Query)) {
        let (query, generation) = {
            let mut state = self.state.lock().await;
            change(&mut state.query);
            state.query.page = 1;
            state.generation += 1;
            state.phase = Phase::Loading;
            (state.query.clone(), state.generation)
        };

        let page = self.aggregator.aggregate(&query).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!(generation, current = state.generation, "Discarding stale reload response");
            return;
        }
        info!(count = page.articles.len(), has_more = page.has_more, "Reloaded articles");
        state.articles = page.articles;
        state.categories = page.categories;
        state.authors = page.authors;
        state.has_more = page.has_more;
        state.phase = Phase::Ready;
    }
}

/// Append facet values not already present, keeping first-seen order.
fn merge_facet(existing: &mut Vec<String>, incoming: Vec<String>) {
    for value in incoming {
        if !existing.contains(&value) {
            existing.push(value);
        }
    }
}
