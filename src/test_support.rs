//! Fixtures shared by the unit tests: article builders and a scripted provider.

use crate::api::ProviderError;
use crate::models::{Article, Query, RawArticle, Source};
use crate::providers::{local_page, Batch, Capabilities, FilterSupport, NewsProvider};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// Build a valid article; the title is `Headline <native_id>`.
pub fn article(source: Source, native_id: &str, published_at: &str, category: &str, author: &str) -> Article {
    RawArticle {
        native_id: Some(native_id.to_string()),
        title: Some(format!("Headline {native_id}")),
        url: Some(format!("https://example.com/{source}/{native_id}")),
        published_at: Some(published_at.to_string()),
        category: Some(category.to_string()),
        author: Some(author.to_string()),
        ..RawArticle::new(source)
    }
    .normalize()
    .unwrap()
}

/// `count` articles from `source`, one minute apart, newest first.
pub fn articles(source: Source, count: usize, category: &str, author: &str) -> Vec<Article> {
    (0..count)
        .map(|i| {
            let ts = format!("2025-05-06T12:{:02}:00Z", 59 - (i % 60));
            article(source, &format!("{}-{i}", source.as_str().to_lowercase()), &ts, category, author)
        })
        .collect()
}

/// A provider serving a fixed listing, sliced per page like an
/// offset-paginated API.
pub struct FakeProvider {
    source: Source,
    capabilities: Capabilities,
    listing: Vec<Article>,
    fail: bool,
    gate: Option<Arc<Semaphore>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<Query>>,
}

impl FakeProvider {
    pub fn new(source: Source, listing: Vec<Article>) -> Self {
        Self {
            source,
            capabilities: Capabilities {
                server_side: FilterSupport { term: true, date: true, category: false },
                server_side_pagination: true,
            },
            listing,
            fail: false,
            gate: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(source: Source) -> Self {
        Self { fail: true, ..Self::new(source, Vec::new()) }
    }

    pub fn with_capabilities(self, capabilities: Capabilities) -> Self {
        Self { capabilities, ..self }
    }

    /// Every fetch waits for a permit from `gate` before answering.
    pub fn gated(self, gate: Arc<Semaphore>) -> Self {
        Self { gate: Some(gate), ..self }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<Query> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl NewsProvider for FakeProvider {
    fn source(&self) -> Source {
        self.source
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    async fn try_fetch(&self, query: &Query) -> Result<Batch, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(query.clone());
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await.unwrap();
        }
        if self.fail {
            return Err(ProviderError::Upstream("connection reset".to_string()));
        }
        Ok(local_page(self.listing.clone(), query))
    }
}
