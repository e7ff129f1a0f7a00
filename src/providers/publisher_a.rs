//! Publisher A adapter backed by the Guardian content search API.
//!
//! # Upstream contract
//!
//! Everything the query carries is evaluated server-side, including the
//! category, which is sent as the lower-cased `section` id. The mapping is
//! lossy: a category that is not a Guardian section simply yields nothing
//! from this provider.
//!
//! Items of type `video` carry their playable page as `videoUrl`.
//!
//! Asking for a page past the last one is answered with HTTP 400 instead of
//! an empty result list. For any page after the first that is the normal end
//! of the listing and is reported as an empty batch.

use super::{normalize_all, Batch, Capabilities, FilterSupport, NewsProvider};
use crate::api::{HttpClient, ProviderError};
use crate::config::ProviderConfig;
use crate::models::{Query, RawArticle, Source};
use crate::utils::strip_markup;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct Envelope {
    response: SearchResponse,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    status: String,
    message: Option<String>,
    #[serde(default)]
    results: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    id: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    section_name: Option<String>,
    web_publication_date: Option<String>,
    web_title: Option<String>,
    web_url: Option<String>,
    #[serde(default)]
    fields: ItemFields,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemFields {
    trail_text: Option<String>,
    thumbnail: Option<String>,
    byline: Option<String>,
}

impl SearchItem {
    fn into_raw(self) -> RawArticle {
        let video_url = match self.kind.as_deref() {
            Some("video") => self.web_url.clone(),
            _ => None,
        };
        RawArticle {
            native_id: self.id,
            title: self.web_title,
            description: self.fields.trail_text.as_deref().map(strip_markup),
            image_url: self.fields.thumbnail,
            video_url,
            published_at: self.web_publication_date,
            url: self.web_url,
            author: self.fields.byline,
            category: self.section_name,
            ..RawArticle::new(Source::PublisherA)
        }
    }
}

#[derive(Debug, Clone)]
pub struct PublisherAAdapter {
    config: ProviderConfig,
    http: HttpClient,
}

impl PublisherAAdapter {
    pub fn new(config: ProviderConfig, http: HttpClient) -> Self {
        Self { config, http }
    }

    fn params(&self, query: &Query) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("api-key", self.config.api_key.clone()),
            ("show-fields", "thumbnail,trailText,byline".to_string()),
            ("order-by", "newest".to_string()),
            ("page", query.page.to_string()),
            ("page-size", query.page_size.to_string()),
        ];
        if let Some(term) = query.term() {
            params.push(("q", term.to_string()));
        }
        if let Some(from) = query.from_date {
            params.push(("from-date", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = query.to_date {
            params.push(("to-date", to.format("%Y-%m-%d").to_string()));
        }
        if let Some(category) = query.category_filter() {
            params.push(("section", category.to_lowercase()));
        }
        params
    }
}

#[async_trait]
impl NewsProvider for PublisherAAdapter {
    fn source(&self) -> Source {
        Source::PublisherA
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            server_side: FilterSupport { term: true, date: true, category: true },
            server_side_pagination: true,
        }
    }

    #[instrument(level = "info", skip_all, fields(page = query.page))]
    async fn try_fetch(&self, query: &Query) -> Result<Batch, ProviderError> {
        let envelope: Envelope = match self.http.get_json(&self.config.base_url, &self.params(query)).await {
            Ok(envelope) => envelope,
            Err(ProviderError::Status { status: 400, .. }) if query.page > 1 => {
                debug!(page = query.page, "Requested page is past the end of the results");
                return Ok(Batch::default());
            }
            Err(e) => return Err(e),
        };
        let response = envelope.response;
        if response.status != "ok" {
            return Err(ProviderError::Upstream(
                response.message.unwrap_or_else(|| response.status.clone()),
            ));
        }

        let upstream_count = response.results.len();
        let raws = response.results.into_iter().map(SearchItem::into_raw).collect();
        Ok(Batch {
            articles: normalize_all(Source::PublisherA, raws),
            may_have_more: upstream_count >= query.page_size as usize,
        })
    }
}
