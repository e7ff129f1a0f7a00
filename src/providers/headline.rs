//! Generic headline adapter backed by the NewsAPI `everything` endpoint.
//!
//! # Upstream contract
//!
//! Term, date range and pagination are evaluated server-side. There is no
//! section taxonomy to filter on, so the category dimension is left to the
//! aggregator; an article's category is the name of the outlet that
//! published it.
//!
//! NewsAPI replaces articles pulled by the publisher with a `"[Removed]"`
//! tombstone; those never make it into a batch.

use super::{normalize_all, Batch, Capabilities, FilterSupport, NewsProvider};
use crate::api::{HttpClient, ProviderError};
use crate::config::ProviderConfig;
use crate::models::{Query, RawArticle, Source};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

const REMOVED: &str = "[Removed]";

/// Search term sent when the query has none; the endpoint requires one.
const FALLBACK_TERM: &str = "news";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HeadlineResponse {
    status: String,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<HeadlineItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HeadlineItem {
    source: Option<Outlet>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Outlet {
    name: Option<String>,
}

impl HeadlineItem {
    fn into_raw(self) -> RawArticle {
        RawArticle {
            native_id: self.url.clone(),
            title: self.title,
            description: self.description,
            image_url: self.url_to_image,
            published_at: self.published_at,
            url: self.url,
            author: self.author,
            category: self.source.and_then(|s| s.name),
            ..RawArticle::new(Source::GenericHeadline)
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenericHeadlineAdapter {
    config: ProviderConfig,
    http: HttpClient,
}

impl GenericHeadlineAdapter {
    pub fn new(config: ProviderConfig, http: HttpClient) -> Self {
        Self { config, http }
    }

    fn params(&self, query: &Query) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", query.term().unwrap_or(FALLBACK_TERM).to_string()),
            ("language", "en".to_string()),
            ("page", query.page.to_string()),
            ("pageSize", query.page_size.to_string()),
            ("apiKey", self.config.api_key.clone()),
        ];
        if let Some(from) = query.from_date {
            params.push(("from", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = query.to_date {
            params.push(("to", to.format("%Y-%m-%d").to_string()));
        }
        params
    }
}

#[async_trait]
impl NewsProvider for GenericHeadlineAdapter {
    fn source(&self) -> Source {
        Source::GenericHeadline
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            server_side: FilterSupport { term: true, date: true, category: false },
            server_side_pagination: true,
        }
    }

    #[instrument(level = "info", skip_all, fields(page = query.page))]
    async fn try_fetch(&self, query: &Query) -> Result<Batch, ProviderError> {
        let response: HeadlineResponse = self.http.get_json(&self.config.base_url, &self.params(query)).await?;
        if response.status != "ok" {
            return Err(ProviderError::Upstream(
                response.message.unwrap_or_else(|| response.status.clone()),
            ));
        }

        let upstream_count = response.articles.len();
        let raws = response
            .articles
            .into_iter()
            .filter(|item| item.title.as_deref() != Some(REMOVED))
            .map(HeadlineItem::into_raw)
            .collect();

        Ok(Batch {
            articles: normalize_all(Source::GenericHeadline, raws),
            may_have_more: upstream_count >= query.page_size as usize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GENERAL_CATEGORY, UNKNOWN_AUTHOR};
    use chrono::NaiveDate;
    use mockito::Matcher;
    use std::time::Duration;

    const BODY: &str = r#"{
        "status": "ok",
        "totalResults": 3,
        "articles": [
            {
                "source": {"id": "bbc-news", "name": "BBC News"},
                "author": "Laura Kuenssberg",
                "title": "Election night live",
                "description": "Polls have closed.",
                "url": "https://www.bbc.co.uk/news/live/1",
                "urlToImage": "https://ichef.bbci.co.uk/1.jpg",
                "publishedAt": "2025-05-06T22:00:00Z",
                "content": "..."
            },
            {
                "source": {"id": null, "name": null},
                "author": null,
                "title": "Markets steady",
                "description": null,
                "url": "https://example.com/markets",
                "urlToImage": null,
                "publishedAt": "2025-05-06T20:00:00Z"
            },
            {
                "source": {"id": null, "name": "[Removed]"},
                "author": null,
                "title": "[Removed]",
                "description": "[Removed]",
                "url": "https://removed.com",
                "urlToImage": null,
                "publishedAt": "1970-01-01T00:00:00Z"
            }
        ]
    }"#;

    fn adapter(base_url: String) -> GenericHeadlineAdapter {
        let http = HttpClient::new(Duration::from_secs(5), "test").unwrap();
        GenericHeadlineAdapter::new(ProviderConfig::new(base_url, "news-key"), http)
    }

    #[tokio::test]
    async fn test_maps_articles_and_drops_tombstones() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v2/everything")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(BODY)
            .create_async()
            .await;

        let batch = adapter(format!("{}/v2/everything", server.url()))
            .try_fetch(&Query { page_size: 3, ..Query::default() })
            .await
            .unwrap();

        assert_eq!(batch.articles.len(), 2);
        assert!(batch.may_have_more);

        let first = &batch.articles[0];
        assert_eq!(first.id(), "GenericHeadline:https://www.bbc.co.uk/news/live/1");
        assert_eq!(first.source(), Source::GenericHeadline);
        assert_eq!(first.category(), "BBC News");
        assert_eq!(first.author(), "Laura Kuenssberg");
        assert_eq!(first.image_url(), Some("https://ichef.bbci.co.uk/1.jpg"));
        assert_eq!(first.video_url(), None);

        let second = &batch.articles[1];
        assert_eq!(second.category(), GENERAL_CATEGORY);
        assert_eq!(second.author(), UNKNOWN_AUTHOR);
        assert_eq!(second.description(), "");
    }

    #[tokio::test]
    async fn test_sends_server_side_filters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v2/everything")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "election".into()),
                Matcher::UrlEncoded("from".into(), "2025-05-01".into()),
                Matcher::UrlEncoded("to".into(), "2025-05-06".into()),
                Matcher::UrlEncoded("page".into(), "2".into()),
                Matcher::UrlEncoded("pageSize".into(), "20".into()),
                Matcher::UrlEncoded("apiKey".into(), "news-key".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"status":"ok","totalResults":0,"articles":[]}"#)
            .create_async()
            .await;

        let query = Query {
            term: Some("election".to_string()),
            from_date: NaiveDate::from_ymd_opt(2025, 5, 1),
            to_date: NaiveDate::from_ymd_opt(2025, 5, 6),
            page: 2,
            ..Query::default()
        };
        let batch = adapter(format!("{}/v2/everything", server.url()))
            .try_fetch(&query)
            .await
            .unwrap();

        assert!(batch.articles.is_empty());
        assert!(!batch.may_have_more);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_term_falls_back() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v2/everything")
            .match_query(Matcher::UrlEncoded("q".into(), "news".into()))
            .with_status(200)
            .with_body(r#"{"status":"ok","articles":[]}"#)
            .create_async()
            .await;

        adapter(format!("{}/v2/everything", server.url()))
            .try_fetch(&Query::default())
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_in_band_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v2/everything")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid."}"#)
            .create_async()
            .await;

        let result = adapter(format!("{}/v2/everything", server.url()))
            .try_fetch(&Query::default())
            .await;
        assert!(matches!(result, Err(ProviderError::Upstream(msg)) if msg.contains("invalid")));
    }

    #[tokio::test]
    async fn test_fetch_fails_soft_on_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v2/everything")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let batch = adapter(format!("{}/v2/everything", server.url()))
            .fetch(&Query::default())
            .await;
        assert_eq!(batch, Batch::default());
    }
}
