//! Publisher B adapter backed by the New York Times Top Stories feed.
//!
//! # Upstream contract
//!
//! The feed is fixed: one request returns the complete current list of top
//! stories, with no search, date or paging parameters. Every page therefore
//! re-downloads the whole feed, filters it in process and slices
//! `(page-1)*pageSize .. page*pageSize`.
//!
//! Because the slice is over *this feed only*, page `n` here is not aligned
//! with page `n` of the offset-paginated providers. That divergence is part
//! of the contract, not something to paper over.

use super::{apply_local_filters, local_page, normalize_all, Batch, Capabilities, NewsProvider};
use crate::api::{HttpClient, ProviderError};
use crate::config::ProviderConfig;
use crate::models::{Query, RawArticle, Source};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct TopStories {
    status: String,
    #[serde(default)]
    results: Vec<Story>,
}

#[derive(Debug, Deserialize)]
struct Story {
    section: Option<String>,
    title: Option<String>,
    #[serde(rename = "abstract")]
    summary: Option<String>,
    url: Option<String>,
    byline: Option<String>,
    published_date: Option<String>,
    // The feed sends `null` rather than `[]` for stories without media.
    multimedia: Option<Vec<Media>>,
}

#[derive(Debug, Deserialize)]
struct Media {
    url: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl Story {
    fn media_of_kind(&self, kind: &str) -> Option<String> {
        self.multimedia
            .iter()
            .flatten()
            .find(|m| m.kind.as_deref() == Some(kind))
            .and_then(|m| m.url.clone())
    }

    fn into_raw(self) -> RawArticle {
        RawArticle {
            native_id: self.url.clone(),
            image_url: self.media_of_kind("image"),
            video_url: self.media_of_kind("video"),
            title: self.title,
            description: self.summary,
            published_at: self.published_date,
            url: self.url,
            author: self.byline,
            category: self.section,
            ..RawArticle::new(Source::PublisherB)
        }
    }
}

#[derive(Debug, Clone)]
pub struct PublisherBAdapter {
    config: ProviderConfig,
    http: HttpClient,
}

impl PublisherBAdapter {
    pub fn new(config: ProviderConfig, http: HttpClient) -> Self {
        Self { config, http }
    }
}

#[async_trait]
impl NewsProvider for PublisherBAdapter {
    fn source(&self) -> Source {
        Source::PublisherB
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    #[instrument(level = "info", skip_all, fields(page = query.page))]
    async fn try_fetch(&self, query: &Query) -> Result<Batch, ProviderError> {
        let params = [("api-key", self.config.api_key.clone())];
        let feed: TopStories = self.http.get_json(&self.config.base_url, &params).await?;
        if feed.status != "OK" {
            return Err(ProviderError::Upstream(feed.status));
        }

        let feed_len = feed.results.len();
        let raws = feed.results.into_iter().map(Story::into_raw).collect();
        let articles = normalize_all(Source::PublisherB, raws);
        let matching = apply_local_filters(articles, query, &self.capabilities());
        debug!(feed_len, matching = matching.len(), "Filtered top stories in process");

        Ok(local_page(matching, query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GENERAL_CATEGORY;
    use mockito::Matcher;
    use serde_json::json;
    use std::time::Duration;

    fn story(i: usize, title: &str, day: u32) -> serde_json::Value {
        let section = if i % 2 == 0 { "us" } else { "" };
        let multimedia = if i == 0 {
            json!([
                {"url": "https://static01.nyt.com/clip.mp4", "type": "video", "format": "mp4"},
                {"url": "https://static01.nyt.com/big.jpg", "type": "image", "format": "Super Jumbo"}
            ])
        } else {
            serde_json::Value::Null
        };
        json!({
            "section": section,
            "subsection": "politics",
            "title": title,
            "abstract": format!("Abstract {i}"),
            "url": format!("https://www.nytimes.com/2025/05/{day:02}/story-{i}.html"),
            "byline": format!("By Reporter {i}"),
            "published_date": format!("2025-05-{day:02}T05:00:24-04:00"),
            "multimedia": multimedia
        })
    }

    fn feed(stories: Vec<serde_json::Value>) -> String {
        json!({
            "status": "OK",
            "section": "home",
            "num_results": stories.len(),
            "results": stories
        })
        .to_string()
    }

    fn adapter(base_url: String) -> PublisherBAdapter {
        let http = HttpClient::new(Duration::from_secs(5), "test").unwrap();
        PublisherBAdapter::new(ProviderConfig::new(base_url, "nyt-key"), http)
    }

    async fn serve(server: &mut mockito::ServerGuard, body: String) -> mockito::Mock {
        server
            .mock("GET", "/home.json")
            .match_query(Matcher::UrlEncoded("api-key".into(), "nyt-key".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_maps_stories() {
        let mut server = mockito::Server::new_async().await;
        let mock = serve(&mut server, feed(vec![story(0, "Senate vote", 6), story(1, "Storm", 6)])).await;

        let batch = adapter(format!("{}/home.json", server.url()))
            .try_fetch(&Query::default())
            .await
            .unwrap();

        assert_eq!(batch.articles.len(), 2);
        let first = &batch.articles[0];
        assert_eq!(first.id(), "PublisherB:https://www.nytimes.com/2025/05/06/story-0.html");
        assert_eq!(first.description(), "Abstract 0");
        assert_eq!(first.author(), "By Reporter 0");
        assert_eq!(first.category(), "us");
        assert_eq!(first.image_url(), Some("https://static01.nyt.com/big.jpg"));
        assert_eq!(first.video_url(), Some("https://static01.nyt.com/clip.mp4"));
        assert_eq!(first.published_at().to_rfc3339(), "2025-05-06T09:00:24+00:00");

        let second = &batch.articles[1];
        assert_eq!(second.category(), GENERAL_CATEGORY);
        assert_eq!(second.image_url(), None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_filters_and_slices_in_process() {
        let mut server = mockito::Server::new_async().await;
        let stories = (0..30)
            .map(|i| {
                let title = if i % 3 == 0 { format!("Election update {i}") } else { format!("Other {i}") };
                story(i, &title, 6)
            })
            .collect();
        let _mock = serve(&mut server, feed(stories)).await;
        let provider = adapter(format!("{}/home.json", server.url()));

        // 10 of 30 stories mention the election.
        let query = Query { term: Some("ELECTION".to_string()), page_size: 4, ..Query::default() };
        let page1 = provider.try_fetch(&query).await.unwrap();
        let page3 = provider.try_fetch(&query.with_page(3)).await.unwrap();
        let page4 = provider.try_fetch(&query.with_page(4)).await.unwrap();

        assert_eq!(page1.articles.len(), 4);
        assert!(page1.may_have_more);
        assert!(page1.articles[0].title().starts_with("Election update 0"));
        assert_eq!(page3.articles.len(), 2);
        assert!(!page3.may_have_more);
        assert!(page4.articles.is_empty());
    }

    #[tokio::test]
    async fn test_date_range_applied_in_process() {
        let mut server = mockito::Server::new_async().await;
        let _mock = serve(&mut server, feed(vec![story(0, "Old", 1), story(1, "New", 6)])).await;

        let query = Query {
            from_date: chrono::NaiveDate::from_ymd_opt(2025, 5, 5),
            ..Query::default()
        };
        let batch = adapter(format!("{}/home.json", server.url()))
            .try_fetch(&query)
            .await
            .unwrap();

        assert_eq!(batch.articles.len(), 1);
        assert_eq!(batch.articles[0].title(), "New");
    }

    #[tokio::test]
    async fn test_date_range_uses_feed_calendar_day() {
        let mut server = mockito::Server::new_async().await;
        let mut evening = story(0, "Late vote count", 6);
        evening["published_date"] = json!("2025-05-06T21:00:00-04:00");
        let _mock = serve(&mut server, feed(vec![evening, story(1, "Next morning", 7)])).await;

        let may_6 = chrono::NaiveDate::from_ymd_opt(2025, 5, 6);
        let query = Query { from_date: may_6, to_date: may_6, ..Query::default() };
        let batch = adapter(format!("{}/home.json", server.url()))
            .try_fetch(&query)
            .await
            .unwrap();

        assert_eq!(batch.articles.len(), 1);
        assert_eq!(batch.articles[0].title(), "Late vote count");
    }

    #[tokio::test]
    async fn test_transport_failure_fails_soft() {
        // Nothing listens on this port.
        let provider = adapter("http://127.0.0.1:9/home.json".to_string());
        assert!(matches!(
            provider.try_fetch(&Query::default()).await,
            Err(ProviderError::Transport(_))
        ));
        assert!(provider.fetch(&Query::default()).await.articles.is_empty());
    }
}
