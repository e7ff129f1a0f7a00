//! JSON-over-HTTP transport shared by every provider adapter.
//!
//! Adapters only ever need one capability from the network: issue a `GET`
//! with a list of query parameters and decode the JSON body into their own
//! response schema. [`HttpClient`] provides exactly that on top of a single
//! pooled `reqwest::Client`.
//!
//! # Failure classes
//!
//! | Variant | Cause |
//! |---------|-------|
//! | [`ProviderError::Endpoint`] | Configured base URL does not parse |
//! | [`ProviderError::Transport`] | Connect/timeout/body read failure |
//! | [`ProviderError::Status`] | Non-2xx response |
//! | [`ProviderError::Decode`] | Body is not the expected JSON shape |
//! | [`ProviderError::Upstream`] | 2xx with an in-band error status |
//!
//! Nothing here retries. Callers decide what a failure means; the adapters
//! turn every variant into an empty batch.

use crate::utils::truncate_for_log;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};
use url::Url;

/// Errors raised while talking to a provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("invalid endpoint {endpoint:?}: {source}")]
    Endpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} from {endpoint}")]
    Status { status: u16, endpoint: String },

    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("provider reported failure: {0}")]
    Upstream(String),
}

/// Thin wrapper around a shared `reqwest::Client`.
///
/// Cloning is cheap; all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Build a client with a request timeout and a user agent.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// `GET endpoint?params` and decode the JSON body as `T`.
    ///
    /// Parameter values are URL-encoded. The endpoint (without the query
    /// string, which carries credentials) is the only part that is logged.
    #[instrument(level = "info", skip_all, fields(%endpoint))]
    pub async fn get_json<T>(&self, endpoint: &str, params: &[(&str, String)]) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        let url = request_url(endpoint, params)?;

        let t0 = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        let elapsed_ms = t0.elapsed().as_millis() as u64;

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                elapsed_ms,
                body_preview = %truncate_for_log(&body, 300),
                "Provider returned non-success status"
            );
            return Err(ProviderError::Status {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            });
        }

        debug!(status = status.as_u16(), bytes = body.len(), elapsed_ms, "Provider responded");
        serde_json::from_str::<T>(&body).map_err(|e| {
            warn!(
                error = %e,
                body_preview = %truncate_for_log(&body, 300),
                "Provider body did not match expected schema"
            );
            ProviderError::Decode(e)
        })
    }
}

/// Append URL-encoded `params` to `endpoint`. No params means no `?`.
fn request_url(endpoint: &str, params: &[(&str, String)]) -> Result<Url, ProviderError> {
    let mut url = Url::parse(endpoint).map_err(|source| ProviderError::Endpoint {
        endpoint: endpoint.to_string(),
        source,
    })?;
    if !params.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
    }
    Ok(url)
}
