//! Client for the reading and ephemeris collaborators.
//!
//! Neither is required to render: callers wrap each fetch in
//! [`fetch_or_default`], which turns any failure into the type's default
//! value and a warning.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::ephemeris::EphemerisSnapshot;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("invalid upstream base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream answered {0}")]
    Status(StatusCode),
}

/// Reading metadata. Only the title is used; other fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: Url,
}

impl UpstreamClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let parsed = Url::parse(base_url).map_err(|err| UpstreamError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: err.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(UpstreamError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "not a hierarchical URL".to_string(),
            });
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/v1/{resource}/{date}`, with the date percent-encoded as one segment.
    fn endpoint(&self, resource: &str, date: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["v1", resource, date]);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, UpstreamError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }
        Ok(response.json::<T>().await?)
    }

    pub async fn fetch_reading(&self, date: &str) -> Result<Reading, UpstreamError> {
        self.get_json(self.endpoint("reading", date)).await
    }

    pub async fn fetch_ephemeris(&self, date: &str) -> Result<EphemerisSnapshot, UpstreamError> {
        self.get_json(self.endpoint("ephemeris", date)).await
    }
}

/// Awaits `fetch`, substituting `T::default()` on failure.
pub async fn fetch_or_default<T, F>(collaborator: &'static str, date: &str, fetch: F) -> T
where
    T: Default,
    F: Future<Output = Result<T, UpstreamError>>,
{
    match fetch.await {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(collaborator, date, error = %err, "upstream unavailable, using default");
            T::default()
        }
    }
}
