//! HTTP peer client.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use tracing::debug;

use super::PeerClient;
use crate::error::{CacheError, Result};

/// Builds the shared HTTP client for peer fetches.
///
/// Every request is bounded by `timeout`, including connection setup.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .map_err(|e| CacheError::Configuration(format!("failed to build HTTP client: {}", e)))
}

// == HTTP Peer Client ==
/// Fetches values from one peer over the peer protocol.
#[derive(Debug, Clone)]
pub struct HttpPeerClient {
    /// Peer address joined with the base path, e.g. `http://10.0.0.1:8001/_cache/`
    base_url: String,
    http: reqwest::Client,
}

impl HttpPeerClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `<base_url><group>/<key>`, both segments percent-escaped.
    pub fn url_for(&self, group: &str, key: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            urlencoding::encode(group),
            urlencoding::encode(key)
        )
    }
}

#[async_trait]
impl PeerClient for HttpPeerClient {
    async fn fetch(&self, group: &str, key: &str) -> Result<Bytes> {
        let url = self.url_for(group, key);
        debug!("Fetching {} from peer", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CacheError::NotFound(format!(
                "peer has no value for {}/{}",
                group, key
            )));
        }
        if !status.is_success() {
            return Err(CacheError::Transport(format!(
                "peer {} returned {}",
                url, status
            )));
        }

        Ok(response.bytes().await?)
    }
}
