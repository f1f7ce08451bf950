//! HTTP Client Module
//!
//! Fetches values from a single remote peer.

use std::time::Duration;

use bytes::Bytes;
use futures_util::future::{BoxFuture, FutureExt};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::peers::PeerGetter;

// == HTTP Getter ==
/// Client bound to one peer's base URL.
#[derive(Debug, Clone)]
pub struct HttpGetter {
    /// Peer address followed by the base path, e.g. `http://10.0.0.2:8008/_geecache/`
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpGetter {
    // == Constructor ==
    /// Creates a client for `base_url`.
    ///
    /// # Arguments
    /// * `base_url` - Peer address joined with the base path
    /// * `client` - Shared connection pool
    /// * `timeout` - Upper bound for one fetch, body included
    pub fn new(base_url: impl Into<String>, client: reqwest::Client, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            client,
            timeout,
        }
    }

    // == URL ==
    /// Builds the request URL for a namespace and key.
    pub fn url_for(&self, group: &str, key: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            utf8_percent_encode(group, NON_ALPHANUMERIC),
            utf8_percent_encode(key, NON_ALPHANUMERIC)
        )
    }

    // == Fetch ==
    /// Requests `key` from the peer's `group`.
    ///
    /// Transport errors, timeouts, non-success statuses and body read
    /// failures all come back as [`CacheError::Peer`].
    pub async fn fetch(&self, group: &str, key: &str) -> Result<Bytes> {
        let url = self.url_for(group, key);
        debug!("Fetching {} from peer", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| CacheError::Peer(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CacheError::Peer(format!("server returned: {}", status)));
        }

        response
            .bytes()
            .await
            .map_err(|e| CacheError::Peer(format!("reading response body: {}", e)))
    }
}

impl PeerGetter for HttpGetter {
    fn get<'a>(&'a self, group: &'a str, key: &'a str) -> BoxFuture<'a, Result<Bytes>> {
        self.fetch(group, key).boxed()
    }
}
