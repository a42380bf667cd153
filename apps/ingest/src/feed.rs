// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Footprint feed download.

use footprints_core::{decode_feed, FeedBatch, FetchError};
use std::time::Duration;

/// HTTP client for the footprint feed.
pub struct FeedClient {
    url: String,
    limit: Option<u32>,
    http: reqwest::Client,
}

impl FeedClient {
    pub fn new(url: &str, limit: Option<u32>, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("footprints-ingest/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Fetch(format!("HTTP client setup failed: {e}")))?;

        Ok(Self {
            url: url.to_string(),
            limit,
            http,
        })
    }

    /// GET the feed, read the whole body and decode it.
    ///
    /// A network failure or non-success status is [`FetchError::Fetch`], a
    /// truncated body [`FetchError::Read`], a body that is not a JSON array
    /// [`FetchError::Decode`]. Nothing is retried.
    pub async fn fetch(&self) -> Result<FeedBatch, FetchError> {
        let mut request = self.http.get(&self.url);
        if let Some(limit) = self.limit {
            request = request.query(&[("$limit", limit)]);
        }

        tracing::info!(url = %self.url, limit = ?self.limit, "Fetching footprint feed");

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Fetch(format!(
                "feed responded with status {status}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Read(e.to_string()))?;
        tracing::debug!(size = body.len(), "Feed body read");

        decode_feed(&body)
    }
}
