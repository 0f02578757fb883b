//! HTTP client for the issues service.
//!
//! Wraps `reqwest` with typed response deserialization for the three
//! endpoints the resolver depends on: issues by address, group issues by
//! address, and the global call count.

use std::time::Duration;

use geofetch_core::{CallCount, IssueService, IssuesResponse, SourceError};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::ClientError;

/// Client for the issues service rooted at a configurable base URL.
pub struct IssuesClient {
    client: Client,
    base_url: Url,
}

impl IssuesClient {
    /// Creates a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidBaseUrl`] if
    /// `base_url` is not an absolute http(s) URL.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise to exactly one trailing slash so path segments are
        // appended below the base rather than replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: "expected an absolute http(s) URL".to_owned(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Fetches the issue list for `address`. An empty address is sent as-is;
    /// the service answers it with its location-less default set.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure or non-2xx HTTP status.
    /// - [`ClientError::Deserialize`] if the body does not match [`IssuesResponse`].
    pub async fn issues(&self, address: &str) -> Result<IssuesResponse, ClientError> {
        let url = self.build_url(&["issues"], &[("address", address)])?;
        self.request_json(&url).await
    }

    /// Fetches the issue list of one group for `address`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure or non-2xx HTTP status.
    /// - [`ClientError::Deserialize`] if the body does not match [`IssuesResponse`].
    pub async fn group_issues(
        &self,
        group_id: &str,
        address: &str,
    ) -> Result<IssuesResponse, ClientError> {
        let url = self.build_url(&["groups", group_id, "issues"], &[("address", address)])?;
        self.request_json(&url).await
    }

    /// Fetches the global call counter.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure or non-2xx HTTP status.
    /// - [`ClientError::Deserialize`] if the body does not match [`CallCount`].
    pub async fn count(&self) -> Result<CallCount, ClientError> {
        let url = self.build_url(&["counts"], &[])?;
        self.request_json(&url).await
    }

    /// Appends percent-encoded path segments and query parameters to the base URL.
    fn build_url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot be a base".to_owned(),
            })?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends a GET request, asserts a 2xx HTTP status, and parses the body as JSON.
    async fn request_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, ClientError> {
        tracing::debug!(path = url.path(), "issues service request");
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
            context: url.path().to_owned(),
            source: e,
        })
    }
}

impl IssueService for IssuesClient {
    async fn issues_by_address(&self, address: &str) -> Result<IssuesResponse, SourceError> {
        Ok(self.issues(address).await?)
    }

    async fn group_issues(
        &self,
        group_id: &str,
        address: &str,
    ) -> Result<IssuesResponse, SourceError> {
        Ok(IssuesClient::group_issues(self, group_id, address).await?)
    }

    async fn call_count(&self) -> Result<CallCount, SourceError> {
        Ok(self.count().await?)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
