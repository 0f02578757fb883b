//! IP-based geolocation via an ipinfo-style JSON endpoint.

use std::time::Duration;

use geofetch_core::{IpGeolocation, IpInfo, SourceError};
use reqwest::{Client, Url};

use crate::error::ClientError;

/// Looks up the caller's approximate position from its public IP address.
pub struct IpInfoClient {
    client: Client,
    url: Url,
}

impl IpInfoClient {
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ClientError::InvalidBaseUrl`] if `url` does not parse.
    pub fn with_url(url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        let url = Url::parse(url).map_err(|e| ClientError::InvalidBaseUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self { client, url })
    }

    /// Fetches the `loc` field for the current public IP.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure or non-2xx HTTP status.
    /// - [`ClientError::Deserialize`] if the body has no string `loc` field.
    pub async fn locate(&self) -> Result<IpInfo, ClientError> {
        let response = self
            .client
            .get(self.url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
            context: self.url.to_string(),
            source: e,
        })
    }
}

impl IpGeolocation for IpInfoClient {
    async fn lookup(&self) -> Result<IpInfo, SourceError> {
        Ok(self.locate().await?)
    }
}
