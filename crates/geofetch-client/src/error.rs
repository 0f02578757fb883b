use geofetch_core::SourceError;
use thiserror::Error;

/// Errors returned by the HTTP adapters.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or TLS failure, or a non-2xx status, from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured base URL cannot be used to build request URLs.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<ClientError> for SourceError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Deserialize { .. } => SourceError::Malformed(err.to_string()),
            ClientError::Http(_) | ClientError::InvalidBaseUrl { .. } => {
                SourceError::Request(err.to_string())
            }
        }
    }
}
