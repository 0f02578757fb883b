//! Collaborator contracts consumed by the resolver.
//!
//! The HTTP adapters in `geofetch-client` implement the remote-service
//! traits; the store implements [`IntentSink`] and [`StateReader`].

use std::future::Future;

use thiserror::Error;

use crate::intent::StateIntent;
use crate::types::{
    CachedRemoteState, CallCount, Coordinates, IpInfo, IssuesResponse, LocationFetchType,
};

/// Failure reported by any external collaborator.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The capability does not exist in this environment.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// The user or platform refused access.
    #[error("permission denied")]
    Denied,

    /// The request was made but failed in transit or at the remote end.
    #[error("request failed: {0}")]
    Request(String),

    /// The remote end answered with something that could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Device-provided position. No built-in timeout; the resolver supplies one.
pub trait DeviceGeolocation: Send + Sync {
    fn current_position(&self) -> impl Future<Output = Result<Coordinates, SourceError>> + Send;
}

/// IP-based position lookup.
pub trait IpGeolocation: Send + Sync {
    fn lookup(&self) -> impl Future<Output = Result<IpInfo, SourceError>> + Send;
}

/// The remote issues service. `address` may be empty.
pub trait IssueService: Send + Sync {
    fn issues_by_address(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<IssuesResponse, SourceError>> + Send;

    fn group_issues(
        &self,
        group_id: &str,
        address: &str,
    ) -> impl Future<Output = Result<IssuesResponse, SourceError>> + Send;

    fn call_count(&self) -> impl Future<Output = Result<CallCount, SourceError>> + Send;
}

/// One-way sink for state mutations.
pub trait IntentSink: Send + Sync {
    fn apply(&self, intent: StateIntent);

    fn apply_all(&self, intents: Vec<StateIntent>) {
        for intent in intents {
            self.apply(intent);
        }
    }
}

/// Read-only view of the current application state.
pub trait StateReader: Send + Sync {
    /// The cached address; empty when none is known.
    fn address(&self) -> String;

    fn location_fetch_type(&self) -> LocationFetchType;

    fn remote_snapshot(&self) -> CachedRemoteState;
}
