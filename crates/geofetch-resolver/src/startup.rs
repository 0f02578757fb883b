//! Application startup sequence.

use geofetch_core::{
    DeviceGeolocation, IpGeolocation, IssueService, LocationFetchType, LocationUiState,
    StateIntent,
};
use percent_encoding::percent_decode_str;

use crate::fetcher::FetchStatus;
use crate::resolver::{LocationResolver, ResolutionOutcome};

/// Query-string key that forces the address and bypasses geolocation.
pub const FORCE_ADDRESS_KEY: &str = "forceAddress";

/// Which path the location branch of startup took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupLocation {
    /// An address was already known (cached or forced) and fetched directly.
    CachedAddress { address: String, fetch: FetchStatus },
    /// No address was known; the resolver ran.
    Resolved(ResolutionOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupReport {
    pub location: StartupLocation,
    /// `None` when the call-count refresh failed.
    pub call_count: Option<u64>,
}

pub struct StartupOrchestrator<D, I, S> {
    resolver: LocationResolver<D, I, S>,
}

impl<D, I, S> StartupOrchestrator<D, I, S>
where
    D: DeviceGeolocation,
    I: IpGeolocation,
    S: IssueService,
{
    pub fn new(resolver: LocationResolver<D, I, S>) -> Self {
        Self { resolver }
    }

    /// Runs the startup sequence.
    ///
    /// `query` is the raw startup query string, if any. The location branch
    /// and the call-count refresh run concurrently; neither one's failure
    /// affects the other, and both have finished when this returns.
    pub async fn run(&self, query: Option<&str>) -> StartupReport {
        let sink = self.resolver.sink();

        refresh_donations();
        sink.apply(StateIntent::SetUiState(LocationUiState::FetchingLocation));
        sink.apply(StateIntent::ClearContactIndexes);

        if let Some(address) = query.and_then(force_address_from_query) {
            tracing::info!(address = %address, "address forced by startup query");
            sink.apply(StateIntent::SetLocation(address));
            sink.apply(StateIntent::SetCachedCity(String::new()));
        }

        let (location, call_count) = tokio::join!(self.locate(), self.refresh_call_count());
        StartupReport {
            location,
            call_count,
        }
    }

    async fn locate(&self) -> StartupLocation {
        let address = self.resolver.reader().address();
        if address.is_empty() {
            return StartupLocation::Resolved(self.resolver.resolve().await);
        }

        tracing::debug!(address = %address, "using cached address");
        let outcome = self.resolver.fetcher().fetch_for_address(&address).await;
        let sink = self.resolver.sink();
        sink.apply_all(outcome.intents);
        sink.apply(StateIntent::SetLocationFetchType(LocationFetchType::CachedAddress));
        StartupLocation::CachedAddress {
            address,
            fetch: outcome.status,
        }
    }

    async fn refresh_call_count(&self) -> Option<u64> {
        let count = self.resolver.fetcher().fetch_call_count().await?;
        self.resolver.sink().apply(StateIntent::SetCallCount(count));
        Some(count)
    }
}

/// Donations are not tracked; the refresh stays a no-op.
fn refresh_donations() {
    tracing::debug!("donations refresh is disabled");
}

/// Extracts the `forceAddress` override from a startup query string.
///
/// Keys and values are percent-decoded, with `+` read as a space. A leading
/// `?` is ignored. When the key repeats, the last occurrence wins. Empty
/// values are treated as absent.
#[must_use]
pub fn force_address_from_query(query: &str) -> Option<String> {
    query
        .trim_start_matches('?')
        .split('&')
        .rev()
        .find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key) == FORCE_ADDRESS_KEY).then(|| decode_component(value))
        })
        .filter(|value| !value.trim().is_empty())
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}
