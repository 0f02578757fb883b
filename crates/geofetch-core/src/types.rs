//! Domain types shared between the resolver, the HTTP adapters, and the store.

use serde::{Deserialize, Serialize};

/// Which strategy produced the currently-trusted location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationFetchType {
    #[default]
    None,
    BrowserGeolocation,
    IpInfo,
    CachedAddress,
}

/// UI-facing feedback about the location lookup. Written by the resolver and
/// the fetcher, never read by them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationUiState {
    #[default]
    Idle,
    FetchingLocation,
    LocationFound,
    LocationError,
}

/// One issue record as returned by the issues service.
///
/// Only the identifying fields are typed; everything else is kept verbatim
/// so the store can hand it to whatever renders it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Response body of both the issues and the group-issues endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuesResponse {
    #[serde(default)]
    pub invalid_address: bool,
    #[serde(default)]
    pub normalized_location: String,
    #[serde(default)]
    pub split_district: bool,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CallCount {
    pub count: u64,
}

/// Raw coordinates reported by a device geolocation capability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// A fix is usable when both components are finite, non-zero, and within
    /// the valid latitude/longitude ranges. A zero component is what a
    /// geolocation API hands back when it has nothing real to report.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude.abs() > f64::EPSILON
            && self.longitude.abs() > f64::EPSILON
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Formats the pair as the `"lat lon"` string the issues service accepts.
    #[must_use]
    pub fn to_location_string(&self) -> String {
        format!("{} {}", self.latitude, self.longitude)
    }
}

/// Result of an IP-based geolocation lookup. `loc` is passed through to the
/// issues service untouched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IpInfo {
    pub loc: String,
}

/// Snapshot of cached remote data consulted by the fetch guard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CachedRemoteState {
    pub issues: Vec<Issue>,
    pub group_issues: Vec<Issue>,
    pub current_group_id: Option<String>,
}
