//! Issue retrieval for a resolved address, normalized into state intents.

use geofetch_core::{IssueService, IssuesResponse, LocationFetchType, LocationUiState, StateIntent};

use crate::error::ResolveError;

/// How a fetch ended. None of these is an error to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// The service answered normally and its data was turned into intents.
    Completed,
    /// The service rejected the address; only `LOCATION_ERROR` was emitted.
    InvalidAddress,
    /// Transport or decoding failure; logged, nothing emitted.
    Failed,
}

/// The intents a fetch produced, in the order they must be applied.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub status: FetchStatus,
    pub intents: Vec<StateIntent>,
}

impl FetchOutcome {
    fn failed() -> Self {
        Self {
            status: FetchStatus::Failed,
            intents: Vec::new(),
        }
    }
}

enum Target<'a> {
    All,
    Group(&'a str),
}

/// Calls the issues service and turns its answer into [`FetchOutcome`]s.
///
/// The fetcher never touches the store; callers decide whether the returned
/// intents are still wanted before applying them.
pub struct IssueFetcher<S> {
    service: S,
}

impl<S: IssueService> IssueFetcher<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// Fetches all issues for `address`. An empty address is legal and always
    /// ends with `LOCATION_ERROR` among the intents.
    pub async fn fetch_for_address(&self, address: &str) -> FetchOutcome {
        match self.service.issues_by_address(address).await {
            Ok(response) => outcome_for_response(address, response, &Target::All),
            Err(err) => {
                ResolveError::Transport(err).log("fetch_for_address");
                FetchOutcome::failed()
            }
        }
    }

    /// Same contract as [`fetch_for_address`](Self::fetch_for_address), for
    /// one group's issues.
    pub async fn fetch_group_for_address(&self, group_id: &str, address: &str) -> FetchOutcome {
        match self.service.group_issues(group_id, address).await {
            Ok(response) => outcome_for_response(address, response, &Target::Group(group_id)),
            Err(err) => {
                ResolveError::Transport(err).log("fetch_group_for_address");
                FetchOutcome::failed()
            }
        }
    }

    /// Reads the global call counter. Failure is logged and yields `None`.
    pub async fn fetch_call_count(&self) -> Option<u64> {
        match self.service.call_count().await {
            Ok(count) => Some(count.count),
            Err(err) => {
                tracing::error!(error = %err, "call count refresh failed");
                None
            }
        }
    }
}

fn outcome_for_response(
    address: &str,
    response: IssuesResponse,
    target: &Target<'_>,
) -> FetchOutcome {
    if response.invalid_address {
        ResolveError::InvalidAddress.log("issues response");
        return FetchOutcome {
            status: FetchStatus::InvalidAddress,
            intents: vec![StateIntent::SetUiState(LocationUiState::LocationError)],
        };
    }

    let mut intents = Vec::with_capacity(6);
    intents.push(StateIntent::SetCachedCity(response.normalized_location));
    intents.push(StateIntent::SetLocation(address.to_owned()));
    // An empty address means nothing usable was found, whatever the service says.
    if address.is_empty() {
        intents.push(StateIntent::SetUiState(LocationUiState::LocationError));
    }
    intents.push(StateIntent::SetSplitDistrict(response.split_district));
    intents.push(StateIntent::SetLocationFetchType(LocationFetchType::CachedAddress));
    intents.push(match target {
        Target::All => StateIntent::SetIssues(response.issues),
        Target::Group(group_id) => StateIntent::SetGroupIssues {
            issues: response.issues,
            group_id: (*group_id).to_owned(),
        },
    });

    FetchOutcome {
        status: FetchStatus::Completed,
        intents,
    }
}

#[cfg(test)]
#[path = "fetcher_test.rs"]
mod tests;
