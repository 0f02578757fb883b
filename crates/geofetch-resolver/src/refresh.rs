//! On-demand issue refresh for views opened directly (deep links), guarded
//! against refetching what is already cached.

use geofetch_core::{IntentSink, IssueService, LocationFetchType, StateIntent, StateReader};

use crate::fetcher::{FetchStatus, IssueFetcher};
use crate::guard::{needs_fetch, FetchRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The guard found nothing to do.
    Skipped,
    Fetched(FetchStatus),
}

/// Fetches all issues for the cached address unless they are already cached
/// or no address is known.
pub async fn issues_if_needed<S: IssueService>(
    fetcher: &IssueFetcher<S>,
    reader: &dyn StateReader,
    sink: &dyn IntentSink,
) -> RefreshOutcome {
    let address = reader.address();
    let request = FetchRequest::AllIssues {
        address_available: !address.is_empty(),
    };
    if !needs_fetch(&reader.remote_snapshot(), &request) {
        tracing::debug!("issues already cached or no address; skipping refresh");
        return RefreshOutcome::Skipped;
    }

    let outcome = fetcher.fetch_for_address(&address).await;
    sink.apply_all(outcome.intents);
    sink.apply(StateIntent::SetLocationFetchType(LocationFetchType::CachedAddress));
    RefreshOutcome::Fetched(outcome.status)
}

/// Fetches `group_id`'s issues for the cached address unless that group's
/// issues are already cached or no address is known.
pub async fn group_issues_if_needed<S: IssueService>(
    fetcher: &IssueFetcher<S>,
    reader: &dyn StateReader,
    sink: &dyn IntentSink,
    group_id: &str,
) -> RefreshOutcome {
    let address = reader.address();
    let request = FetchRequest::GroupIssues {
        group_id,
        address_available: !address.is_empty(),
    };
    if !needs_fetch(&reader.remote_snapshot(), &request) {
        tracing::debug!(
            group_id,
            "group issues already cached or no address; skipping refresh"
        );
        return RefreshOutcome::Skipped;
    }

    let outcome = fetcher.fetch_group_for_address(group_id, &address).await;
    sink.apply_all(outcome.intents);
    RefreshOutcome::Fetched(outcome.status)
}
