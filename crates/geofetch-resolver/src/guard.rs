//! Dedup check deciding whether an issue fetch would be redundant.

use geofetch_core::CachedRemoteState;

/// The fetch a caller is about to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchRequest<'a> {
    AllIssues {
        address_available: bool,
    },
    GroupIssues {
        group_id: &'a str,
        address_available: bool,
    },
}

/// Returns `true` when `request` is not already satisfied by `cached`.
///
/// Without an available address the answer is always `false`: there is
/// nothing to fetch with.
#[must_use]
pub fn needs_fetch(cached: &CachedRemoteState, request: &FetchRequest<'_>) -> bool {
    match *request {
        FetchRequest::AllIssues { address_available } => {
            address_available && cached.issues.is_empty()
        }
        FetchRequest::GroupIssues {
            group_id,
            address_available,
        } => {
            address_available
                && (cached.group_issues.is_empty()
                    || cached.current_group_id.as_deref() != Some(group_id))
        }
    }
}
