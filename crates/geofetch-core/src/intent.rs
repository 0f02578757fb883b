//! State-mutation intents.
//!
//! Components never touch the store directly: they produce `StateIntent`
//! values and an [`IntentSink`](crate::IntentSink) applies them.

use crate::types::{Issue, LocationFetchType, LocationUiState};

#[derive(Debug, Clone, PartialEq)]
pub enum StateIntent {
    /// The service-normalized city for the current address.
    SetCachedCity(String),
    /// The raw address or `"lat lon"` string that was looked up.
    SetLocation(String),
    SetSplitDistrict(bool),
    SetLocationFetchType(LocationFetchType),
    SetUiState(LocationUiState),
    SetIssues(Vec<Issue>),
    SetGroupIssues { issues: Vec<Issue>, group_id: String },
    SetCallCount(u64),
    ClearContactIndexes,
}

impl StateIntent {
    /// Short name used in log fields and printed journals.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            StateIntent::SetCachedCity(_) => "set_cached_city",
            StateIntent::SetLocation(_) => "set_location",
            StateIntent::SetSplitDistrict(_) => "set_split_district",
            StateIntent::SetLocationFetchType(_) => "set_location_fetch_type",
            StateIntent::SetUiState(_) => "set_ui_state",
            StateIntent::SetIssues(_) => "set_issues",
            StateIntent::SetGroupIssues { .. } => "set_group_issues",
            StateIntent::SetCallCount(_) => "set_call_count",
            StateIntent::ClearContactIndexes => "clear_contact_indexes",
        }
    }
}
