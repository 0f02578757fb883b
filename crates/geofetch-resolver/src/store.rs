//! In-memory application state that applies intents as they arrive.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use geofetch_core::{
    CachedRemoteState, IntentSink, Issue, LocationFetchType, LocationUiState, StateIntent,
    StateReader,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub address: String,
    pub cached_city: String,
    pub split_district: bool,
    pub location_fetch_type: LocationFetchType,
    pub ui_state: LocationUiState,
    pub issues: Vec<Issue>,
    pub group_issues: Vec<Issue>,
    pub current_group_id: Option<String>,
    pub call_count: Option<u64>,
    /// Per-issue index of the next contact to call.
    pub contact_indexes: HashMap<String, usize>,
}

impl AppState {
    fn apply(&mut self, intent: &StateIntent) {
        match intent {
            StateIntent::SetCachedCity(city) => self.cached_city.clone_from(city),
            StateIntent::SetLocation(address) => self.address.clone_from(address),
            StateIntent::SetSplitDistrict(split) => self.split_district = *split,
            StateIntent::SetLocationFetchType(kind) => self.location_fetch_type = *kind,
            StateIntent::SetUiState(ui) => self.ui_state = *ui,
            StateIntent::SetIssues(issues) => self.issues.clone_from(issues),
            StateIntent::SetGroupIssues { issues, group_id } => {
                self.group_issues.clone_from(issues);
                self.current_group_id = Some(group_id.clone());
            }
            StateIntent::SetCallCount(count) => self.call_count = Some(*count),
            StateIntent::ClearContactIndexes => self.contact_indexes.clear(),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: AppState,
    journal: Vec<StateIntent>,
}

/// Store backing the CLI and the tests. Keeps every applied intent, in
/// order, next to the resulting state.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from previously persisted state, with an empty journal.
    #[must_use]
    pub fn with_state(state: AppState) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state,
                journal: Vec::new(),
            }),
        }
    }

    #[must_use]
    pub fn state(&self) -> AppState {
        self.lock().state.clone()
    }

    #[must_use]
    pub fn journal(&self) -> Vec<StateIntent> {
        self.lock().journal.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IntentSink for MemoryStore {
    fn apply(&self, intent: StateIntent) {
        tracing::trace!(intent = intent.kind(), "applying intent");
        let mut inner = self.lock();
        inner.state.apply(&intent);
        inner.journal.push(intent);
    }
}

impl StateReader for MemoryStore {
    fn address(&self) -> String {
        self.lock().state.address.clone()
    }

    fn location_fetch_type(&self) -> LocationFetchType {
        self.lock().state.location_fetch_type
    }

    fn remote_snapshot(&self) -> CachedRemoteState {
        let inner = self.lock();
        CachedRemoteState {
            issues: inner.state.issues.clone(),
            group_issues: inner.state.group_issues.clone(),
            current_group_id: inner.state.current_group_id.clone(),
        }
    }
}
