//! Plain-text rendering of the store after a command has run.

use std::fmt::Write as _;

use geofetch_core::StateIntent;
use geofetch_resolver::AppState;

pub(crate) fn render_state(state: &AppState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "address:        {}", or_dash(&state.address));
    let _ = writeln!(out, "cached city:    {}", or_dash(&state.cached_city));
    let _ = writeln!(out, "split district: {}", state.split_district);
    let _ = writeln!(out, "fetch type:     {:?}", state.location_fetch_type);
    let _ = writeln!(out, "ui state:       {:?}", state.ui_state);
    let _ = writeln!(out, "issues:         {}", state.issues.len());
    if let Some(group_id) = &state.current_group_id {
        let _ = writeln!(
            out,
            "group issues:   {} ({group_id})",
            state.group_issues.len()
        );
    }
    match state.call_count {
        Some(count) => {
            let _ = writeln!(out, "call count:     {count}");
        }
        None => out.push_str("call count:     -\n"),
    }
    for issue in &state.issues {
        let _ = writeln!(out, "  - [{}] {}", issue.id, issue.name);
    }
    out
}

pub(crate) fn render_journal(journal: &[StateIntent]) -> String {
    let mut out = String::new();
    for (index, intent) in journal.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {}{}", index + 1, intent.kind(), detail(intent));
    }
    out
}

fn detail(intent: &StateIntent) -> String {
    match intent {
        StateIntent::SetCachedCity(value) | StateIntent::SetLocation(value) => {
            format!(" {value:?}")
        }
        StateIntent::SetSplitDistrict(split) => format!(" {split}"),
        StateIntent::SetLocationFetchType(kind) => format!(" {kind:?}"),
        StateIntent::SetUiState(ui) => format!(" {ui:?}"),
        StateIntent::SetIssues(issues) => format!(" ({} issues)", issues.len()),
        StateIntent::SetGroupIssues { issues, group_id } => {
            format!(" {group_id} ({} issues)", issues.len())
        }
        StateIntent::SetCallCount(count) => format!(" {count}"),
        StateIntent::ClearContactIndexes => String::new(),
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use geofetch_core::{LocationFetchType, LocationUiState};

    use super::*;

    #[test]
    fn journal_lines_are_numbered_with_details() {
        let rendered = render_journal(&[
            StateIntent::SetUiState(LocationUiState::FetchingLocation),
            StateIntent::SetLocation("80302".to_owned()),
            StateIntent::ClearContactIndexes,
        ]);
        assert_eq!(
            rendered,
            "  1. set_ui_state FetchingLocation\n  2. set_location \"80302\"\n  3. clear_contact_indexes\n"
        );
    }

    #[test]
    fn empty_fields_render_as_dash() {
        let rendered = render_state(&AppState {
            location_fetch_type: LocationFetchType::IpInfo,
            ..AppState::default()
        });
        assert!(rendered.contains("address:        -\n"));
        assert!(rendered.contains("fetch type:     IpInfo\n"));
        assert!(rendered.contains("call count:     -\n"));
        assert!(!rendered.contains("group issues"));
    }
}
