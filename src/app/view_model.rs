//! Transforms controller state into the `UiState` view model consumed by the
//! frontend.

use serde::Serialize;

use crate::core::{FileChange, FileChangeGroup, GroupId};

use super::all_select::AllSelectControl;
use super::items::ItemListManager;

/// A serializable snapshot of the review workspace for the UI.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub items: Vec<ItemView>,
    /// `false` until the item list finished its first initialization; the
    /// frontend renders the list read-only until then.
    pub list_ready: bool,
    pub all_checked: bool,
    pub all_indeterminate: bool,
    pub all_select_enabled: bool,
    pub selected_groups_count: usize,
    pub selected_file_count: usize,
    pub total_groups_count: usize,
}

/// One change group row.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: GroupId,
    pub label: String,
    pub selected: bool,
    pub file_changes: Vec<FileChange>,
}

/// Builds the complete `UiState`.
///
/// Until the manager is ready the rows come straight from the feed snapshot,
/// unselected; afterwards the manager's items are authoritative.
pub fn generate_ui_state(
    groups: &[FileChangeGroup],
    manager: Option<&ItemListManager>,
    control: &AllSelectControl,
) -> UiState {
    let (items, list_ready) = match manager {
        Some(manager) if manager.ready() => (
            manager
                .items()
                .iter()
                .map(|item| ItemView {
                    id: item.identity.clone(),
                    label: item.payload.label.clone(),
                    selected: item.selected,
                    file_changes: item.payload.file_changes.clone(),
                })
                .collect::<Vec<_>>(),
            true,
        ),
        _ => (
            groups
                .iter()
                .map(|group| ItemView {
                    id: group.id.clone(),
                    label: group.label.clone(),
                    selected: false,
                    file_changes: group.file_changes.clone(),
                })
                .collect(),
            false,
        ),
    };

    let selected_groups_count = items.iter().filter(|item| item.selected).count();
    let selected_file_count = items
        .iter()
        .filter(|item| item.selected)
        .map(|item| item.file_changes.len())
        .sum();

    UiState {
        total_groups_count: items.len(),
        items,
        list_ready,
        all_checked: control.is_checked(),
        all_indeterminate: control.is_indeterminate(),
        all_select_enabled: control.is_enabled(),
        selected_groups_count,
        selected_file_count,
    }
}
