//! The application layer: state, controller wiring, IPC dispatch, events.

pub mod all_select;
pub mod commands;
pub mod controller;
pub mod dialog;
pub mod events;
pub mod feed;
pub mod file_dialog;
pub mod items;
pub mod proxy;
pub mod state;
pub mod tasks;
pub mod view_model;

use std::sync::{Arc, Mutex};

use events::{IpcMessage, UserEvent};
use file_dialog::RepositoryPicker;
use proxy::EventProxy;
use state::AppState;

/// Dispatches one IPC message from the WebView to its command handler.
pub fn handle_ipc_message<P: EventProxy>(
    message: String,
    picker: Arc<dyn RepositoryPicker>,
    proxy: P,
    state: Arc<Mutex<AppState<P>>>,
) {
    let message: IpcMessage = match serde_json::from_str(&message) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("Malformed IPC message: {e}");
            return;
        }
    };
    tracing::debug!("IPC command received: {}", message.command);

    match message.command.as_str() {
        "initialize" => commands::initialize(proxy, state),
        "toggleItem" => commands::toggle_item(message.payload, state),
        "setAllSelected" => commands::set_all_selected(message.payload, state),
        "openCommitDialog" => commands::open_commit_dialog(state),
        "closeDialog" => commands::close_dialog(message.payload, state),
        "openRepository" => commands::open_repository(picker.as_ref(), proxy, state),
        "refreshStatus" => commands::refresh_status(proxy, state),
        other => tracing::warn!("Unknown IPC command: {other}"),
    }
}

/// Applies one backend event to the WebView by calling its `window.*` hook.
pub fn handle_user_event(event: UserEvent, webview: &wry::WebView) {
    let script = match event {
        UserEvent::StateUpdate(ui_state) => match serde_json::to_string(&ui_state) {
            Ok(json) => format!("window.stateUpdate({json})"),
            Err(e) => {
                tracing::error!("Failed to serialize UI state: {e}");
                return;
            }
        },
        UserEvent::OpenDialog(request) => match serde_json::to_string(&request) {
            Ok(json) => format!("window.openDialog({json})"),
            Err(e) => {
                tracing::error!("Failed to serialize dialog request: {e}");
                return;
            }
        },
        UserEvent::RepositoryOpened(path) => match serde_json::to_string(&path) {
            Ok(json) => format!("window.repositoryOpened({json})"),
            Err(e) => {
                tracing::error!("Failed to serialize repository path: {e}");
                return;
            }
        },
        UserEvent::ShowError(message) => match serde_json::to_string(&message) {
            Ok(json) => format!("window.showError({json})"),
            Err(e) => {
                tracing::error!("Failed to serialize error message: {e}");
                return;
            }
        },
    };

    if let Err(e) = webview.evaluate_script(&script) {
        tracing::error!("Failed to push event to webview: {e}");
    }
}
