//! Defines the event and message structures for communication between the backend and frontend.

use serde::Deserialize;

use super::dialog::DialogRequest;
use super::view_model::UiState;

/// Events sent from the Rust backend to the WebView (UI thread).
///
/// Each variant corresponds to a `window.*` function called in the frontend.
#[derive(Debug)]
pub enum UserEvent {
    /// A complete state update to re-render the review list.
    StateUpdate(Box<UiState>),
    /// Asks the frontend to present a modal dialog.
    OpenDialog(DialogRequest),
    /// The repository whose working tree is being reviewed.
    RepositoryOpened(String),
    /// An error message to be displayed to the user.
    ShowError(String),
}

/// A message received from the WebView via the IPC channel.
#[derive(Deserialize, Debug)]
pub struct IpcMessage {
    /// The name of the command to execute.
    pub command: String,
    /// The payload associated with the command, as a JSON value.
    #[serde(default)]
    pub payload: serde_json::Value,
}
