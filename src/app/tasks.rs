//! Background tasks: reading the repository's working tree status.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::core::{group_by_top_level, parse_porcelain, CoreError, FileChangeGroup};

use super::events::UserEvent;
use super::proxy::EventProxy;
use super::state::AppState;

/// Refreshes the change feed from `git status`, replacing any refresh that
/// is still running.
///
/// On success the new snapshot lands in the change store; the review
/// controller picks it up through its feed subscription. Errors are surfaced
/// to the user, never silently dropped.
pub fn start_status_refresh<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState<P>>>) {
    let repository = {
        let mut state_guard = state
            .lock()
            .expect("Mutex was poisoned. This should not happen.");
        state_guard.cancel_status_refresh();
        match &state_guard.repository_path {
            Some(path) => path.clone(),
            None => {
                tracing::info!("No repository opened; skipping status refresh");
                return;
            }
        }
    };

    let task_state = state.clone();
    let handle = tokio::spawn(async move {
        tracing::info!("Refreshing working tree status for {:?}", repository);
        match read_working_tree_status(&repository).await {
            Ok(groups) => {
                tracing::info!("Status refresh complete: {} change groups", groups.len());
                let state_guard = task_state
                    .lock()
                    .expect("Mutex was poisoned. This should not happen.");
                state_guard.store.replace(groups);
            }
            Err(e) => {
                tracing::error!("Status refresh failed: {e}");
                proxy.send_event(UserEvent::ShowError(format!(
                    "Failed to read repository status: {e}"
                )));
            }
        }
        task_state
            .lock()
            .expect("Mutex was poisoned. This should not happen.")
            .status_task = None;
    });

    state
        .lock()
        .expect("Mutex was poisoned. This should not happen.")
        .status_task = Some(handle);
}

async fn read_working_tree_status(
    repository: &Path,
) -> Result<Vec<FileChangeGroup>, CoreError> {
    let output = tokio::process::Command::new("git")
        .arg("-C")
        .arg(repository)
        .args(["status", "--porcelain", "-z"])
        .output()
        .await
        .map_err(|e| CoreError::Io(e, PathBuf::from(repository)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CoreError::StatusParse(stderr.trim().to_string()));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(group_by_top_level(parse_porcelain(&stdout)?))
}
