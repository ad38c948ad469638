//! Contains all the command handlers that are callable from the frontend via IPC.
//!
//! Each function in this module corresponds to a specific `IpcMessage::command`.
//! The handlers drive the review controller and dialog registry, and send
//! `UserEvent`s back to the UI where a direct answer is needed.

use std::sync::{Arc, Mutex};

use serde::Deserialize;
use serde_json::Value;

use crate::config;
use crate::core::GroupId;

use super::events::UserEvent;
use super::file_dialog::RepositoryPicker;
use super::proxy::EventProxy;
use super::state::AppState;
use super::tasks;

/// Handles the frontend's ready signal.
///
/// This is the moment the item list surface exists, so the controller
/// attaches its view here, never earlier. An initial state snapshot goes out
/// right away; the first real status refresh follows asynchronously.
pub fn initialize<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState<P>>>) {
    {
        let mut state_guard = state
            .lock()
            .expect("Mutex was poisoned. This should not happen.");
        state_guard.review.attach_view("change-item-list");
        if let Some(repository) = &state_guard.repository_path {
            proxy.send_event(UserEvent::RepositoryOpened(
                repository.display().to_string(),
            ));
        }
        state_guard.review.publish();
    }
    tasks::start_status_refresh(proxy, state);
}

/// Toggles the selection state of a single change group.
pub fn toggle_item<P: EventProxy>(payload: Value, state: Arc<Mutex<AppState<P>>>) {
    if let Ok(id) = serde_json::from_value::<String>(payload.clone()) {
        let state_guard = state
            .lock()
            .expect("Mutex was poisoned. This should not happen.");
        state_guard.review.toggle_item(&GroupId(id));
    } else {
        tracing::warn!(
            "Failed to deserialize group id from payload: {:?}",
            payload
        );
    }
}

/// A user action on the select-all control.
pub fn set_all_selected<P: EventProxy>(payload: Value, state: Arc<Mutex<AppState<P>>>) {
    if let Ok(checked) = serde_json::from_value::<bool>(payload.clone()) {
        let state_guard = state
            .lock()
            .expect("Mutex was poisoned. This should not happen.");
        state_guard.review.set_all_selected(checked);
    } else {
        tracing::warn!("Failed to deserialize boolean from payload: {:?}", payload);
    }
}

/// Opens the commit workflow over the current selection.
///
/// The result is awaited on a detached task: the dialog outlives whatever
/// happens to the controller in the meantime.
pub fn open_commit_dialog<P: EventProxy>(state: Arc<Mutex<AppState<P>>>) {
    let handle = {
        let state_guard = state
            .lock()
            .expect("Mutex was poisoned. This should not happen.");
        state_guard.review.open_commit_dialog()
    };

    if let Some(handle) = handle {
        tokio::spawn(async move {
            match handle.after_closed().await {
                Some(result) => {
                    tracing::info!("Commit dialog closed: {:?}", result.commit_message)
                }
                None => tracing::info!("Commit dialog closed without a result"),
            }
        });
    }
}

#[derive(Deserialize, Debug)]
struct CloseDialogPayload {
    id: String,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    dismissed: bool,
}

/// Resolves a dialog the frontend reports as closed.
///
/// Backdrop/ESC arrives as `dismissed`; the registry refuses it for dialogs
/// opened with `disable_close`.
pub fn close_dialog<P: EventProxy>(payload: Value, state: Arc<Mutex<AppState<P>>>) {
    let payload = match serde_json::from_value::<CloseDialogPayload>(payload.clone()) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("Malformed closeDialog payload {:?}: {e}", payload);
            return;
        }
    };

    let dialogs = {
        let state_guard = state
            .lock()
            .expect("Mutex was poisoned. This should not happen.");
        state_guard.dialogs.clone()
    };

    if payload.dismissed {
        if !dialogs.dismiss(&payload.id) {
            tracing::debug!("Dismissal of dialog {} suppressed", payload.id);
        }
    } else if !dialogs.close(&payload.id, payload.result) {
        tracing::warn!("Close for unknown dialog {}", payload.id);
    }
}

/// Opens a directory picker and switches the review to the chosen repository.
pub fn open_repository<P: EventProxy, D: RepositoryPicker + ?Sized>(
    picker: &D,
    proxy: P,
    state: Arc<Mutex<AppState<P>>>,
) {
    if let Some(path) = picker.pick_repository() {
        {
            let mut state_guard = state
                .lock()
                .expect("Mutex was poisoned. This should not happen.");
            state_guard.repository_path = Some(path.clone());
            state_guard.config.last_repository = Some(path.clone());
            if let Err(e) = config::settings::save_config(&state_guard.config, None) {
                tracing::warn!("Failed to save config after opening repository: {}", e);
            }
        }
        proxy.send_event(UserEvent::RepositoryOpened(path.display().to_string()));
        tasks::start_status_refresh(proxy, state);
    } else {
        tracing::info!("User cancelled repository selection.");
    }
}

/// Re-reads the working tree status on user request.
pub fn refresh_status<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState<P>>>) {
    tasks::start_status_refresh(proxy, state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::dialog::{DialogRequest, Dialogs, COMMIT_DIALOG_ID};
    use crate::app::view_model::UiState;
    use crate::config::AppConfig;
    use crate::core::{ChangeKind, FileChange, FileChangeGroup};
    use serde_json::json;
    use std::path::PathBuf;
    use std::time::Duration;
    use tokio::sync::mpsc;

    // A mock EventProxy for capturing events sent to the UI.
    #[derive(Clone)]
    struct TestEventProxy {
        sender: mpsc::UnboundedSender<UserEvent>,
    }

    impl EventProxy for TestEventProxy {
        fn send_event(&self, event: UserEvent) {
            self.sender.send(event).expect("Test receiver dropped");
        }
    }

    // A mock RepositoryPicker to simulate user interaction with the native dialog.
    #[derive(Default)]
    struct MockRepositoryPicker {
        picked: Mutex<Option<PathBuf>>,
    }

    impl MockRepositoryPicker {
        fn set_pick(&self, path: Option<PathBuf>) {
            *self.picked.lock().unwrap() = path;
        }
    }

    impl RepositoryPicker for MockRepositoryPicker {
        fn pick_repository(&self) -> Option<PathBuf> {
            self.picked.lock().unwrap().clone()
        }
    }

    struct TestHarness {
        state: Arc<Mutex<AppState<TestEventProxy>>>,
        proxy: TestEventProxy,
        event_rx: mpsc::UnboundedReceiver<UserEvent>,
        dialogs: Arc<Dialogs<TestEventProxy>>,
        picker: Arc<MockRepositoryPicker>,
    }

    impl TestHarness {
        fn new() -> Self {
            let (tx, rx) = mpsc::unbounded_channel();
            let proxy = TestEventProxy { sender: tx };
            let dialogs = Arc::new(Dialogs::new(proxy.clone()));
            let state = AppState::new(proxy.clone(), dialogs.clone(), AppConfig::default());

            Self {
                state: Arc::new(Mutex::new(state)),
                proxy,
                event_rx: rx,
                dialogs,
                picker: Arc::new(MockRepositoryPicker::default()),
            }
        }

        fn set_feed(&self, groups: Vec<FileChangeGroup>) {
            self.state.lock().unwrap().store.replace(groups);
        }

        async fn get_next_event(&mut self) -> Option<UserEvent> {
            tokio::time::timeout(Duration::from_secs(2), self.event_rx.recv())
                .await
                .ok()
                .flatten()
        }

        async fn get_last_state_update(&mut self) -> Option<Box<UiState>> {
            let mut last_update = None;
            let timeout = tokio::time::sleep(Duration::from_millis(300));
            tokio::pin!(timeout);
            loop {
                tokio::select! {
                    event = self.event_rx.recv() => {
                        if let Some(UserEvent::StateUpdate(ui_state)) = event {
                            last_update = Some(ui_state);
                        } else if event.is_none() { break; }
                    },
                    _ = &mut timeout => { break; }
                }
            }
            last_update
        }

        async fn wait_for_open_dialog(&mut self) -> DialogRequest {
            loop {
                match self.get_next_event().await {
                    Some(UserEvent::OpenDialog(request)) => return request,
                    Some(_) => continue,
                    None => panic!("No OpenDialog event arrived"),
                }
            }
        }
    }

    fn group(id: &str, files: &[&str]) -> FileChangeGroup {
        FileChangeGroup {
            id: GroupId::from(id),
            label: id.to_string(),
            file_changes: files
                .iter()
                .map(|path| FileChange {
                    path: path.into(),
                    kind: ChangeKind::Modified,
                    original_path: None,
                })
                .collect(),
        }
    }

    fn abc() -> Vec<FileChangeGroup> {
        vec![
            group("a", &["a/one", "a/two"]),
            group("b", &["b/one"]),
            group("c", &["c/one"]),
        ]
    }

    async fn initialized_harness(groups: Vec<FileChangeGroup>) -> TestHarness {
        let mut harness = TestHarness::new();
        harness.set_feed(groups);
        initialize(harness.proxy.clone(), harness.state.clone());
        // Drain events until the deferred first initialization has run.
        loop {
            match harness.get_next_event().await {
                Some(UserEvent::StateUpdate(state)) if state.list_ready => break,
                Some(_) => continue,
                None => panic!("Item list never became ready"),
            }
        }
        harness
    }

    #[tokio::test]
    async fn test_initialize_attaches_list_and_publishes_state() {
        let mut harness = TestHarness::new();
        harness.set_feed(abc());

        initialize(harness.proxy.clone(), harness.state.clone());

        let ui_state = harness.get_last_state_update().await.unwrap();
        assert!(ui_state.list_ready);
        assert_eq!(ui_state.total_groups_count, 3);
        assert_eq!(ui_state.selected_groups_count, 0);
    }

    #[tokio::test]
    async fn test_toggle_item_drives_partial_aggregate_state() {
        let mut harness = initialized_harness(abc()).await;

        toggle_item(json!("a"), harness.state.clone());
        toggle_item(json!("c"), harness.state.clone());

        let ui_state = harness.get_last_state_update().await.unwrap();
        assert_eq!(ui_state.selected_groups_count, 2);
        assert!(!ui_state.all_checked);
        assert!(ui_state.all_indeterminate);
    }

    #[tokio::test]
    async fn test_set_all_selected_checks_every_item() {
        let mut harness = initialized_harness(abc()).await;
        toggle_item(json!("a"), harness.state.clone());
        let _ = harness.get_last_state_update().await;

        set_all_selected(json!(true), harness.state.clone());

        let ui_state = harness.get_last_state_update().await.unwrap();
        assert_eq!(ui_state.selected_groups_count, 3);
        assert!(ui_state.all_checked);
        assert!(!ui_state.all_indeterminate);
    }

    #[tokio::test]
    async fn test_toggle_unknown_item_changes_nothing() {
        let mut harness = initialized_harness(abc()).await;

        toggle_item(json!("ghost"), harness.state.clone());

        let event = harness.get_last_state_update().await;
        assert!(event.is_none(), "No state update expected for unknown item");
    }

    #[tokio::test]
    async fn test_empty_feed_disables_all_select() {
        let mut harness = initialized_harness(Vec::new()).await;

        harness.state.lock().unwrap().review.publish();

        let ui_state = harness.get_last_state_update().await.unwrap();
        assert!(!ui_state.all_select_enabled);
        assert_eq!(ui_state.total_groups_count, 0);
    }

    #[tokio::test]
    async fn test_commit_dialog_with_empty_selection_carries_empty_payload() {
        let mut harness = initialized_harness(Vec::new()).await;

        open_commit_dialog(harness.state.clone());

        let request = harness.wait_for_open_dialog().await;
        assert_eq!(request.id, COMMIT_DIALOG_ID);
        assert_eq!(request.config["data"]["fileChanges"], json!([]));
    }

    #[tokio::test]
    async fn test_commit_dialog_payload_follows_item_order() {
        let mut harness = initialized_harness(abc()).await;
        toggle_item(json!("c"), harness.state.clone());
        toggle_item(json!("a"), harness.state.clone());
        let _ = harness.get_last_state_update().await;

        open_commit_dialog(harness.state.clone());

        let request = harness.wait_for_open_dialog().await;
        let paths: Vec<&str> = request.config["data"]["fileChanges"]
            .as_array()
            .unwrap()
            .iter()
            .map(|change| change["path"].as_str().unwrap())
            .collect();
        assert_eq!(paths, vec!["a/one", "a/two", "c/one"]);
    }

    #[tokio::test]
    async fn test_close_dialog_dismissal_is_suppressed_for_commit_dialog() {
        let mut harness = initialized_harness(abc()).await;
        open_commit_dialog(harness.state.clone());
        let request = harness.wait_for_open_dialog().await;

        close_dialog(
            json!({ "id": request.id, "dismissed": true }),
            harness.state.clone(),
        );
        assert!(harness.dialogs.is_open(&request.id), "disable_close dialog must survive dismissal");

        close_dialog(
            json!({ "id": request.id, "result": { "commitMessage": "done" } }),
            harness.state.clone(),
        );
        assert!(!harness.dialogs.is_open(&request.id));
    }

    #[tokio::test]
    async fn test_open_repository_updates_state_and_reports_errors() {
        let mut harness = initialized_harness(Vec::new()).await;
        let dir = tempfile::tempdir().unwrap();
        harness.picker.set_pick(Some(dir.path().to_path_buf()));

        open_repository(
            harness.picker.as_ref(),
            harness.proxy.clone(),
            harness.state.clone(),
        );

        assert_eq!(
            harness.state.lock().unwrap().repository_path,
            Some(dir.path().to_path_buf())
        );
        let mut saw_repository_opened = false;
        for _ in 0..4 {
            match harness.get_next_event().await {
                Some(UserEvent::RepositoryOpened(path)) => {
                    assert_eq!(path, dir.path().display().to_string());
                    saw_repository_opened = true;
                }
                // The temp dir is not a repository, so the refresh surfaces
                // an error rather than silently doing nothing.
                Some(UserEvent::ShowError(_)) => break,
                Some(_) => continue,
                None => break,
            }
        }
        assert!(saw_repository_opened);
    }

    #[tokio::test]
    async fn test_open_repository_cancelled_does_nothing() {
        let mut harness = initialized_harness(Vec::new()).await;
        harness.picker.set_pick(None);

        open_repository(
            harness.picker.as_ref(),
            harness.proxy.clone(),
            harness.state.clone(),
        );

        assert!(harness.state.lock().unwrap().repository_path.is_none());
        let event = harness.get_last_state_update().await;
        assert!(event.is_none());
    }

    #[tokio::test]
    async fn test_refresh_without_repository_is_silent() {
        let mut harness = initialized_harness(Vec::new()).await;

        refresh_status(harness.proxy.clone(), harness.state.clone());

        let event = harness.get_last_state_update().await;
        assert!(event.is_none());
        assert!(harness.state.lock().unwrap().status_task.is_none());
    }

    #[tokio::test]
    async fn test_shutdown_stops_feed_mirroring() {
        let mut harness = initialized_harness(abc()).await;

        harness.state.lock().unwrap().shutdown();
        harness.set_feed(vec![group("x", &["x/one"])]);

        let event = harness.get_last_state_update().await;
        assert!(event.is_none(), "No updates expected after shutdown");
    }
}
