//! Modal dialog plumbing: typed configuration in, typed result out.
//!
//! Opening a dialog registers a pending one-shot resolver and asks the
//! frontend to present the modal; the frontend's `closeDialog` IPC resolves
//! it. The returned handle owns only its receiving end, so it keeps working
//! when the component that opened the dialog is long gone.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::oneshot;

use super::events::UserEvent;
use super::proxy::EventProxy;
use crate::core::FileChange;

/// Accessibility semantics of a modal surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogRole {
    Dialog,
    AlertDialog,
}

/// Configuration for one modal dialog.
///
/// Size bounds are independent optional CSS lengths; conflicting bounds are
/// passed through untouched and left to the rendering layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogConfig<D> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub auto_focus: bool,
    /// Suppresses ESC/backdrop dismissal entirely.
    pub disable_close: bool,
    pub has_backdrop: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<String>,
    pub role: DialogRole,
    pub data: D,
}

impl<D> DialogConfig<D> {
    pub fn new(data: D) -> Self {
        Self {
            id: None,
            auto_focus: true,
            disable_close: false,
            has_backdrop: true,
            width: None,
            height: None,
            min_width: None,
            min_height: None,
            max_width: None,
            max_height: None,
            role: DialogRole::Dialog,
            data,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_width(mut self, width: &str) -> Self {
        self.width = Some(width.to_string());
        self
    }

    pub fn with_max_height(mut self, max_height: &str) -> Self {
        self.max_height = Some(max_height.to_string());
        self
    }

    pub fn with_disable_close(mut self, disable_close: bool) -> Self {
        self.disable_close = disable_close;
        self
    }
}

/// The open request handed to the frontend.
#[derive(Debug, Clone, Serialize)]
pub struct DialogRequest {
    pub id: String,
    /// Which workflow component the frontend should mount.
    pub component: String,
    pub config: Value,
}

/// Token for an in-flight modal workflow.
///
/// Independently owned: the opener may be torn down before the dialog
/// closes and the result still resolves.
pub struct DialogHandle<R> {
    receiver: oneshot::Receiver<Option<Value>>,
    _result: PhantomData<R>,
}

impl<R: DeserializeOwned> DialogHandle<R> {
    /// Resolves once, when the dialog closes. `None` means the dialog was
    /// dismissed without a result (or its service went away first); this
    /// path never panics.
    pub async fn after_closed(self) -> Option<R> {
        match self.receiver.await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(result) => Some(result),
                Err(e) => {
                    tracing::warn!("Discarding malformed dialog result: {e}");
                    None
                }
            },
            Ok(None) => None,
            Err(_) => None,
        }
    }
}

struct PendingDialog {
    resolver: oneshot::Sender<Option<Value>>,
    disable_close: bool,
}

/// The dialog registry backing [`DialogService`].
///
/// Pending resolvers live here, not in the opener, which is what decouples
/// result delivery from the opener's lifetime.
pub struct Dialogs<P: EventProxy> {
    proxy: P,
    pending: Mutex<HashMap<String, PendingDialog>>,
    next_id: AtomicU64,
}

impl<P: EventProxy> Dialogs<P> {
    pub fn new(proxy: P) -> Self {
        Self {
            proxy,
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Opens a modal workflow and returns the handle for its result.
    pub fn open<D: Serialize, R: DeserializeOwned>(
        &self,
        component: &str,
        config: DialogConfig<D>,
    ) -> DialogHandle<R> {
        let id = config
            .id
            .clone()
            .unwrap_or_else(|| format!("dialog-{}", self.next_id.fetch_add(1, Ordering::Relaxed)));

        let (resolver, receiver) = oneshot::channel();
        let previous = self.pending.lock().unwrap().insert(
            id.clone(),
            PendingDialog {
                resolver,
                disable_close: config.disable_close,
            },
        );
        if previous.is_some() {
            // The stale handle resolves as dismissed when its sender drops.
            tracing::warn!("Dialog {id} reopened while still pending");
        }

        let config_value = match serde_json::to_value(&config) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize dialog config: {e}");
                Value::Null
            }
        };
        self.proxy.send_event(UserEvent::OpenDialog(DialogRequest {
            id,
            component: component.to_string(),
            config: config_value,
        }));

        DialogHandle {
            receiver,
            _result: PhantomData,
        }
    }

    /// Explicit close from inside the workflow; always allowed. `result` is
    /// `None` when the workflow closed itself without producing one.
    pub fn close(&self, id: &str, result: Option<Value>) -> bool {
        match self.pending.lock().unwrap().remove(id) {
            Some(pending) => {
                let _ = pending.resolver.send(result);
                true
            }
            None => false,
        }
    }

    /// Backdrop/ESC dismissal. Refused when the dialog was opened with
    /// `disable_close`.
    pub fn dismiss(&self, id: &str) -> bool {
        let mut pending = self.pending.lock().unwrap();
        match pending.get(id) {
            Some(dialog) if dialog.disable_close => false,
            Some(_) => {
                let dialog = pending.remove(id).expect("entry checked above");
                let _ = dialog.resolver.send(None);
                true
            }
            None => false,
        }
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.pending.lock().unwrap().contains_key(id)
    }
}

/// Stable identity of the commit dialog; also used by the controller to
/// avoid opening it twice.
pub const COMMIT_DIALOG_ID: &str = "commit-dialog";

/// Component name of the commit workflow on the frontend side.
pub const COMMIT_DIALOG_COMPONENT: &str = "commit-dialog";

/// Input contract of the commit workflow: the flat, ordered sequence of file
/// changes the user intends to commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitDialogData {
    pub file_changes: Vec<FileChange>,
}

/// Output contract of the commit workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitDialogResult {
    pub commit_message: String,
}

/// The capability through which the controller launches modal workflows.
pub trait DialogService: Send + Sync {
    fn open_commit(
        &self,
        config: DialogConfig<CommitDialogData>,
    ) -> DialogHandle<CommitDialogResult>;

    fn close(&self, id: &str, result: Option<Value>) -> bool;

    fn dismiss(&self, id: &str) -> bool;

    fn is_open(&self, id: &str) -> bool;
}

impl<P: EventProxy> DialogService for Dialogs<P> {
    fn open_commit(
        &self,
        config: DialogConfig<CommitDialogData>,
    ) -> DialogHandle<CommitDialogResult> {
        self.open(COMMIT_DIALOG_COMPONENT, config)
    }

    fn close(&self, id: &str, result: Option<Value>) -> bool {
        Dialogs::close(self, id, result)
    }

    fn dismiss(&self, id: &str) -> bool {
        Dialogs::dismiss(self, id)
    }

    fn is_open(&self, id: &str) -> bool {
        Dialogs::is_open(self, id)
    }
}
