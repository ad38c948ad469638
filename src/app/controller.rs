//! The change-review controller: wires the change feed, the item list
//! manager, the aggregate select-all control, and the commit dialog
//! together.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::core::{AggregateState, FileChange, FileChangeGroup, GroupId};

use super::all_select::AllSelectControl;
use super::dialog::{
    CommitDialogData, CommitDialogResult, DialogConfig, DialogHandle, DialogService,
    COMMIT_DIALOG_ID,
};
use super::events::UserEvent;
use super::items::{ItemListManager, ItemListManagerFactory};
use super::proxy::EventProxy;
use super::view_model::generate_ui_state;

/// Composition root for the review workspace.
///
/// Owns three long-lived subscriptions (feed, select-all value changes,
/// selection changes), each held as an abortable task handle and released
/// independently on [`destroy`](Self::destroy). The item list manager is not
/// created here; it arrives via [`attach_view`](Self::attach_view) once the
/// frontend reports that the host surface exists.
pub struct ChangeReviewController<P: EventProxy> {
    proxy: P,
    item_list_factory: Arc<dyn ItemListManagerFactory>,
    dialogs: Arc<dyn DialogService>,
    feed: watch::Receiver<Vec<FileChangeGroup>>,
    item_list: Arc<Mutex<Option<ItemListManager>>>,
    all_select: Arc<Mutex<AllSelectControl>>,
    feed_task: Option<JoinHandle<()>>,
    all_select_task: Option<JoinHandle<()>>,
    selection_task: Option<JoinHandle<()>>,
}

impl<P: EventProxy> ChangeReviewController<P> {
    pub fn new(
        proxy: P,
        item_list_factory: Arc<dyn ItemListManagerFactory>,
        dialogs: Arc<dyn DialogService>,
        feed: watch::Receiver<Vec<FileChangeGroup>>,
    ) -> Self {
        Self {
            proxy,
            item_list_factory,
            dialogs,
            feed,
            item_list: Arc::new(Mutex::new(None)),
            all_select: Arc::new(Mutex::new(AllSelectControl::new())),
            feed_task: None,
            all_select_task: None,
            selection_task: None,
        }
    }

    /// Begins mirroring the change feed. The subscription lives until
    /// [`destroy`](Self::destroy).
    ///
    /// Every snapshot re-evaluates two independent concerns: the select-all
    /// control's availability, and (once the list manager is ready) the item
    /// list itself plus the control's value.
    pub fn start(&mut self) {
        if self.feed_task.is_some() {
            tracing::warn!("Controller already started; ignoring");
            return;
        }

        let mut feed = self.feed.clone();
        let item_list = self.item_list.clone();
        let all_select = self.all_select.clone();
        let proxy = self.proxy.clone();

        self.feed_task = Some(tokio::spawn(async move {
            loop {
                let groups = feed.borrow_and_update().clone();

                all_select
                    .lock()
                    .unwrap()
                    .set_enabled(!groups.is_empty());

                {
                    let mut list = item_list.lock().unwrap();
                    if let Some(manager) = list.as_mut() {
                        if manager.ready() {
                            if let Err(e) = manager.init_with_file_changes(groups.clone()) {
                                tracing::error!("Feed update rejected by item list: {e}");
                            }
                        }
                    }
                }

                sync_all_select(&item_list, &all_select);
                publish_state(&proxy, &groups, &item_list, &all_select);

                if feed.changed().await.is_err() {
                    tracing::debug!("Change feed closed; stopping mirror");
                    break;
                }
            }
        }));
    }

    /// Called when the frontend's item list surface exists.
    ///
    /// Creates the item list manager and wires both sync directions. The
    /// first initialization is deferred to the next scheduling tick: the
    /// attach runs inside the frontend's own initialize turn, and mutating
    /// the freshly created list within the turn that renders it violates
    /// render consistency.
    pub fn attach_view(&mut self, mount_element: &str) {
        let mut selection_rx = {
            let mut list = self.item_list.lock().unwrap();
            if list.is_some() {
                tracing::warn!("Item list already attached; ignoring");
                return;
            }
            let mut manager = self.item_list_factory.create(mount_element);
            let rx = manager.selection_changes();
            *list = Some(manager);
            rx
        };
        let mut value_rx = self.all_select.lock().unwrap().value_changes();

        // Deferred first initialization from the current feed snapshot.
        // Updates that arrived before this tick are coalesced into it.
        {
            let feed = self.feed.clone();
            let item_list = self.item_list.clone();
            let all_select = self.all_select.clone();
            let proxy = self.proxy.clone();
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                let groups = feed.borrow().clone();
                {
                    let mut list = item_list.lock().unwrap();
                    let Some(manager) = list.as_mut() else {
                        return; // torn down before the first tick
                    };
                    if let Err(e) = manager.init_with_file_changes(groups.clone()) {
                        tracing::error!("First item list initialization failed: {e}");
                        return;
                    }
                }
                sync_all_select(&item_list, &all_select);
                publish_state(&proxy, &groups, &item_list, &all_select);
            });
        }

        // Select-all control -> item list.
        {
            let item_list = self.item_list.clone();
            self.all_select_task = Some(tokio::spawn(async move {
                while let Some(checked) = value_rx.recv().await {
                    let mut list = item_list.lock().unwrap();
                    let Some(manager) = list.as_mut() else {
                        continue;
                    };
                    let applied = if checked {
                        manager.select_all_items()
                    } else {
                        manager.deselect_all_items()
                    };
                    if let Err(e) = applied {
                        tracing::error!("All-select change rejected by item list: {e}");
                    }
                }
            }));
        }

        // Item list -> select-all control. The push into the control is
        // silent, so it cannot re-enter the channel handled above.
        {
            let feed = self.feed.clone();
            let item_list = self.item_list.clone();
            let all_select = self.all_select.clone();
            let proxy = self.proxy.clone();
            self.selection_task = Some(tokio::spawn(async move {
                while selection_rx.recv().await.is_some() {
                    sync_all_select(&item_list, &all_select);
                    let groups = feed.borrow().clone();
                    publish_state(&proxy, &groups, &item_list, &all_select);
                }
            }));
        }
    }

    /// Flips one item. Before the list manager exists this is a silent
    /// no-op: there is nothing selected yet.
    pub fn toggle_item(&self, identity: &GroupId) {
        let mut list = self.item_list.lock().unwrap();
        match list.as_mut() {
            Some(manager) => {
                if let Err(e) = manager.toggle_item(identity) {
                    tracing::error!("Toggle rejected by item list: {e}");
                }
            }
            None => tracing::debug!("Toggle before item list attach; ignoring"),
        }
    }

    /// A user action on the aggregate control. Emits on the user-intent
    /// channel; the resulting bulk mutation flows back in silently.
    pub fn set_all_selected(&self, checked: bool) {
        self.all_select.lock().unwrap().set_checked(checked);
    }

    /// Opens the commit workflow over the currently selected items.
    ///
    /// The payload is derived fresh on every call: the selected items'
    /// file changes concatenated in item order. Returns `None` (and opens
    /// nothing) before the list manager exists, or while a commit dialog is
    /// already open.
    pub fn open_commit_dialog(&self) -> Option<DialogHandle<CommitDialogResult>> {
        let file_changes: Vec<FileChange> = {
            let list = self.item_list.lock().unwrap();
            let Some(manager) = list.as_ref() else {
                tracing::debug!("Commit requested before item list attach; ignoring");
                return None;
            };
            match manager.get_selected_items() {
                Ok(items) => items
                    .into_iter()
                    .flat_map(|item| item.payload.file_changes)
                    .collect(),
                Err(e) => {
                    tracing::error!("Cannot derive commit payload: {e}");
                    return None;
                }
            }
        };

        if self.dialogs.is_open(COMMIT_DIALOG_ID) {
            tracing::debug!("Commit dialog already open; ignoring");
            return None;
        }

        let config = DialogConfig::new(CommitDialogData { file_changes })
            .with_id(COMMIT_DIALOG_ID)
            .with_width("700px")
            .with_max_height("75vh")
            .with_disable_close(true);
        Some(self.dialogs.open_commit(config))
    }

    /// Pushes the current snapshot to the UI.
    pub fn publish(&self) {
        let groups = self.feed.borrow().clone();
        publish_state(&self.proxy, &groups, &self.item_list, &self.all_select);
    }

    /// Tears the controller down.
    ///
    /// The three subscriptions and the manager are independent resources;
    /// each is released on its own so one missing piece never blocks the
    /// rest. Open dialogs are left alone: their results resolve through the
    /// dialog service, which outlives this controller.
    pub fn destroy(&mut self) {
        if let Some(handle) = self.feed_task.take() {
            handle.abort();
        }
        if let Some(handle) = self.all_select_task.take() {
            handle.abort();
        }
        if let Some(handle) = self.selection_task.take() {
            handle.abort();
        }

        if let Some(mut manager) = self.item_list.lock().unwrap().take() {
            if let Err(e) = manager.destroy() {
                tracing::error!("Item list teardown failed: {e}");
            }
        }
    }
}

/// Direction B of the control sync: recompute the aggregate state and push
/// it into the control without emitting a user change.
fn sync_all_select(
    item_list: &Mutex<Option<ItemListManager>>,
    all_select: &Mutex<AllSelectControl>,
) {
    let aggregate = {
        let list = item_list.lock().unwrap();
        match list.as_ref() {
            Some(manager) if manager.ready() => match manager.aggregate_state() {
                Ok(state) => state,
                Err(e) => {
                    tracing::error!("Aggregate state unavailable: {e}");
                    return;
                }
            },
            _ => AggregateState::Empty,
        }
    };
    all_select.lock().unwrap().apply_aggregate(aggregate);
}

fn publish_state<P: EventProxy>(
    proxy: &P,
    groups: &[FileChangeGroup],
    item_list: &Mutex<Option<ItemListManager>>,
    all_select: &Mutex<AllSelectControl>,
) {
    let list = item_list.lock().unwrap();
    let control = all_select.lock().unwrap();
    let ui_state = generate_ui_state(groups, list.as_ref(), &control);
    proxy.send_event(UserEvent::StateUpdate(Box::new(ui_state)));
}
