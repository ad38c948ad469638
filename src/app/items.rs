//! The item list manager: owns the selectable change groups and their selection.

use tokio::sync::mpsc;

use crate::core::{AggregateState, CoreError, FileChangeGroup, GroupId, SelectionSet};

/// One file-change group as presented in the review list.
///
/// Items are created on every rebuild and never handed out by reference to
/// other components; the selection flag changes only through
/// [`ItemListManager`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectableItem {
    pub identity: GroupId,
    pub payload: FileChangeGroup,
    pub selected: bool,
}

/// One logical selection mutation, as observed by subscribers.
///
/// Bulk operations produce a single notification, never one per item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    Toggled(GroupId),
    SelectedAll,
    DeselectedAll,
    /// A rebuild dropped identities that no longer exist.
    Reinitialized,
}

/// Produces an [`ItemListManager`] for a given mount element.
///
/// Injected into the controller so the rendering strategy for individual
/// items can be swapped without touching selection logic.
pub trait ItemListManagerFactory: Send + Sync {
    fn create(&self, mount_element: &str) -> ItemListManager;
}

/// The stock factory used by the application shell.
pub struct DefaultItemListFactory;

impl ItemListManagerFactory for DefaultItemListFactory {
    fn create(&self, mount_element: &str) -> ItemListManager {
        ItemListManager::new(mount_element)
    }
}

/// Owns the live list of [`SelectableItem`]s and their selection state.
///
/// The manager is constructed once the host surface exists, re-initialized
/// on every feed update, and destroyed exactly once. Any operation after
/// `destroy` is a loud [`CoreError::IllegalState`].
pub struct ItemListManager {
    #[allow(dead_code)]
    mount_element: String,
    items: Vec<SelectableItem>,
    selection: SelectionSet,
    ready: bool,
    destroyed: bool,
    subscribers: Vec<mpsc::UnboundedSender<SelectionChange>>,
}

impl ItemListManager {
    pub fn new(mount_element: &str) -> Self {
        Self {
            mount_element: mount_element.to_string(),
            items: Vec::new(),
            selection: SelectionSet::new(),
            ready: false,
            destroyed: false,
            subscribers: Vec::new(),
        }
    }

    /// `true` once the first initialization has completed.
    pub fn ready(&self) -> bool {
        self.ready
    }

    /// Items in source feed order.
    pub fn items(&self) -> &[SelectableItem] {
        &self.items
    }

    /// Subscribes to selection mutations. One event per logical mutation; a
    /// rebuild that leaves the selected set untouched emits nothing.
    pub fn selection_changes(&mut self) -> mpsc::UnboundedReceiver<SelectionChange> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Replaces the item list wholesale from a new feed snapshot.
    ///
    /// Selection is preserved for identities present in both the old and the
    /// new set; identities that disappeared are dropped. A rebuild must not
    /// reset selection for items that still exist.
    pub fn init_with_file_changes(
        &mut self,
        groups: Vec<FileChangeGroup>,
    ) -> Result<(), CoreError> {
        self.ensure_live()?;

        let identities: Vec<GroupId> = groups.iter().map(|g| g.id.clone()).collect();
        let selection_changed = self.selection.retain_universe(&identities);

        let selection = &self.selection;
        let items: Vec<SelectableItem> = groups
            .into_iter()
            .map(|group| SelectableItem {
                identity: group.id.clone(),
                selected: selection.contains(&group.id),
                payload: group,
            })
            .collect();
        self.items = items;
        self.ready = true;

        if selection_changed {
            self.emit(SelectionChange::Reinitialized);
        }
        Ok(())
    }

    /// Selects every current item. Emits a single notification, and none at
    /// all when the selection is already full.
    pub fn select_all_items(&mut self) -> Result<(), CoreError> {
        self.ensure_live()?;

        if self.items.is_empty() || self.items.iter().all(|item| item.selected) {
            return Ok(());
        }
        let identities: Vec<GroupId> = self.items.iter().map(|i| i.identity.clone()).collect();
        self.selection.select_all(&identities);
        for item in &mut self.items {
            item.selected = true;
        }
        self.emit(SelectionChange::SelectedAll);
        Ok(())
    }

    /// Clears the selection. Emits a single notification, none when already
    /// empty.
    pub fn deselect_all_items(&mut self) -> Result<(), CoreError> {
        self.ensure_live()?;

        if self.selection.is_empty() {
            return Ok(());
        }
        self.selection.clear();
        for item in &mut self.items {
            item.selected = false;
        }
        self.emit(SelectionChange::DeselectedAll);
        Ok(())
    }

    /// Flips one item's selection. An identity that is not in the current
    /// item set is silently ignored; the user may have clicked an item the
    /// last feed update just removed.
    pub fn toggle_item(&mut self, identity: &GroupId) -> Result<(), CoreError> {
        self.ensure_live()?;

        let Some(item) = self.items.iter_mut().find(|i| &i.identity == identity) else {
            tracing::debug!("Toggle for unknown item {identity}; ignoring");
            return Ok(());
        };
        self.selection.toggle(identity);
        item.selected = !item.selected;
        self.emit(SelectionChange::Toggled(identity.clone()));
        Ok(())
    }

    /// Selected items in item order (stable, not selection order).
    pub fn get_selected_items(&self) -> Result<Vec<SelectableItem>, CoreError> {
        self.ensure_live()?;
        Ok(self
            .items
            .iter()
            .filter(|item| item.selected)
            .cloned()
            .collect())
    }

    /// Aggregate selection state against the current item set.
    pub fn aggregate_state(&self) -> Result<AggregateState, CoreError> {
        self.ensure_live()?;
        let universe: Vec<GroupId> = self.items.iter().map(|i| i.identity.clone()).collect();
        Ok(self.selection.aggregate_state(&universe))
    }

    pub fn are_all_items_selected(&self) -> Result<bool, CoreError> {
        Ok(self.aggregate_state()? == AggregateState::Full)
    }

    pub fn is_empty_selection(&self) -> Result<bool, CoreError> {
        Ok(self.aggregate_state()? == AggregateState::Empty)
    }

    pub fn selected_count(&self) -> usize {
        self.selection.len()
    }

    /// Releases subscriber channels and item state. Must be called exactly
    /// once; a second call means a lingering subscription or late callback
    /// is still driving this manager.
    pub fn destroy(&mut self) -> Result<(), CoreError> {
        self.ensure_live()?;
        self.destroyed = true;
        self.subscribers.clear();
        self.items.clear();
        self.selection.clear();
        Ok(())
    }

    fn ensure_live(&self) -> Result<(), CoreError> {
        if self.destroyed {
            Err(CoreError::IllegalState(
                "item list manager used after destroy",
            ))
        } else {
            Ok(())
        }
    }

    fn emit(&mut self, change: SelectionChange) {
        self.subscribers
            .retain(|subscriber| subscriber.send(change.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FileChange;

    fn group(id: &str, files: &[&str]) -> FileChangeGroup {
        FileChangeGroup {
            id: GroupId::from(id),
            label: id.to_string(),
            file_changes: files
                .iter()
                .map(|path| FileChange {
                    path: path.into(),
                    kind: crate::core::ChangeKind::Modified,
                    original_path: None,
                })
                .collect(),
        }
    }

    fn manager_with(groups: Vec<FileChangeGroup>) -> ItemListManager {
        let mut manager = ItemListManager::new("item-list");
        manager.init_with_file_changes(groups).unwrap();
        manager
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<SelectionChange>) -> Vec<SelectionChange> {
        let mut changes = Vec::new();
        while let Ok(change) = rx.try_recv() {
            changes.push(change);
        }
        changes
    }

    #[test]
    fn init_marks_manager_ready() {
        let mut manager = ItemListManager::new("item-list");
        assert!(!manager.ready());

        manager.init_with_file_changes(vec![group("a", &["a/x"])]).unwrap();

        assert!(manager.ready());
        assert_eq!(manager.items().len(), 1);
    }

    #[test]
    fn rebuild_preserves_selection_by_identity_only() {
        let mut manager =
            manager_with(vec![group("a", &["a/x"]), group("b", &["b/x"]), group("c", &["c/x"])]);
        manager.toggle_item(&GroupId::from("a")).unwrap();
        manager.toggle_item(&GroupId::from("c")).unwrap();

        manager
            .init_with_file_changes(vec![group("b", &["b/x"]), group("c", &["c/x"]), group("d", &["d/x"])])
            .unwrap();

        let selected: Vec<GroupId> = manager
            .get_selected_items()
            .unwrap()
            .iter()
            .map(|i| i.identity.clone())
            .collect();
        assert_eq!(selected, vec![GroupId::from("c")]);
        assert_eq!(manager.aggregate_state().unwrap(), AggregateState::Partial);
    }

    #[test]
    fn rebuild_emits_once_only_when_selection_shrinks() {
        let mut manager = manager_with(vec![group("a", &["a/x"]), group("b", &["b/x"])]);
        let mut rx = manager.selection_changes();
        manager.toggle_item(&GroupId::from("a")).unwrap();
        drain(&mut rx);

        // "a" survives: no notification.
        manager
            .init_with_file_changes(vec![group("a", &["a/x"]), group("c", &["c/x"])])
            .unwrap();
        assert!(drain(&mut rx).is_empty());

        // "a" disappears: exactly one notification.
        manager
            .init_with_file_changes(vec![group("c", &["c/x"])])
            .unwrap();
        assert_eq!(drain(&mut rx), vec![SelectionChange::Reinitialized]);
    }

    #[test]
    fn bulk_operations_emit_exactly_one_notification() {
        let mut manager = manager_with(vec![group("a", &["a/x"]), group("b", &["b/x"])]);
        let mut rx = manager.selection_changes();

        manager.select_all_items().unwrap();
        assert_eq!(drain(&mut rx), vec![SelectionChange::SelectedAll]);

        // Already full: no further notification.
        manager.select_all_items().unwrap();
        assert!(drain(&mut rx).is_empty());

        manager.deselect_all_items().unwrap();
        assert_eq!(drain(&mut rx), vec![SelectionChange::DeselectedAll]);

        manager.deselect_all_items().unwrap();
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn toggle_unknown_identity_is_ignored() {
        let mut manager = manager_with(vec![group("a", &["a/x"])]);
        let mut rx = manager.selection_changes();

        manager.toggle_item(&GroupId::from("ghost")).unwrap();

        assert!(drain(&mut rx).is_empty());
        assert!(manager.is_empty_selection().unwrap());
    }

    #[test]
    fn selected_items_keep_item_order() {
        let mut manager =
            manager_with(vec![group("a", &["a/x"]), group("b", &["b/x"]), group("c", &["c/x"])]);
        // Select in reverse order; output must still follow item order.
        manager.toggle_item(&GroupId::from("c")).unwrap();
        manager.toggle_item(&GroupId::from("a")).unwrap();

        let first = manager.get_selected_items().unwrap();
        let ids: Vec<GroupId> = first.iter().map(|i| i.identity.clone()).collect();
        assert_eq!(ids, vec![GroupId::from("a"), GroupId::from("c")]);

        // Idempotent between mutations.
        assert_eq!(manager.get_selected_items().unwrap(), first);
    }

    #[test]
    fn aggregate_state_tracks_items_and_selection() {
        let mut manager = manager_with(vec![group("a", &["a/x"]), group("b", &["b/x"])]);
        assert_eq!(manager.aggregate_state().unwrap(), AggregateState::Empty);

        manager.toggle_item(&GroupId::from("a")).unwrap();
        assert_eq!(manager.aggregate_state().unwrap(), AggregateState::Partial);

        manager.select_all_items().unwrap();
        assert_eq!(manager.aggregate_state().unwrap(), AggregateState::Full);
        assert!(manager.are_all_items_selected().unwrap());
        assert_eq!(manager.selected_count(), 2);
    }

    #[test]
    fn empty_list_reports_empty_selection() {
        let manager = manager_with(Vec::new());
        assert!(manager.is_empty_selection().unwrap());
        assert!(!manager.are_all_items_selected().unwrap());
    }

    #[test]
    fn operations_after_destroy_are_illegal() {
        let mut manager = manager_with(vec![group("a", &["a/x"])]);
        manager.destroy().unwrap();

        assert!(matches!(
            manager.init_with_file_changes(vec![group("a", &["a/x"])]),
            Err(CoreError::IllegalState(_))
        ));
        assert!(matches!(
            manager.toggle_item(&GroupId::from("a")),
            Err(CoreError::IllegalState(_))
        ));
        assert!(matches!(
            manager.get_selected_items(),
            Err(CoreError::IllegalState(_))
        ));
        assert!(matches!(manager.destroy(), Err(CoreError::IllegalState(_))));
    }
}
