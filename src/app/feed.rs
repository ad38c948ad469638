//! The change feed: the single source of "current file changes".

use tokio::sync::watch;

use crate::core::FileChangeGroup;

/// Holds the latest file-change snapshot and notifies subscribers when it is
/// replaced.
///
/// Subscribers take one long-lived [`watch::Receiver`]; every update replaces
/// the previous snapshot wholesale. Where the changes come from is not this
/// type's concern.
pub struct ChangeStore {
    tx: watch::Sender<Vec<FileChangeGroup>>,
}

impl ChangeStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self { tx }
    }

    /// Replaces the current snapshot, waking all subscribers.
    pub fn replace(&self, groups: Vec<FileChangeGroup>) {
        self.tx.send_replace(groups);
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<FileChangeGroup>> {
        self.tx.subscribe()
    }
}

impl Default for ChangeStore {
    fn default() -> Self {
        Self::new()
    }
}
