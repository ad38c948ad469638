//! Defines the central, mutable state of the application.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::AppConfig;

use super::controller::ChangeReviewController;
use super::dialog::DialogService;
use super::feed::ChangeStore;
use super::items::DefaultItemListFactory;
use super::proxy::EventProxy;

/// Holds the complete, mutable state of the application.
///
/// Wrapped in an `Arc<Mutex<...>>` for shared access from the main event
/// loop, IPC handlers, and async tasks.
pub struct AppState<P: EventProxy> {
    /// The application's configuration settings.
    pub config: AppConfig,
    /// The change feed the review controller mirrors.
    pub store: ChangeStore,
    /// The review workspace controller.
    pub review: ChangeReviewController<P>,
    /// Modal dialog registry; deliberately not owned by the controller so
    /// open dialogs survive its teardown.
    pub dialogs: Arc<dyn DialogService>,
    /// The repository whose working tree is being reviewed.
    pub repository_path: Option<PathBuf>,
    /// A handle to the currently running status refresh, allowing it to be
    /// aborted.
    pub status_task: Option<JoinHandle<()>>,
}

impl<P: EventProxy> AppState<P> {
    pub fn new(proxy: P, dialogs: Arc<dyn DialogService>, config: AppConfig) -> Self {
        let store = ChangeStore::new();
        let mut review = ChangeReviewController::new(
            proxy,
            Arc::new(DefaultItemListFactory),
            dialogs.clone(),
            store.subscribe(),
        );
        review.start();

        let repository_path = config.last_repository.clone();
        Self {
            config,
            store,
            review,
            dialogs,
            repository_path,
            status_task: None,
        }
    }

    /// Cancels the in-flight status refresh, if any.
    pub fn cancel_status_refresh(&mut self) {
        if let Some(handle) = self.status_task.take() {
            handle.abort();
        }
    }

    /// Releases everything this state owns. Open dialogs keep resolving
    /// through the registry.
    pub fn shutdown(&mut self) {
        self.cancel_status_refresh();
        self.review.destroy();
    }
}
