//! An abstraction layer for native file dialogs to enable testing.

use std::path::PathBuf;

/// Defines the interface for picking a repository directory.
/// This allows for a mock implementation during tests, avoiding the need
/// to interact with actual OS dialog windows.
pub trait RepositoryPicker: Send + Sync {
    /// Opens a dialog to select the repository to review.
    fn pick_repository(&self) -> Option<PathBuf>;
}

/// The production implementation that uses the `rfd` crate to show native OS dialogs.
pub struct NativeRepositoryPicker;

impl RepositoryPicker for NativeRepositoryPicker {
    fn pick_repository(&self) -> Option<PathBuf> {
        rfd::FileDialog::new().pick_folder()
    }
}
