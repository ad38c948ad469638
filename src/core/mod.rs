pub mod error;
pub mod selection;
pub mod status;

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The kind of change a file underwent in the working tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
    Untracked,
}

/// A single changed file, as reported by the version-control backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Path relative to the repository root.
    pub path: PathBuf,
    pub kind: ChangeKind,
    /// For renames, the path the file previously had.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_path: Option<PathBuf>,
}

/// Stable key for a file-change group.
///
/// Derived from the change data itself (the top-level directory the changes
/// live under), never from list position. Positions are not stable across
/// feed rebuilds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub String);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(value: &str) -> Self {
        GroupId(value.to_string())
    }
}

/// An ordered set of file changes reviewed and committed as one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChangeGroup {
    pub id: GroupId,
    /// Human-readable name shown in the item list.
    pub label: String,
    pub file_changes: Vec<FileChange>,
}

pub use error::CoreError;
pub use selection::{AggregateState, SelectionSet};
pub use status::{group_by_top_level, parse_porcelain};
