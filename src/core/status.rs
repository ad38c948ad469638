//! Parses `git status --porcelain` output into file-change groups.
//!
//! The rest of the crate treats the change feed as an opaque external
//! collaborator; this module is the one place that knows the wire shape of
//! the VCS backend's answer.

use std::path::{Component, Path, PathBuf};

use super::{ChangeKind, CoreError, FileChange, FileChangeGroup, GroupId};

/// Parses NUL-terminated `git status --porcelain -z` output.
///
/// Each entry is `XY <path>`, with renames carrying the original path as an
/// extra NUL-separated field. Entry order is preserved.
pub fn parse_porcelain(output: &str) -> Result<Vec<FileChange>, CoreError> {
    let mut changes = Vec::new();
    let mut fields = output.split('\0').filter(|f| !f.is_empty());

    while let Some(entry) = fields.next() {
        if entry.len() < 4 {
            return Err(CoreError::StatusParse(entry.to_string()));
        }
        let (code, path) = entry.split_at(3);
        let code = &code[..2];
        let kind = change_kind(code);

        let original_path = if kind == ChangeKind::Renamed {
            let from = fields
                .next()
                .ok_or_else(|| CoreError::StatusParse(entry.to_string()))?;
            Some(PathBuf::from(from))
        } else {
            None
        };

        changes.push(FileChange {
            path: PathBuf::from(path),
            kind,
            original_path,
        });
    }

    Ok(changes)
}

fn change_kind(code: &str) -> ChangeKind {
    if code == "??" {
        return ChangeKind::Untracked;
    }
    match code.chars().find(|c| *c != ' ' && *c != '.') {
        Some('A') => ChangeKind::Added,
        Some('D') => ChangeKind::Deleted,
        Some('R') | Some('C') => ChangeKind::Renamed,
        _ => ChangeKind::Modified,
    }
}

/// Groups changes by their top-level directory, in first-appearance order.
///
/// The directory name doubles as the group identity, so a group keeps its
/// identity across refreshes as long as any change under it remains.
pub fn group_by_top_level(changes: Vec<FileChange>) -> Vec<FileChangeGroup> {
    let mut groups: Vec<FileChangeGroup> = Vec::new();

    for change in changes {
        let label = top_level_segment(&change.path);
        let id = GroupId(label.clone());

        match groups.iter_mut().find(|g| g.id == id) {
            Some(group) => group.file_changes.push(change),
            None => groups.push(FileChangeGroup {
                id,
                label,
                file_changes: vec![change],
            }),
        }
    }

    groups
}

fn top_level_segment(path: &Path) -> String {
    let mut components = path.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(first)), Some(_)) => first.to_string_lossy().into_owned(),
        _ => "(root)".to_string(),
    }
}
