//! Working tree status: which paths are new, modified, or conflicted.

use std::collections::BTreeSet;

use git2::{Repository, Status, StatusOptions};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::GitError;

const NEW_FLAGS: Status = Status::WT_NEW.union(Status::INDEX_NEW);

const MODIFIED_FLAGS: Status = Status::WT_MODIFIED
    .union(Status::INDEX_MODIFIED)
    .union(Status::WT_TYPECHANGE)
    .union(Status::INDEX_TYPECHANGE);

/// Snapshot of the repository status, as root-relative paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepoStatus {
    pub new: BTreeSet<String>,
    pub modified: BTreeSet<String>,
    pub conflicted: BTreeSet<String>,
}

impl RepoStatus {
    pub fn is_new(&self, path: &str) -> bool {
        self.new.contains(path)
    }

    pub fn is_modified(&self, path: &str) -> bool {
        self.modified.contains(path)
    }

    /// Whether the repository reports any unmerged paths.
    pub fn has_conflicts(&self) -> bool {
        !self.conflicted.is_empty()
    }
}

/// Query the working tree status, including untracked files.
pub fn inspect_status(repo: &Repository) -> Result<RepoStatus, GitError> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false);

    let statuses = repo
        .statuses(Some(&mut opts))
        .map_err(GitError::StatusFailed)?;

    let mut status = RepoStatus::default();

    for entry in statuses.iter() {
        let Some(path) = entry.path() else {
            warn!("Skipping status entry with a non-UTF-8 path");
            continue;
        };
        let flags = entry.status();

        if flags.is_conflicted() {
            status.conflicted.insert(path.to_string());
        }

        if flags.intersects(NEW_FLAGS) {
            status.new.insert(path.to_string());
        } else if flags.intersects(MODIFIED_FLAGS) {
            status.modified.insert(path.to_string());
        }
    }

    debug!(
        "Status: {} new, {} modified, {} conflicted",
        status.new.len(),
        status.modified.len(),
        status.conflicted.len()
    );

    Ok(status)
}
