//! Heuristic commit message synthesis and git staging/commit operations.

use std::collections::HashSet;
use std::path::Path;

use git2::{Commit, ErrorCode, Index, Oid, Repository, Signature, Tree};
use tracing::{debug, info, warn};

use crate::commit::changes::{FileChangeDescriptor, FileStatus};
use crate::error::CommitError;

/// Message used when nothing was selected.
pub const EMPTY_SELECTION_MESSAGE: &str = "Update repository";

/// Suggest a commit message from the selected file changes.
///
/// This is a label generator: it looks at file extensions and statuses only,
/// never at content.
///
/// - no changes: `Update repository`
/// - one change: `<action> <path>`
/// - several: `<action> <count> <ext, ext> files`
///
/// where `<action>` is `Add`, `Update`, or `Add and update`. When no file has
/// an extension the extension segment is empty, leaving a double space.
pub fn synthesize_commit_message(changes: &[FileChangeDescriptor]) -> String {
    if changes.is_empty() {
        return EMPTY_SELECTION_MESSAGE.to_string();
    }

    let mut file_types: Vec<&str> = Vec::new();
    let mut seen_types = HashSet::new();
    let mut has_new = false;
    let mut has_modified = false;

    for change in changes {
        if let Some(ext) = extension(&change.path)
            && seen_types.insert(ext)
        {
            file_types.push(ext);
        }

        match change.status {
            FileStatus::New => has_new = true,
            FileStatus::Modified => has_modified = true,
        }
    }

    let action = match (has_new, has_modified) {
        (true, true) => "Add and update",
        (true, false) => "Add",
        _ => "Update",
    };

    if let [only] = changes {
        format!("{action} {}", only.path)
    } else {
        format!(
            "{action} {} {} files",
            changes.len(),
            file_types.join(", ")
        )
    }
}

/// Extension of the final path component, as written.
///
/// Dotfiles (`.gitignore`) and names ending in a dot have no extension.
fn extension(path: &str) -> Option<&str> {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
}

/// A commit that is fully prepared but not yet written to HEAD.
///
/// Staging happens on the repository's in-memory index. Nothing on disk
/// changes until [`StagedCommit::commit`] runs, and dropping an uncommitted
/// `StagedCommit` reloads the index from disk.
pub struct StagedCommit<'repo> {
    repo: &'repo Repository,
    index: Index,
    tree: Tree<'repo>,
    signature: Signature<'static>,
    parent: Option<Commit<'repo>>,
    committed: bool,
}

impl StagedCommit<'_> {
    /// Create the commit on HEAD and persist the staged index.
    pub fn commit(mut self, message: &str) -> Result<Oid, CommitError> {
        if message.trim().is_empty() {
            return Err(CommitError::EmptyMessage);
        }

        let parents: Vec<&Commit<'_>> = self.parent.iter().collect();
        let oid = self
            .repo
            .commit(
                Some("HEAD"),
                &self.signature,
                &self.signature,
                message,
                &self.tree,
                &parents,
            )
            .map_err(CommitError::CommitFailed)?;
        self.committed = true;
        self.index.write().map_err(CommitError::IndexFailed)?;

        info!("Created commit {} with {} entries", oid, self.tree.len());
        Ok(oid)
    }
}

impl Drop for StagedCommit<'_> {
    fn drop(&mut self) {
        if !self.committed {
            discard_staged(&mut self.index);
        }
    }
}

fn discard_staged(index: &mut Index) {
    if let Err(e) = index.read(true) {
        warn!("Failed to reload index after abandoned staging: {e}");
    }
}

/// Stage exactly `paths` and prepare a commit on HEAD.
///
/// Paths are relative to the repository root. A path that no longer exists
/// in the work tree is staged as a removal. Untracked paths matched by
/// `.gitignore` are refused, as `git add` does. The tree, the author
/// signature, and the parent are all resolved here, so every failure that
/// does not depend on the message surfaces before anything is written.
pub fn stage_paths<'repo>(
    repo: &'repo Repository,
    paths: &[String],
) -> Result<StagedCommit<'repo>, CommitError> {
    if paths.is_empty() {
        return Err(CommitError::NoChanges);
    }

    let mut index = repo.index().map_err(CommitError::IndexFailed)?;

    for path in paths {
        let rel = Path::new(path);
        if index.get_path(rel, 0).is_some() {
            continue;
        }
        let ignored = repo
            .status_should_ignore(rel)
            .map_err(|source| CommitError::StagingFailed {
                path: path.clone(),
                source,
            })?;
        if ignored {
            return Err(CommitError::IgnoredPath(path.clone()));
        }
    }

    match prepare(repo, &mut index, paths) {
        Ok((tree, signature, parent)) => Ok(StagedCommit {
            repo,
            index,
            tree,
            signature,
            parent,
            committed: false,
        }),
        Err(e) => {
            discard_staged(&mut index);
            Err(e)
        }
    }
}

type Prepared<'repo> = (Tree<'repo>, Signature<'static>, Option<Commit<'repo>>);

fn prepare<'repo>(
    repo: &'repo Repository,
    index: &mut Index,
    paths: &[String],
) -> Result<Prepared<'repo>, CommitError> {
    let workdir = repo.workdir();

    for path in paths {
        let rel = Path::new(path);
        let exists = workdir.is_some_and(|w| w.join(rel).exists());
        let staged = if exists {
            index.add_path(rel)
        } else {
            index.remove_path(rel)
        };
        staged.map_err(|source| CommitError::StagingFailed {
            path: path.clone(),
            source,
        })?;
    }

    let tree_id = index.write_tree().map_err(CommitError::IndexFailed)?;
    let tree = repo.find_tree(tree_id).map_err(CommitError::CommitFailed)?;

    let signature = repo.signature().map_err(CommitError::ConfigError)?;

    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit().map_err(CommitError::CommitFailed)?),
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            debug!("HEAD is unborn; creating root commit");
            None
        }
        Err(e) => return Err(CommitError::CommitFailed(e)),
    };

    Ok((tree, signature, parent))
}

/// Stage exactly `paths` and create a commit on HEAD.
pub fn stage_paths_and_commit(
    repo: &Repository,
    paths: &[String],
    message: &str,
) -> Result<Oid, CommitError> {
    if message.trim().is_empty() {
        return Err(CommitError::EmptyMessage);
    }
    stage_paths(repo, paths)?.commit(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(path: &str, status: FileStatus) -> FileChangeDescriptor {
        FileChangeDescriptor::new(path, status)
    }

    #[test]
    fn test_empty_selection() {
        assert_eq!(synthesize_commit_message(&[]), "Update repository");
    }

    #[test]
    fn test_single_new_file() {
        let msg = synthesize_commit_message(&[change("a.js", FileStatus::New)]);
        assert_eq!(msg, "Add a.js");
    }

    #[test]
    fn test_single_modified_file() {
        let msg = synthesize_commit_message(&[change("a.js", FileStatus::Modified)]);
        assert_eq!(msg, "Update a.js");
    }

    #[test]
    fn test_single_file_uses_full_path() {
        let msg = synthesize_commit_message(&[change("src/lib/util.rs", FileStatus::New)]);
        assert_eq!(msg, "Add src/lib/util.rs");
    }

    #[test]
    fn test_mixed_statuses() {
        let msg = synthesize_commit_message(&[
            change("a.js", FileStatus::New),
            change("b.js", FileStatus::Modified),
        ]);
        assert_eq!(msg, "Add and update 2 js files");
    }

    #[test]
    fn test_multiple_new_files_list_types_in_first_seen_order() {
        let msg = synthesize_commit_message(&[
            change("style.css", FileStatus::New),
            change("app.js", FileStatus::New),
            change("more.css", FileStatus::New),
        ]);
        assert_eq!(msg, "Add 3 css, js files");
    }

    #[test]
    fn test_multiple_modified_files() {
        let msg = synthesize_commit_message(&[
            change("a.rs", FileStatus::Modified),
            change("b.toml", FileStatus::Modified),
        ]);
        assert_eq!(msg, "Update 2 rs, toml files");
    }

    #[test]
    fn test_extension_is_case_sensitive() {
        let msg = synthesize_commit_message(&[
            change("A.JS", FileStatus::Modified),
            change("b.js", FileStatus::Modified),
        ]);
        assert_eq!(msg, "Update 2 JS, js files");
    }

    #[test]
    fn test_no_extensions_leaves_empty_segment() {
        let msg = synthesize_commit_message(&[
            change("Makefile", FileStatus::Modified),
            change(".gitignore", FileStatus::Modified),
        ]);
        assert_eq!(msg, "Update 2  files");
    }

    #[test]
    fn test_extension_only_from_file_name() {
        assert_eq!(extension("v1.2/README"), None);
        assert_eq!(extension("archive.tar.gz"), Some("gz"));
        assert_eq!(extension("trailing."), None);
        assert_eq!(extension(".env"), None);
    }

    #[test]
    fn test_synthesize_is_deterministic() {
        let changes = vec![
            change("x.py", FileStatus::New),
            change("y.md", FileStatus::Modified),
            change("z.py", FileStatus::Modified),
        ];
        let first = synthesize_commit_message(&changes);
        for _ in 0..5 {
            assert_eq!(synthesize_commit_message(&changes), first);
        }
    }

    fn configured_repo() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@test.com").unwrap();
        (dir, repo)
    }

    #[test]
    fn test_stage_paths_and_commit_on_unborn_branch() {
        let (dir, repo) = configured_repo();
        std::fs::write(dir.path().join("first.txt"), "hello\n").unwrap();

        let oid = stage_paths_and_commit(&repo, &["first.txt".to_string()], "Add first.txt")
            .unwrap();
        let commit = repo.find_commit(oid).unwrap();
        assert_eq!(commit.message().unwrap(), "Add first.txt");
        assert_eq!(commit.parent_count(), 0);
    }

    #[test]
    fn test_stage_paths_and_commit_only_selected_paths() {
        let (dir, repo) = configured_repo();
        let sig = Signature::now("Test User", "test@test.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
            .unwrap();

        std::fs::write(dir.path().join("keep.txt"), "keep\n").unwrap();
        std::fs::write(dir.path().join("skip.txt"), "skip\n").unwrap();

        let oid = stage_paths_and_commit(&repo, &["keep.txt".to_string()], "Add keep.txt")
            .unwrap();
        let tree = repo.find_commit(oid).unwrap().tree().unwrap();
        assert!(tree.get_name("keep.txt").is_some());
        assert!(tree.get_name("skip.txt").is_none());
    }

    #[test]
    fn test_stage_paths_and_commit_rejects_empty_message() {
        let (dir, repo) = configured_repo();
        std::fs::write(dir.path().join("a.txt"), "a\n").unwrap();

        let result = stage_paths_and_commit(&repo, &["a.txt".to_string()], "   ");
        assert!(matches!(result, Err(CommitError::EmptyMessage)));
    }

    #[test]
    fn test_stage_paths_and_commit_rejects_empty_selection() {
        let (_dir, repo) = configured_repo();
        let result = stage_paths_and_commit(&repo, &[], "msg");
        assert!(matches!(result, Err(CommitError::NoChanges)));
    }

    #[test]
    fn test_stage_paths_refuses_ignored_file() {
        let (dir, repo) = configured_repo();
        std::fs::write(dir.path().join(".gitignore"), ".env\n").unwrap();
        std::fs::write(dir.path().join(".env"), "TOKEN=secret\n").unwrap();
        std::fs::write(dir.path().join("app.js"), "run();\n").unwrap();

        let result = stage_paths(&repo, &["app.js".to_string(), ".env".to_string()]);
        assert!(matches!(result, Err(CommitError::IgnoredPath(ref p)) if p == ".env"));
        assert!(repo.head().is_err());
        assert!(repo.index().unwrap().get_path(Path::new("app.js"), 0).is_none());
    }

    #[test]
    fn test_stage_paths_allows_tracked_file_matching_ignore_rule() {
        let (dir, repo) = configured_repo();
        std::fs::write(dir.path().join("build.log"), "v1\n").unwrap();
        stage_paths_and_commit(&repo, &["build.log".to_string()], "Add build.log").unwrap();

        std::fs::write(dir.path().join(".gitignore"), "*.log\n").unwrap();
        std::fs::write(dir.path().join("build.log"), "v2\n").unwrap();

        let oid = stage_paths_and_commit(&repo, &["build.log".to_string()], "Update build.log")
            .unwrap();
        assert_eq!(repo.find_commit(oid).unwrap().parent_count(), 1);
    }

    #[test]
    fn test_staging_leaves_disk_untouched_until_commit() {
        let (dir, repo) = configured_repo();
        std::fs::write(dir.path().join("a.txt"), "a\n").unwrap();

        let staged = stage_paths(&repo, &["a.txt".to_string()]).unwrap();
        let on_disk = Repository::open(dir.path()).unwrap();
        assert!(on_disk.index().unwrap().get_path(Path::new("a.txt"), 0).is_none());
        assert!(on_disk.head().is_err());

        let oid = staged.commit("Add a.txt").unwrap();
        assert!(repo.index().unwrap().get_path(Path::new("a.txt"), 0).is_some());
        let on_disk = Repository::open(dir.path()).unwrap();
        assert!(on_disk.index().unwrap().get_path(Path::new("a.txt"), 0).is_some());
        assert_eq!(on_disk.head().unwrap().target(), Some(oid));
    }

    #[test]
    fn test_stage_paths_reports_missing_identity() {
        let (dir, repo) = configured_repo();
        repo.config().unwrap().set_str("user.name", "").unwrap();
        std::fs::write(dir.path().join("a.txt"), "a\n").unwrap();

        let result = stage_paths(&repo, &["a.txt".to_string()]);
        assert!(matches!(result, Err(CommitError::ConfigError(_))));
        assert!(repo.index().unwrap().get_path(Path::new("a.txt"), 0).is_none());
    }
}
