//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use git2::{Oid, Repository, Signature};

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository with a configured identity.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");

        let mut config = repo.config().expect("Failed to open repo config");
        config
            .set_str("user.name", "Test User")
            .expect("Failed to set user.name");
        config
            .set_str("user.email", "test@example.com")
            .expect("Failed to set user.email");

        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Write a file relative to the repository root, creating parent directories.
    pub fn write(&self, rel: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Stage the given paths and commit on HEAD. Returns the commit OID.
    pub fn commit_paths(&self, paths: &[&str], message: &str) -> Oid {
        let sig = self.signature();

        let mut index = self.repo.index().expect("Failed to get index");
        for p in paths {
            index.add_path(Path::new(p)).expect("Failed to add file");
        }
        index.write().expect("Failed to write index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Current branch name.
    pub fn branch_name(&self) -> String {
        self.repo
            .head()
            .ok()
            .and_then(|h| h.shorthand().map(|s| s.to_string()))
            .unwrap_or_else(|| "master".to_string())
    }

    /// Leave `path` in a conflicted state by merging two divergent edits.
    ///
    /// Requires an existing commit that tracks `path`.
    pub fn create_conflict(&self, path: &str) {
        let base = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("Conflict setup needs a HEAD commit");
        let main_branch = self.branch_name();

        self.repo
            .branch("other", &base, false)
            .expect("Failed to create branch");

        self.write(path, "ours\n");
        self.commit_paths(&[path], "ours");

        self.repo
            .set_head("refs/heads/other")
            .expect("Failed to switch HEAD");
        self.repo
            .checkout_head(Some(git2::build::CheckoutBuilder::new().force()))
            .expect("Failed to checkout other");
        self.write(path, "theirs\n");
        let theirs = self.commit_paths(&[path], "theirs");

        self.repo
            .set_head(&format!("refs/heads/{main_branch}"))
            .expect("Failed to switch back");
        self.repo
            .checkout_head(Some(git2::build::CheckoutBuilder::new().force()))
            .expect("Failed to checkout main");

        let annotated = self
            .repo
            .find_annotated_commit(theirs)
            .expect("Failed to annotate commit");
        self.repo
            .merge(&[&annotated], None, None)
            .expect("Failed to merge");
        assert!(
            self.repo.index().expect("index").has_conflicts(),
            "merge should leave conflicts"
        );
    }

    /// Add a bare `origin` remote and push the current branch with upstream tracking.
    ///
    /// Returns the bare remote's directory, which must outlive the test.
    pub fn with_origin(&self) -> tempfile::TempDir {
        let remote_dir = tempfile::tempdir().expect("Failed to create remote dir");
        Repository::init_bare(remote_dir.path()).expect("Failed to init bare repo");

        self.repo
            .remote(
                "origin",
                remote_dir.path().to_str().expect("Invalid remote path"),
            )
            .expect("Failed to add origin remote");

        let status = Command::new("git")
            .arg("-C")
            .arg(self.path())
            .args(["push", "-u", "origin", "HEAD"])
            .output()
            .expect("Failed to run git push");
        assert!(
            status.status.success(),
            "git push failed in test setup: {}",
            String::from_utf8_lossy(&status.stderr)
        );

        remote_dir
    }
}
