//! Repository discovery and path handling.

use std::path::{Component, Path, PathBuf};

use git2::Repository;
use tracing::debug;

use crate::error::GitError;

/// Open the repository containing `path`.
///
/// Discovery walks up from `path` like `git` itself does, so any directory
/// inside a work tree is accepted. Bare repositories are rejected because
/// selected files must live in a work tree.
pub fn open_repository(path: &Path) -> Result<Repository, GitError> {
    let repo = Repository::discover(path).map_err(|source| GitError::NotARepository {
        path: path.to_path_buf(),
        source,
    })?;

    if repo.is_bare() {
        return Err(GitError::BareRepository(repo.path().to_path_buf()));
    }

    debug!(
        "Opened repository at {}",
        repo.workdir().unwrap_or_else(|| repo.path()).display()
    );
    Ok(repo)
}

/// The work tree root of a non-bare repository.
pub fn workdir(repo: &Repository) -> Result<&Path, GitError> {
    repo.workdir()
        .ok_or_else(|| GitError::BareRepository(repo.path().to_path_buf()))
}

/// Turn a selected file path into a repository-root-relative path with `/` separators.
///
/// Relative paths are taken as already relative to the root. Absolute paths
/// must resolve inside `root`. `..` components are folded lexically and may
/// not climb above the root.
pub fn relativize(root: &Path, path: &Path) -> Result<String, GitError> {
    let outside = || GitError::OutsideRepository {
        path: path.to_path_buf(),
        root: root.to_path_buf(),
    };

    let relative: PathBuf = if path.is_relative() {
        path.to_path_buf()
    } else {
        let canonical_root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        let canonical_path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        canonical_path
            .strip_prefix(&canonical_root)
            .or_else(|_| path.strip_prefix(root))
            .map_err(|_| outside())?
            .to_path_buf()
    };

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(outside());
                }
            }
            _ => return Err(outside()),
        }
    }

    if parts.is_empty() {
        return Err(outside());
    }

    Ok(parts.join("/"))
}

/// Anchor a command-line path at the current directory.
///
/// Absolute paths are returned unchanged.
pub fn resolve_from_cwd(path: &Path) -> Result<PathBuf, GitError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(GitError::CurrentDir)?;
    Ok(cwd.join(path))
}

/// Display name of a repository: the last component of its root.
pub fn repository_name(root: &Path) -> String {
    root.components()
        .rev()
        .find_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .unwrap_or_else(|| "repository".to_string())
}
