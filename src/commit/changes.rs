//! Collection of per-file change descriptors for the selected files.

use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use git2::Repository;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::commit::message::synthesize_commit_message;
use crate::error::GitError;
use crate::git::{inspect_status, workdir, RepoStatus};

/// Default number of characters kept as a content sample.
pub const DEFAULT_SAMPLE_LIMIT: usize = 1000;

/// Status of a selected file. Deleted and renamed files are not represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    New,
    Modified,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::New => write!(f, "new"),
            FileStatus::Modified => write!(f, "modified"),
        }
    }
}

/// A selected file that git reports as new or modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChangeDescriptor {
    /// Path relative to the repository root.
    pub path: String,
    pub status: FileStatus,
    /// Leading characters of the file. Empty when the file could not be read.
    #[serde(rename = "content")]
    pub content_sample: String,
}

impl FileChangeDescriptor {
    pub fn new(path: impl Into<String>, status: FileStatus) -> Self {
        Self {
            path: path.into(),
            status,
            content_sample: String::new(),
        }
    }
}

/// Result of analyzing a file selection.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeAnalysis {
    pub changes: Vec<FileChangeDescriptor>,
    #[serde(rename = "suggestedMessage")]
    pub suggested_message: String,
}

/// File-reading capability used for sizes and content samples.
///
/// Every call may fail independently; callers treat a failure as affecting
/// only that one file.
#[cfg_attr(test, mockall::automock)]
pub trait FileSource {
    /// Size of the file in bytes.
    fn size(&self, path: &Path) -> io::Result<u64>;

    /// The first `limit` characters of the file, lossily decoded as UTF-8.
    fn read_prefix(&self, path: &Path, limit: usize) -> io::Result<String>;
}

/// Reads files relative to a repository root on the local file system.
#[derive(Debug, Clone)]
pub struct FsFileSource {
    root: PathBuf,
}

impl FsFileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl FileSource for FsFileSource {
    fn size(&self, path: &Path) -> io::Result<u64> {
        Ok(std::fs::metadata(self.resolve(path))?.len())
    }

    fn read_prefix(&self, path: &Path, limit: usize) -> io::Result<String> {
        // A UTF-8 char is at most 4 bytes, so this many bytes always covers `limit` chars.
        let byte_budget = limit.saturating_mul(4) as u64;
        let mut bytes = Vec::new();
        File::open(self.resolve(path))?
            .take(byte_budget)
            .read_to_end(&mut bytes)?;

        Ok(String::from_utf8_lossy(&bytes).chars().take(limit).collect())
    }
}

/// Build descriptors for the selected files that git reports as new or modified.
///
/// Files that are neither are skipped, and repeated paths keep their first
/// occurrence. A file whose content cannot be read keeps its descriptor with
/// an empty sample.
pub fn collect_changes<F: FileSource + ?Sized>(
    status: &RepoStatus,
    files: &[String],
    source: &F,
    sample_limit: usize,
) -> Vec<FileChangeDescriptor> {
    let mut seen = HashSet::new();
    let mut changes = Vec::new();

    for path in files {
        if !seen.insert(path.as_str()) {
            continue;
        }

        let file_status = if status.is_new(path) {
            FileStatus::New
        } else if status.is_modified(path) {
            FileStatus::Modified
        } else {
            debug!("Skipping {path}: not new or modified");
            continue;
        };

        let content_sample = match source.read_prefix(Path::new(path), sample_limit) {
            Ok(content) => content,
            Err(e) => {
                warn!("Error reading file {path}: {e}");
                String::new()
            }
        };

        changes.push(FileChangeDescriptor {
            path: path.clone(),
            status: file_status,
            content_sample,
        });
    }

    changes
}

/// Inspect the repository, collect descriptors, and suggest a commit message.
pub fn analyze_changes<F: FileSource + ?Sized>(
    repo: &Repository,
    files: &[String],
    source: &F,
    sample_limit: usize,
) -> Result<ChangeAnalysis, GitError> {
    workdir(repo)?;
    let status = inspect_status(repo)?;
    let changes = collect_changes(&status, files, source, sample_limit);
    let suggested_message = synthesize_commit_message(&changes);

    debug!(
        "Analyzed {} selected files, {} changed",
        files.len(),
        changes.len()
    );

    Ok(ChangeAnalysis {
        changes,
        suggested_message,
    })
}
