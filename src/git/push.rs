//! Pushing committed changes.
//!
//! Pushing shells out to the system `git` binary, inheriting the user's
//! existing git config, SSH agent, and credential store.

use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use crate::error::PushError;

/// Capability to publish local commits to the configured upstream.
#[cfg_attr(test, mockall::automock)]
pub trait Pusher {
    fn push(&self, workdir: &Path) -> Result<(), PushError>;
}

/// Pushes with `git push` using the branch's configured upstream.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitPusher;

impl Pusher for GitPusher {
    fn push(&self, workdir: &Path) -> Result<(), PushError> {
        check_git_installed()?;
        let stderr = run_git(workdir, &["push"], "push")?;
        if !stderr.trim().is_empty() {
            debug!("git push: {}", stderr.trim());
        }
        info!("Pushed {}", workdir.display());
        Ok(())
    }
}

/// Check that `git` is available on PATH.
///
/// Uses the `which` crate for cross-platform executable detection.
pub fn check_git_installed() -> Result<(), PushError> {
    which::which("git")
        .map(|_| ())
        .map_err(|_| PushError::GitNotInstalled)
}

/// Run a git command in `workdir`, returning its stderr on success.
///
/// git reports push progress on stderr, so a successful run still has output.
fn run_git(workdir: &Path, args: &[&str], operation: &str) -> Result<String, PushError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(workdir)
        .args(args)
        .output()
        .map_err(PushError::SpawnFailed)?;

    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    if !output.status.success() {
        return Err(PushError::PushFailed(format!(
            "git {} exited with {}: {}",
            operation,
            output
                .status
                .code()
                .map_or("signal".to_string(), |c| c.to_string()),
            stderr.trim()
        )));
    }

    Ok(stderr)
}
