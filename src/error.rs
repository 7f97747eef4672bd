//! Error types for easygit modules using thiserror.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors from repository access and status inspection.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Selected directory is not a Git repository: {path}")]
    NotARepository {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("Bare repositories are not supported: {0}")]
    BareRepository(PathBuf),

    #[error("Path {path} is outside the repository at {root}")]
    OutsideRepository { path: PathBuf, root: PathBuf },

    #[error("Failed to read the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    #[error("Failed to read repository status: {0}")]
    StatusFailed(#[source] git2::Error),
}

/// Errors from staging and committing selected files.
#[derive(Error, Debug)]
pub enum CommitError {
    #[error("No files selected to commit")]
    NoChanges,

    #[error("Commit message is empty")]
    EmptyMessage,

    #[error("'{0}' is ignored by .gitignore and cannot be committed")]
    IgnoredPath(String),

    #[error("Failed to stage '{path}': {source}")]
    StagingFailed {
        path: String,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to write index: {0}")]
    IndexFailed(#[source] git2::Error),

    #[error("Failed to create commit: {0}")]
    CommitFailed(#[source] git2::Error),

    #[error("Git config error (missing user.name or user.email): {0}")]
    ConfigError(#[source] git2::Error),
}

/// Errors from pushing to the remote with the system git binary.
#[derive(Error, Debug)]
pub enum PushError {
    #[error("git was not found in PATH. Install git to push changes.")]
    GitNotInstalled,

    #[error("Failed to spawn git: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("git push failed: {0}")]
    PushFailed(String),
}

/// Errors from the persisted profile store.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Failed to read profile store {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write profile store {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Profile store {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize '{key}': {source}")]
    SerializeFailed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} is required")]
    MissingField(&'static str),
}

/// Errors from pricing state transitions.
#[derive(Error, Debug)]
pub enum PricingError {
    #[error("Free usage is not available until {until}")]
    FreeUsageUnavailable { until: DateTime<Utc> },
}

/// Errors from the payment capability.
#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Invalid payment amount: {0}")]
    InvalidAmount(f64),

    #[error("Payment provider error: {0}")]
    Provider(String),
}

/// Errors from the end-to-end update workflow.
#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("Please select a repository and files first")]
    NoFilesSelected,

    #[error("None of the selected files are new or modified")]
    NothingToCommit,

    #[error("Please provide a commit message")]
    EmptyMessage,

    #[error("A payment method is required for a paid update (price: ${0:.2})")]
    PaymentMethodRequired(f64),

    #[error("Payment failed. Please try again.")]
    PaymentDeclined,

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Commit(#[from] CommitError),

    #[error(transparent)]
    Push(#[from] PushError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Payment(#[from] PaymentError),
}
