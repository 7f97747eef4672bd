//! easygit - commit and push selected changes with a suggested message and a usage-based price.
//!
//! # Overview
//!
//! easygit inspects a local git repository, builds a commit message from the
//! selected files' statuses and extensions, prices the change from file sizes
//! and conflict state, and then commits and pushes. Usage history and the free
//! usage window live in a small persisted profile store.

pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod payment;
pub mod pricing;
pub mod profile;
pub mod update;

// Re-export commonly used types
pub use commit::{FileChangeDescriptor, FileStatus, synthesize_commit_message};
pub use error::{
    CommitError, GitError, PaymentError, PricingError, ProfileError, PushError, UpdateError,
};
pub use pricing::{FreeUsageWindow, UsageResult, estimate_usage_cost};
pub use profile::{Profile, UsageRecord, UserProfile};
pub use update::{UpdateOutcome, UpdatePlan, execute_update, plan_update};
