//! Repository access: opening, status inspection, and pushing.

pub mod push;
pub mod repo;
pub mod status;

pub use push::{GitPusher, Pusher, check_git_installed};
pub use repo::{open_repository, relativize, repository_name, resolve_from_cwd, workdir};
pub use status::{RepoStatus, inspect_status};
