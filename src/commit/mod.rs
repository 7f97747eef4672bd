//! Change analysis and commit creation for a file selection.

pub mod changes;
pub mod message;

pub use changes::{
    ChangeAnalysis, DEFAULT_SAMPLE_LIMIT, FileChangeDescriptor, FileSource, FileStatus,
    FsFileSource, analyze_changes, collect_changes,
};
pub use message::{
    EMPTY_SELECTION_MESSAGE, StagedCommit, stage_paths, stage_paths_and_commit,
    synthesize_commit_message,
};
