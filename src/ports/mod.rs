//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the reconciliation engine and an
//! external system (filesystem, git, the hook tool, code hosting, content
//! generation). Implementations live in `src/adapters/`.

pub mod change_request;
pub mod content;
pub mod filesystem;
pub mod git;
pub mod shell;

pub use change_request::{ChangeRequest, ChangeRequestDraft, ChangeRequests};
pub use content::{ContentComparison, ContentGenerator, FileComparison, FileStatus};
pub use filesystem::FileSystem;
pub use git::{CommitRequest, GitRepo};
pub use shell::{ShellExecutor, ShellOutput};

/// Error type returned by every port method.
pub type PortError = Box<dyn std::error::Error + Send + Sync>;
