//! Error types for the reconciliation engine.

use std::path::PathBuf;

/// Errors that terminate a reconciliation run.
///
/// None of these are retried; cleanup (temporary config, branch and stash
/// restoration) still runs before the error reaches the caller.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// A config path given by the caller does not exist.
    #[error("hook config file not found at '{}'", .0.display())]
    ConfigNotFound(PathBuf),

    /// The temporary config file could not be written or removed.
    #[error("failed to materialize hook config at '{}': {reason}", .path.display())]
    ConfigWrite { path: PathBuf, reason: String },

    /// The hook tool cannot be started.
    #[error("{tool} is not installed: {reason}")]
    ToolNotInstalled { tool: String, reason: String },

    /// The hook tool crashed or printed a fatal-error line.
    #[error("an unexpected error occurred while running hooks: {0}")]
    UnexpectedToolError(String),

    /// Two records in one run share a hook id.
    #[error("duplicate hook id '{0}' found in tool output")]
    DuplicateCheckId(String),

    /// Unknown policy name or a request the policy cannot carry out.
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    /// Stashing, popping or switching branches failed.
    #[error("failed to {operation}: {reason}")]
    StashOrCheckout { operation: String, reason: String },

    /// Any other git operation failed.
    #[error("git {operation} failed: {reason}")]
    Repository { operation: &'static str, reason: String },

    /// The code host refused the change request.
    #[error("failed to open change request: {0}")]
    ChangeRequest(String),

    /// The dynamic-file generator failed.
    #[error("content generator failed: {0}")]
    Content(String),
}

impl HookError {
    pub(crate) fn repository(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Repository { operation, reason: err.to_string() }
    }

    pub(crate) fn stash_or_checkout(operation: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::StashOrCheckout { operation: operation.into(), reason: err.to_string() }
    }
}

/// Result type for engine operations.
pub type HookResult<T> = std::result::Result<T, HookError>;
