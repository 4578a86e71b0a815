//! Git repository port: the repository handle the engine acts through.

use serde::{Deserialize, Serialize};

use super::PortError;

/// Parameters of a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRequest {
    /// Commit message. Empty together with `amend` keeps the old message.
    pub message: String,
    /// Stage every change (tracked, untracked and deletions) first.
    pub stage_all: bool,
    /// Amend the latest commit instead of creating a new one.
    pub amend: bool,
    /// Allow a commit that records no changes.
    pub allow_empty: bool,
}

/// Read and write access to the working copy of a git repository.
///
/// The engine never caches anything returned from here; every call reflects
/// the repository at that moment.
pub trait GitRepo: Send + Sync {
    /// Returns the hash of the current HEAD commit.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository has no commits or is invalid.
    fn current_commit(&self) -> Result<String, PortError>;

    /// Returns the name of the checked-out branch.
    ///
    /// # Errors
    ///
    /// Returns an error when HEAD is detached or git fails.
    fn current_branch(&self) -> Result<String, PortError>;

    /// Checks out `branch`. With `reset`, the branch is created or reset to
    /// the current HEAD first.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkout fails.
    fn checkout(&self, branch: &str, reset: bool) -> Result<(), PortError>;

    /// Stashes all local changes including untracked files.
    ///
    /// Returns `true` when a stash entry was created and `false` when there
    /// was nothing to stash.
    ///
    /// # Errors
    ///
    /// Returns an error if git refuses to stash.
    fn stash(&self) -> Result<bool, PortError>;

    /// Pops the most recent stash entry.
    ///
    /// # Errors
    ///
    /// Returns an error on conflicts or when there is nothing to pop.
    fn stash_pop(&self) -> Result<(), PortError>;

    /// Throws away every uncommitted change, untracked files included.
    ///
    /// # Errors
    ///
    /// Returns an error if the working tree cannot be reset.
    fn discard_changes(&self) -> Result<(), PortError>;

    /// Creates (or amends) a commit and returns the resulting hash.
    ///
    /// # Errors
    ///
    /// Returns an error if staging or committing fails.
    fn commit(&self, request: &CommitRequest) -> Result<String, PortError>;

    /// Pushes the current branch to `remote` and returns the pushed hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the push is rejected or the remote is unreachable.
    fn push(&self, remote: &str, set_upstream: bool, force: bool) -> Result<String, PortError>;
}
