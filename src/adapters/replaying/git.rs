//! Replaying adapter for the `GitRepo` port.

use std::sync::Mutex;

use super::replay_result;
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{CommitRequest, GitRepo, PortError};

/// Replays recorded git operations from a cassette.
pub struct ReplayingGitRepo {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingGitRepo {
    /// Creates a new replaying git repo from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl GitRepo for ReplayingGitRepo {
    fn current_commit(&self) -> Result<String, PortError> {
        replay_result(&self.replayer, "git", "current_commit")
    }

    fn current_branch(&self) -> Result<String, PortError> {
        replay_result(&self.replayer, "git", "current_branch")
    }

    fn checkout(&self, _branch: &str, _reset: bool) -> Result<(), PortError> {
        replay_result(&self.replayer, "git", "checkout")
    }

    fn stash(&self) -> Result<bool, PortError> {
        replay_result(&self.replayer, "git", "stash")
    }

    fn stash_pop(&self) -> Result<(), PortError> {
        replay_result(&self.replayer, "git", "stash_pop")
    }

    fn discard_changes(&self) -> Result<(), PortError> {
        replay_result(&self.replayer, "git", "discard_changes")
    }

    fn commit(&self, _request: &CommitRequest) -> Result<String, PortError> {
        replay_result(&self.replayer, "git", "commit")
    }

    fn push(&self, _remote: &str, _set_upstream: bool, _force: bool) -> Result<String, PortError> {
        replay_result(&self.replayer, "git", "push")
    }
}
