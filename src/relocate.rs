//! Side-branch relocation for runs whose fixes are proposed, not committed
//! in place.
//!
//! Entering stashes local changes and checks out `<prefix><branch>/<purpose>`
//! reset to the current tip. Leaving checks the original branch out again and
//! pops the stash. Leaving happens exactly once, through
//! [`SideBranch::restore`] or on drop.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::context::ServiceContext;
use crate::error::{HookError, HookResult};
use crate::ports::{ChangeRequest, ChangeRequestDraft, GitRepo};

/// Deterministic side-branch name.
#[must_use]
pub fn side_branch_name(prefix: &str, current: &str, purpose: &str) -> String {
    format!("{prefix}{current}/{purpose}")
}

/// Being on a side branch with a clean tree.
pub struct SideBranch<'a> {
    git: &'a dyn GitRepo,
    original: String,
    name: String,
    stashed: bool,
    restored: bool,
}

impl std::fmt::Debug for SideBranch<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SideBranch")
            .field("original", &self.original)
            .field("name", &self.name)
            .field("stashed", &self.stashed)
            .field("restored", &self.restored)
            .finish_non_exhaustive()
    }
}

impl<'a> SideBranch<'a> {
    /// Stashes local changes and switches to the side branch.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::StashOrCheckout`] if the current branch cannot be
    /// read, the stash fails or the side branch cannot be checked out. A
    /// stash made before a failed checkout is popped again.
    pub fn enter(git: &'a dyn GitRepo, prefix: &str, purpose: &str) -> HookResult<Self> {
        let original = git
            .current_branch()
            .map_err(|e| HookError::stash_or_checkout("read the current branch", e))?;
        let name = side_branch_name(prefix, &original, purpose);
        let stashed =
            git.stash().map_err(|e| HookError::stash_or_checkout("stash local changes", e))?;

        let guard = Self { git, original, name, stashed, restored: false };
        git.checkout(&guard.name, true).map_err(|e| {
            HookError::stash_or_checkout(format!("check out side branch '{}'", guard.name), e)
        })?;
        info!(branch = %guard.name, from = %guard.original, stashed, "switched to side branch");
        Ok(guard)
    }

    /// Branch that was checked out on entry.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Name of the side branch.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Checks the original branch out and pops the stash if one was made.
    /// Only the first call does anything.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::StashOrCheckout`] if either step fails. The stash
    /// is not popped when the checkout failed.
    pub fn restore(&mut self) -> HookResult<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;

        self.git.checkout(&self.original, false).map_err(|e| {
            HookError::stash_or_checkout(format!("check out original branch '{}'", self.original), e)
        })?;
        if self.stashed {
            self.git.stash_pop().map_err(|e| HookError::stash_or_checkout("pop stash", e))?;
        }
        info!(branch = %self.original, "restored original branch");
        Ok(())
    }
}

impl Drop for SideBranch<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!(error = %e, "failed to restore original branch");
        }
    }
}

/// Runs `work` on a side branch and always restores the original branch.
///
/// An error from `work` wins over an error from restoring.
///
/// # Errors
///
/// Returns the error of `work`, or [`HookError::StashOrCheckout`] from
/// entering or leaving the side branch.
pub fn with_side_branch<T>(
    git: &dyn GitRepo,
    prefix: &str,
    purpose: &str,
    work: impl FnOnce(&SideBranch<'_>) -> HookResult<T>,
) -> HookResult<T> {
    let mut branch = SideBranch::enter(git, prefix, purpose)?;
    let result = work(&branch);
    let restored = branch.restore();
    match (result, restored) {
        (Err(e), Err(restore_err)) => {
            warn!(error = %restore_err, "restore failed after an earlier error");
            Err(e)
        }
        (Ok(_), Err(restore_err)) => Err(restore_err),
        (result, Ok(())) => result,
    }
}

/// A side branch that was pushed and proposed for merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// The pushed side branch.
    pub branch: String,
    /// Branch the change request targets.
    pub base: String,
    /// Commit the remote branch points at.
    pub commit: String,
    /// The opened change request.
    pub change_request: ChangeRequest,
}

/// Pushes the side branch and opens a change request against the original
/// branch. The title is the first line of `message`, the body the rest.
///
/// # Errors
///
/// Returns [`HookError::Repository`] if the push fails and
/// [`HookError::ChangeRequest`] if the code host refuses the request.
pub fn propose(ctx: &ServiceContext, branch: &SideBranch<'_>, message: &str) -> HookResult<Proposal> {
    // The side branch was reset to the original tip, so the remote copy may diverge.
    let commit = ctx
        .git
        .push(&ctx.settings.remote, true, true)
        .map_err(|e| HookError::repository("push", e))?;
    info!(branch = %branch.name(), remote = %ctx.settings.remote, %commit, "pushed side branch");

    let (title, body) = split_message(message);
    let draft = ChangeRequestDraft {
        head: branch.name().to_string(),
        base: branch.original().to_string(),
        title,
        body,
    };
    let change_request = ctx
        .change_requests
        .create_change_request(&draft)
        .map_err(|e| HookError::ChangeRequest(e.to_string()))?;
    info!(id = %change_request.id, url = %change_request.url, "opened change request");

    Ok(Proposal { branch: draft.head, base: draft.base, commit, change_request })
}

/// Splits a commit message into a title line and a body.
#[must_use]
pub fn split_message(message: &str) -> (String, String) {
    let message = message.trim();
    match message.split_once('\n') {
        Some((title, body)) => (title.trim().to_string(), body.trim().to_string()),
        None => (message.to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;
    use crate::adapters::recording::RecordingGitRepo;
    use crate::adapters::replaying::ReplayingGitRepo;
    use crate::cassette::recorder::CassetteRecorder;
    use crate::cassette::replayer::CassetteReplayer;

    fn git_from(calls: &[(&str, serde_json::Value)]) -> (RecordingGitRepo, Arc<Mutex<CassetteRecorder>>) {
        let mut script = CassetteRecorder::new("unused.yaml", "relocate", "abc");
        for (method, output) in calls {
            script.record("git", *method, json!({}), output.clone());
        }
        let replaying = ReplayingGitRepo::new(CassetteReplayer::new(&script.into_cassette()));
        let log = Arc::new(Mutex::new(CassetteRecorder::new("unused.yaml", "log", "abc")));
        (RecordingGitRepo::new(Box::new(replaying), Arc::clone(&log)), log)
    }

    fn methods(log: &Arc<Mutex<CassetteRecorder>>) -> Vec<String> {
        log.lock().unwrap().interactions().iter().map(|i| i.method.clone()).collect()
    }

    #[test]
    fn message_splits_into_title_and_body() {
        assert_eq!(
            split_message("style: apply hooks\n\nAutomated by hooksync.\n"),
            ("style: apply hooks".to_string(), "Automated by hooksync.".to_string())
        );
        assert_eq!(split_message("one line"), ("one line".to_string(), String::new()));
    }

    #[test]
    fn name_is_prefix_branch_purpose() {
        assert_eq!(side_branch_name("auto-update/", "main", "hooks"), "auto-update/main/hooks");
    }

    #[test]
    fn work_runs_on_side_branch_then_everything_is_restored() {
        let (git, log) = git_from(&[
            ("current_branch", json!({"ok": "feature"})),
            ("stash", json!({"ok": true})),
            ("checkout", json!({"ok": null})),
            ("checkout", json!({"ok": null})),
            ("stash_pop", json!({"ok": null})),
        ]);

        let seen = with_side_branch(&git, "ci/", "hooks", |branch| {
            Ok((branch.name().to_string(), branch.original().to_string()))
        })
        .unwrap();

        assert_eq!(seen, ("ci/feature/hooks".to_string(), "feature".to_string()));
        assert_eq!(methods(&log), ["current_branch", "stash", "checkout", "checkout", "stash_pop"]);
        let inputs: Vec<_> =
            log.lock().unwrap().interactions().iter().map(|i| i.input.clone()).collect();
        assert_eq!(inputs[2], json!({"branch": "ci/feature/hooks", "reset": true}));
        assert_eq!(inputs[3], json!({"branch": "feature", "reset": false}));
    }

    #[test]
    fn empty_stash_is_not_popped() {
        let (git, log) = git_from(&[
            ("current_branch", json!({"ok": "main"})),
            ("stash", json!({"ok": false})),
            ("checkout", json!({"ok": null})),
            ("checkout", json!({"ok": null})),
        ]);
        with_side_branch(&git, "auto-update/", "dynamic", |_| Ok(())).unwrap();
        assert_eq!(methods(&log), ["current_branch", "stash", "checkout", "checkout"]);
    }

    #[test]
    fn work_error_still_restores_and_wins_over_pop_conflict() {
        let (git, log) = git_from(&[
            ("current_branch", json!({"ok": "main"})),
            ("stash", json!({"ok": true})),
            ("checkout", json!({"ok": null})),
            ("checkout", json!({"ok": null})),
            ("stash_pop", json!({"err": "CONFLICT (content): Merge conflict in README.md"})),
        ]);

        let err = with_side_branch(&git, "auto-update/", "hooks", |_| -> HookResult<()> {
            Err(HookError::UnexpectedToolError("An unexpected error has occurred".into()))
        })
        .unwrap_err();

        assert!(matches!(err, HookError::UnexpectedToolError(_)));
        assert_eq!(methods(&log).last().map(String::as_str), Some("stash_pop"));
    }

    #[test]
    fn pop_conflict_alone_is_surfaced() {
        let (git, _log) = git_from(&[
            ("current_branch", json!({"ok": "main"})),
            ("stash", json!({"ok": true})),
            ("checkout", json!({"ok": null})),
            ("checkout", json!({"ok": null})),
            ("stash_pop", json!({"err": "conflict"})),
        ]);
        let err = with_side_branch(&git, "auto-update/", "hooks", |_| Ok(())).unwrap_err();
        assert_eq!(err.to_string(), "failed to pop stash: conflict");
    }

    #[test]
    fn failed_checkout_pops_the_stash_again() {
        let (git, log) = git_from(&[
            ("current_branch", json!({"ok": "main"})),
            ("stash", json!({"ok": true})),
            ("checkout", json!({"err": "invalid reference"})),
            ("checkout", json!({"ok": null})),
            ("stash_pop", json!({"ok": null})),
        ]);
        let err = with_side_branch(&git, "auto-update/", "hooks", |_| Ok(())).unwrap_err();
        assert!(matches!(err, HookError::StashOrCheckout { .. }));
        assert_eq!(methods(&log), ["current_branch", "stash", "checkout", "checkout", "stash_pop"]);
    }
}
