//! Keeps generated ("dynamic") files in sync with their source of truth.
//!
//! Drift is detected by a [`ContentGenerator`]. Depending on the policy it
//! is reported, committed on the current branch, or committed on a side
//! branch and proposed. Hooks then run over the new commit with `Amend`, so
//! their fixes land in the same commit.

pub mod manifest;

use std::fmt::Write;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::context::ServiceContext;
use crate::error::{HookError, HookResult};
use crate::hooks::{coordinator, HookConfig, Policy, ReconciliationRequest, RunOutcome, Scope};
use crate::ports::{CommitRequest, ContentGenerator, FileComparison};
use crate::relocate::{self, Proposal};

/// Side-branch purpose used for dynamic-file updates.
pub const SIDE_BRANCH_PURPOSE: &str = "dynamic";

/// Commit message used when the caller gives none.
pub const DEFAULT_MESSAGE: &str = "chore: sync dynamic files";

/// What a caller asks of one sync.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncRequest {
    /// Fix policy.
    pub policy: Policy,
    /// Message of the sync commit.
    pub commit_message: String,
    /// Hooks to run over the sync commit, if any.
    pub hooks: Option<HookConfig>,
}

impl SyncRequest {
    /// Request with the default commit message and no hooks.
    #[must_use]
    pub fn new(policy: Policy) -> Self {
        Self { policy, commit_message: DEFAULT_MESSAGE.to_string(), hooks: None }
    }

    /// Rejects combinations that cannot run.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::InvalidPolicy`] when `Commit` or `Pull` has an
    /// empty commit message.
    pub fn validate(&self) -> HookResult<()> {
        if self.policy.needs_message() && self.commit_message.trim().is_empty() {
            return Err(HookError::InvalidPolicy(format!(
                "policy '{}' requires a commit message",
                self.policy
            )));
        }
        Ok(())
    }
}

/// Result of [`sync_dynamic_files`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicSync {
    /// Policy the sync used.
    pub policy: Policy,
    /// Whether any generated file differed from the working tree.
    pub drift: bool,
    /// Generator's summary text.
    pub summary: String,
    /// Per-file comparison.
    pub files: Vec<FileComparison>,
    /// Commit on the caller's branch holding the update.
    pub commit_hash: Option<String>,
    /// Hooks run over the sync commit.
    pub hooks: Option<RunOutcome>,
    /// Side branch and change request for `Pull`.
    pub proposal: Option<Proposal>,
}

impl DynamicSync {
    fn skipped() -> Self {
        Self {
            policy: Policy::None,
            drift: false,
            summary: "Dynamic file sync is disabled.".to_string(),
            files: Vec::new(),
            commit_hash: None,
            hooks: None,
            proposal: None,
        }
    }

    /// `false` when drift was found and not fixed on the caller's branch.
    #[must_use]
    pub fn passed(&self) -> bool {
        !(self.drift && matches!(self.policy, Policy::Report | Policy::Fail | Policy::Pull))
    }
}

/// Compares generated files with the working tree and acts on drift as
/// `request.policy` dictates.
///
/// # Errors
///
/// - [`HookError::InvalidPolicy`] for an invalid request.
/// - [`HookError::Content`] if the generator fails.
/// - [`HookError::Repository`] if committing or pushing fails.
/// - Any error of the hook run or the side-branch relocation.
pub fn sync_dynamic_files(
    ctx: &ServiceContext,
    generator: &dyn ContentGenerator,
    request: &SyncRequest,
) -> HookResult<DynamicSync> {
    request.validate()?;
    match request.policy {
        Policy::None => {
            info!("policy is none, dynamic files not checked");
            Ok(DynamicSync::skipped())
        }
        Policy::Pull => relocate::with_side_branch(
            ctx.git.as_ref(),
            &ctx.settings.side_branch_prefix,
            SIDE_BRANCH_PURPOSE,
            |branch| {
                let mut sync = update(ctx, generator, request)?;
                if sync.commit_hash.is_some() {
                    sync.proposal = Some(relocate::propose(ctx, branch, &request.commit_message)?);
                    // The commit lives on the side branch, not the caller's.
                    sync.commit_hash = None;
                }
                Ok(sync)
            },
        ),
        Policy::Report | Policy::Fail | Policy::Commit | Policy::Amend => {
            update(ctx, generator, request)
        }
    }
}

fn update(
    ctx: &ServiceContext,
    generator: &dyn ContentGenerator,
    request: &SyncRequest,
) -> HookResult<DynamicSync> {
    let comparison = generator.compare_files().map_err(|e| HookError::Content(e.to_string()))?;
    let drift = comparison.has_drift();
    info!(drift, "compared dynamic files");

    let mut sync = DynamicSync {
        policy: request.policy,
        drift,
        summary: comparison.summary,
        files: comparison.results,
        commit_hash: None,
        hooks: None,
        proposal: None,
    };
    if !drift || !request.policy.applies_fixes() {
        return Ok(sync);
    }

    generator.apply_changes().map_err(|e| HookError::Content(e.to_string()))?;
    let before = ctx.git.current_commit().map_err(|e| HookError::repository("rev-parse", e))?;
    let after = ctx
        .git
        .commit(&CommitRequest {
            message: request.commit_message.clone(),
            stage_all: true,
            amend: false,
            allow_empty: false,
        })
        .map_err(|e| HookError::repository("commit", e))?;
    info!(commit = %after, "committed dynamic files");

    let mut commit_hash = after.clone();
    if let Some(config) = &request.hooks {
        let hooks_request = ReconciliationRequest::new(Policy::Amend, config.clone())
            .with_scope(Scope::Range { from: before, to: after });
        let outcome = coordinator::run(ctx, &hooks_request)?;
        if let Some(amended) = &outcome.commit_hash {
            commit_hash.clone_from(amended);
        }
        sync.hooks = Some(outcome);
    }
    sync.commit_hash = Some(commit_hash);
    Ok(sync)
}

/// Renders a sync result for a terminal.
#[must_use]
pub fn format_sync(sync: &DynamicSync) -> String {
    let mut out = String::new();
    let verdict = if sync.passed() { "Pass" } else { "Fail" };
    let _ = writeln!(out, "Result: {verdict}");
    let _ = writeln!(out, "{}", sync.summary);
    if let Some(hash) = &sync.commit_hash {
        let _ = writeln!(out, "Commit: {hash}");
    }
    if let Some(proposal) = &sync.proposal {
        let _ = writeln!(
            out,
            "Proposed {} into {}: {}",
            proposal.branch, proposal.base, proposal.change_request.url
        );
    }
    if let Some(hooks) = &sync.hooks {
        let _ = writeln!(out, "Hooks: {}", hooks.counts);
    }
    out
}
