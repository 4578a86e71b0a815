//! Hook reconciliation engine.
//!
//! The tool is run through [`invoker`], its output read by [`parser`], and
//! the policy carried out by [`coordinator`]. [`reconcile`] is the entry
//! point callers use; it adds side-branch relocation for [`Policy::Pull`].

pub mod config;
pub mod coordinator;
pub mod invoker;
pub mod outcome;
pub mod parser;
pub mod policy;
pub mod report;

pub use config::{HookConfig, MaterializedConfig};
pub use invoker::Scope;
pub use outcome::{CheckOutcome, CheckResult, OutcomeCounts, Pass, RunOutcome};
pub use policy::{Policy, ReconciliationRequest};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::context::ServiceContext;
use crate::error::HookResult;
use crate::relocate::{self, Proposal};

/// Side-branch purpose used for hook fixes.
pub const SIDE_BRANCH_PURPOSE: &str = "hooks";

/// Result of [`reconcile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Policy the run used.
    pub policy: Policy,
    /// Outcome of the hook run.
    pub outcome: RunOutcome,
    /// Side branch and change request opened by a `Pull` run with fixes.
    pub proposal: Option<Proposal>,
}

impl Reconciliation {
    /// `true` when the hooks passed and no fix is waiting on a side branch.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome.passed && self.proposal.is_none()
    }
}

/// Runs the hooks under `request.policy`.
///
/// `Pull` runs on a side branch that is pushed and proposed when the fix
/// pass committed something; the original branch and stash are restored
/// afterwards whatever happens.
///
/// # Errors
///
/// Any [`HookError`](crate::error::HookError) from the run, relocation,
/// push or change request.
pub fn reconcile(ctx: &ServiceContext, request: &ReconciliationRequest) -> HookResult<Reconciliation> {
    request.validate()?;
    let policy = request.policy;
    if policy != Policy::Pull {
        let outcome = coordinator::run(ctx, request)?;
        return Ok(Reconciliation { policy, outcome, proposal: None });
    }

    relocate::with_side_branch(
        ctx.git.as_ref(),
        &ctx.settings.side_branch_prefix,
        SIDE_BRANCH_PURPOSE,
        |branch| {
            let outcome = coordinator::run(ctx, request)?;
            let proposal = if outcome.commit_hash.is_some() {
                Some(relocate::propose(ctx, branch, &request.commit_message)?)
            } else {
                info!("no fixes to propose");
                None
            };
            Ok(Reconciliation { policy, outcome, proposal })
        },
    )
}
