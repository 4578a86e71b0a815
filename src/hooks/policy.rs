//! What a run may do with the changes hooks make.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::config::HookConfig;
use super::invoker::Scope;
use crate::error::{HookError, HookResult};

/// Fix policy for a reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Do not run hooks at all.
    None,
    /// Run hooks read-only and report.
    Report,
    /// Like `Report`; callers treat a failed run as fatal.
    Fail,
    /// Run hooks, commit their fixes, validate.
    Commit,
    /// Run hooks, fold their fixes into the latest commit, validate.
    Amend,
    /// Like `Commit`, but on a side branch that is pushed and proposed.
    Pull,
}

impl Policy {
    /// Every policy, in documentation order.
    pub const ALL: [Self; 6] =
        [Self::None, Self::Report, Self::Fail, Self::Commit, Self::Amend, Self::Pull];

    /// Lowercase name accepted on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Report => "report",
            Self::Fail => "fail",
            Self::Commit => "commit",
            Self::Amend => "amend",
            Self::Pull => "pull",
        }
    }

    /// Returns `true` for policies that keep the tool's rewrites.
    #[must_use]
    pub fn applies_fixes(self) -> bool {
        matches!(self, Self::Commit | Self::Amend | Self::Pull)
    }

    /// Returns `true` for policies that need a commit message.
    #[must_use]
    pub fn needs_message(self) -> bool {
        matches!(self, Self::Commit | Self::Pull)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Policy {
    type Err = HookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|p| p.as_str() == wanted).ok_or_else(|| {
            let names: Vec<&str> = Self::ALL.iter().map(|p| p.as_str()).collect();
            HookError::InvalidPolicy(format!("unknown policy '{s}' (expected one of: {})", names.join(", ")))
        })
    }
}

/// Everything a caller decides about one reconciliation run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationRequest {
    /// Fix policy.
    pub policy: Policy,
    /// Files to check.
    pub scope: Scope,
    /// Message of the fix commit; may be empty for `Amend`.
    pub commit_message: String,
    /// Hook tool configuration.
    pub config: HookConfig,
}

impl ReconciliationRequest {
    /// Request with an empty commit message over all files.
    #[must_use]
    pub fn new(policy: Policy, config: HookConfig) -> Self {
        Self { policy, scope: Scope::AllFiles, commit_message: String::new(), config }
    }

    /// Sets the commit message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = message.into();
        self
    }

    /// Sets the scope.
    #[must_use]
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Rejects combinations that cannot run.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::InvalidPolicy`] when `Commit` or `Pull` has no
    /// commit message.
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
