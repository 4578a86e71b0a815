//! Structured results of a hook run and the two-pass merge rule.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Final state of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckOutcome {
    /// The check succeeded.
    Passed,
    /// The check failed without rewriting files.
    Failed,
    /// The check had nothing to do.
    Skipped,
    /// The check failed and rewrote files.
    Modified,
}

impl CheckOutcome {
    /// Name as printed by the tool (and used in count summaries).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "Passed",
            Self::Failed => "Failed",
            Self::Skipped => "Skipped",
            Self::Modified => "Modified",
        }
    }

    /// `Failed` with a modification marker collapses into `Modified`;
    /// nothing else changes.
    #[must_use]
    pub fn refine(self, files_modified: bool) -> Self {
        match self {
            Self::Failed if files_modified => Self::Modified,
            other => other,
        }
    }

    /// Returns `true` for outcomes that make a run fail.
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Failed | Self::Modified)
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed check record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Hook id, unique within a run.
    pub id: String,
    /// Human label of the check.
    pub description: String,
    /// Refined outcome.
    pub outcome: CheckOutcome,
    /// Short qualifier printed between the dot run and the keyword.
    pub message: String,
    /// Exit code of the check, `0` when not reported.
    pub exit_code: i32,
    /// Duration in seconds, `0.0` when not reported.
    pub duration_seconds: f64,
    /// Whether the tool reported that this check modified files.
    pub files_modified: bool,
    /// Free text following the record, trimmed.
    pub detail: String,
}

/// Number of checks per outcome.
///
/// After a two-pass run `modified` holds the fix pass count and
/// `modified_on_validation` the validation pass count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    /// Checks that passed.
    pub passed: usize,
    /// Checks that failed without modifying files.
    pub failed: usize,
    /// Checks that were skipped.
    pub skipped: usize,
    /// Checks that failed and modified files.
    pub modified: usize,
    /// Modified count of the validation pass of a merged run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_on_validation: Option<usize>,
}

impl OutcomeCounts {
    /// Tallies the outcomes of `results`.
    #[must_use]
    pub fn tally(results: &[CheckResult]) -> Self {
        let mut counts = Self::default();
        for result in results {
            match result.outcome {
                CheckOutcome::Passed => counts.passed += 1,
                CheckOutcome::Failed => counts.failed += 1,
                CheckOutcome::Skipped => counts.skipped += 1,
                CheckOutcome::Modified => counts.modified += 1,
            }
        }
        counts
    }

    /// Labelled counts in report order, including zeroes.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, usize)> {
        let mut entries = vec![("Failed", self.failed), ("Modified", self.modified)];
        if let Some(second) = self.modified_on_validation {
            entries.push(("Modified (2nd Run)", second));
        }
        entries.push(("Skipped", self.skipped));
        entries.push(("Passed", self.passed));
        entries
    }

    /// Labelled counts in report order, zeroes omitted.
    #[must_use]
    pub fn nonzero(&self) -> Vec<(&'static str, usize)> {
        self.entries().into_iter().filter(|(_, count)| *count > 0).collect()
    }

    /// Total number of checks counted (validation pass only for merged runs).
    #[must_use]
    pub fn total(&self) -> usize {
        self.passed
            + self.failed
            + self.skipped
            + self.modified_on_validation.unwrap_or(self.modified)
    }
}

impl fmt::Display for OutcomeCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> =
            self.nonzero().into_iter().map(|(label, count)| format!("{count} {label}")).collect();
        if parts.is_empty() {
            return f.write_str("No checks ran.");
        }
        write!(f, "{}.", parts.join(", "))
    }
}

/// Which kind of invocation produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pass {
    /// The tool was allowed to rewrite files.
    Fix,
    /// Read-only confirmation run.
    Validation,
    /// Fix pass followed by a validation pass, merged.
    Merged,
    /// Nothing was invoked.
    Skipped,
}

/// Outcome of one hook run (or of a merged fix + validation run).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Which pass produced this outcome.
    pub pass: Pass,
    /// No check failed or modified files.
    pub passed: bool,
    /// Some check modified files.
    pub modified: bool,
    /// Outcome counts.
    pub counts: OutcomeCounts,
    /// Check results in the order they appeared in the tool output.
    pub results: Vec<CheckResult>,
    /// Results of the fix pass of a merged run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fix_results: Vec<CheckResult>,
    /// Commit created during this run, if any.
    pub commit_hash: Option<String>,
}

impl RunOutcome {
    /// Derives `passed`, `modified` and counts from `results`.
    #[must_use]
    pub fn from_results(pass: Pass, results: Vec<CheckResult>) -> Self {
        let passed = !results.iter().any(|r| r.outcome.is_failure());
        let modified = results.iter().any(|r| r.files_modified);
        Self {
            pass,
            passed,
            modified,
            counts: OutcomeCounts::tally(&results),
            results,
            fix_results: Vec::new(),
            commit_hash: None,
        }
    }

    /// Outcome of a run that invoked nothing.
    #[must_use]
    pub fn skipped() -> Self {
        Self::from_results(Pass::Skipped, Vec::new())
    }

    /// Returns `true` when nothing was invoked.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.pass == Pass::Skipped
    }

    /// Looks up a check by hook id.
    #[must_use]
    pub fn check(&self, id: &str) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.id == id)
    }
}

/// Combines a fix pass and the validation pass that followed it.
///
/// `passed` and the per-check results come from `validation`; `modified` is
/// true if either pass modified files. The fix pass's modified count stays
/// under `modified` while the validation pass's moves to
/// `modified_on_validation`. The commit hash is the one recorded between
/// the passes.
#[must_use]
pub fn merge(fix: RunOutcome, validation: RunOutcome, commit_hash: Option<String>) -> RunOutcome {
    let mut counts = validation.counts;
    counts.modified_on_validation = Some(counts.modified);
    counts.modified = fix.counts.modified;

    RunOutcome {
        pass: Pass::Merged,
        passed: validation.passed,
        modified: validation.modified || fix.modified,
        counts,
        results: validation.results,
        fix_results: fix.results,
        commit_hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(id: &str, outcome: CheckOutcome, files_modified: bool) -> CheckResult {
        CheckResult {
            id: id.into(),
            description: format!("{id} check"),
            outcome,
            message: String::new(),
            exit_code: i32::from(outcome.is_failure()),
            duration_seconds: 0.1,
            files_modified,
            detail: String::new(),
        }
    }

    #[test]
    fn refine_only_upgrades_failed() {
        assert_eq!(CheckOutcome::Failed.refine(true), CheckOutcome::Modified);
        assert_eq!(CheckOutcome::Failed.refine(false), CheckOutcome::Failed);
        assert_eq!(CheckOutcome::Passed.refine(true), CheckOutcome::Passed);
        assert_eq!(CheckOutcome::Skipped.refine(true), CheckOutcome::Skipped);
    }

    #[test]
    fn from_results_derives_flags_and_counts() {
        let outcome = RunOutcome::from_results(
            Pass::Fix,
            vec![
                check("trailing-whitespace", CheckOutcome::Modified, true),
                check("check-yaml", CheckOutcome::Passed, false),
                check("mypy", CheckOutcome::Skipped, false),
            ],
        );
        assert!(!outcome.passed);
        assert!(outcome.modified);
        assert_eq!(outcome.counts.modified, 1);
        assert_eq!(outcome.counts.passed, 1);
        assert_eq!(outcome.counts.skipped, 1);
        assert_eq!(outcome.counts.total(), 3);
    }

    #[test]
    fn skipped_outcome_passes_without_results() {
        let outcome = RunOutcome::skipped();
        assert!(outcome.is_skipped());
        assert!(outcome.passed);
        assert!(!outcome.modified);
        assert!(outcome.counts.nonzero().is_empty());
    }

    #[test]
    fn merge_keeps_fix_modifications_under_their_own_label() {
        let fix = RunOutcome::from_results(
            Pass::Fix,
            vec![
                check("end-of-file-fixer", CheckOutcome::Modified, true),
                check("check-toml", CheckOutcome::Passed, false),
            ],
        );
        let validation = RunOutcome::from_results(
            Pass::Validation,
            vec![
                check("end-of-file-fixer", CheckOutcome::Passed, false),
                check("check-toml", CheckOutcome::Passed, false),
            ],
        );

        let merged = merge(fix, validation, Some("abc123".into()));
        assert_eq!(merged.pass, Pass::Merged);
        assert!(merged.passed);
        assert!(merged.modified);
        assert_eq!(merged.counts.modified, 1);
        assert_eq!(merged.counts.modified_on_validation, Some(0));
        assert_eq!(merged.counts.passed, 2);
        assert_eq!(merged.commit_hash.as_deref(), Some("abc123"));
        assert_eq!(merged.fix_results.len(), 2);
        assert_eq!(merged.counts.to_string(), "1 Modified, 2 Passed.");
    }

    #[test]
    fn merge_takes_failure_from_validation() {
        let fix = RunOutcome::from_results(
            Pass::Fix,
            vec![check("ruff-format", CheckOutcome::Modified, true)],
        );
        let validation = RunOutcome::from_results(
            Pass::Validation,
            vec![check("ruff-format", CheckOutcome::Failed, false)],
        );
        let merged = merge(fix, validation, None);
        assert!(!merged.passed);
        assert!(merged.modified);
        assert_eq!(merged.counts.failed, 1);
    }

    #[test]
    fn counts_display_lists_nonzero_in_report_order() {
        let counts = OutcomeCounts { passed: 2, failed: 1, skipped: 0, modified: 0, ..Default::default() };
        assert_eq!(counts.to_string(), "1 Failed, 2 Passed.");
        assert_eq!(OutcomeCounts::default().to_string(), "No checks ran.");
    }
}
