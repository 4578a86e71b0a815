//! Plain-text rendering of run outcomes.

use std::fmt::Write;

use super::outcome::{CheckResult, RunOutcome};

/// Renders `outcome` for a terminal.
#[must_use]
pub fn format_outcome(outcome: &RunOutcome) -> String {
    if outcome.is_skipped() {
        return "Hooks were not run.\n".to_string();
    }

    let mut out = String::new();
    let verdict = if outcome.passed { "Pass" } else { "Fail" };
    let modified = if outcome.modified { " (modified files)" } else { "" };
    let _ = writeln!(out, "Result: {verdict}{modified}");
    let _ = writeln!(out, "Summary: {}", outcome.counts);
    if let Some(hash) = &outcome.commit_hash {
        let _ = writeln!(out, "Commit: {hash}");
    }

    if !outcome.results.is_empty() {
        out.push('\n');
    }
    for result in &outcome.results {
        write_check(&mut out, result);
    }
    out
}

fn write_check(out: &mut String, result: &CheckResult) {
    let _ = writeln!(out, "[{}] {} - {}", result.outcome, result.id, result.description);

    let mut facts = Vec::new();
    if !result.message.is_empty() {
        facts.push(result.message.clone());
    }
    if result.exit_code != 0 {
        facts.push(format!("exit code {}", result.exit_code));
    }
    if result.duration_seconds > 0.0 {
        facts.push(format!("{:.2}s", result.duration_seconds));
    }
    if !facts.is_empty() {
        let _ = writeln!(out, "    {}", facts.join(", "));
    }
    for line in result.detail.lines() {
        let _ = writeln!(out, "    | {line}");
    }
}
