//! Line grammar for the hook tool's verbose progress output.
//!
//! One record per check:
//!
//! ```text
//! <description>...<message?><Passed|Failed|Skipped>
//! - hook id: <id>
//! [- duration: <float>s]
//! [- exit code: <int>]
//! [- files were modified by this hook]
//! <detail lines until the next header line>
//! ```
//!
//! The description ends at the first run of three or more dots. The outcome
//! keyword ends the header line. A header that is not directly followed by a
//! `- hook id:` line is not a record; it only ends the previous detail block.

use std::collections::HashSet;

use tracing::debug;

use super::outcome::{CheckOutcome, CheckResult, Pass, RunOutcome};
use crate::error::{HookError, HookResult};

const KEYWORDS: [(&str, CheckOutcome); 3] = [
    ("Passed", CheckOutcome::Passed),
    ("Failed", CheckOutcome::Failed),
    ("Skipped", CheckOutcome::Skipped),
];

const MIN_DOT_RUN: usize = 3;

/// A recognised `<description>...<message><keyword>` line.
#[derive(Debug, Clone, PartialEq)]
struct Header<'a> {
    description: &'a str,
    message: &'a str,
    outcome: CheckOutcome,
}

/// A recognised `- <key>: <value>` line under a header.
#[derive(Debug, Clone, PartialEq)]
enum Meta {
    HookId(String),
    Duration(f64),
    ExitCode(i32),
    FilesModified,
}

/// Parses cleaned tool output into check results, in order of appearance.
///
/// # Errors
///
/// Returns [`HookError::DuplicateCheckId`] when a hook id occurs twice.
pub fn parse_output(text: &str) -> HookResult<Vec<CheckResult>> {
    let lines: Vec<&str> = text.lines().collect();
    let mut results = Vec::new();
    let mut seen = HashSet::new();
    let mut i = 0;

    while i < lines.len() {
        let Some(header) = parse_header(lines[i]) else {
            i += 1;
            continue;
        };
        let Some(Meta::HookId(id)) = lines.get(i + 1).and_then(|line| parse_meta(line)) else {
            debug!(line = lines[i], "status line without hook id");
            i += 1;
            continue;
        };
        i += 2;

        let mut duration_seconds = 0.0;
        let mut exit_code = 0;
        let mut files_modified = false;
        while let Some(meta) = lines.get(i).and_then(|line| parse_meta(line)) {
            match meta {
                Meta::HookId(_) => break,
                Meta::Duration(seconds) => duration_seconds = seconds,
                Meta::ExitCode(code) => exit_code = code,
                Meta::FilesModified => files_modified = true,
            }
            i += 1;
        }

        let detail_start = i;
        while i < lines.len() && parse_header(lines[i]).is_none() {
            i += 1;
        }
        let detail = lines[detail_start..i].join("\n").trim().to_string();

        if !seen.insert(id.clone()) {
            return Err(HookError::DuplicateCheckId(id));
        }
        results.push(CheckResult {
            id,
            description: header.description.to_string(),
            outcome: header.outcome.refine(files_modified),
            message: header.message.to_string(),
            exit_code,
            duration_seconds,
            files_modified,
            detail,
        });
    }

    debug!(count = results.len(), "extracted results from tool output");
    Ok(results)
}

/// Parses tool output straight into a [`RunOutcome`].
///
/// # Errors
///
/// Same as [`parse_output`].
pub fn parse_run(text: &str, pass: Pass) -> HookResult<RunOutcome> {
    Ok(RunOutcome::from_results(pass, parse_output(text)?))
}

fn parse_header(line: &str) -> Option<Header<'_>> {
    let line = line.trim_end();
    let (rest, outcome) =
        KEYWORDS.iter().find_map(|(keyword, outcome)| line.strip_suffix(keyword).map(|r| (r, *outcome)))?;
    let dots = find_dot_run(rest)?;
    let description = rest[..dots].trim();
    if description.is_empty() {
        return None;
    }
    let message = rest[dots..].trim_start_matches('.').trim_end_matches('.').trim();
    Some(Header { description, message, outcome })
}

/// Byte offset of the first run of at least [`MIN_DOT_RUN`] dots.
fn find_dot_run(text: &str) -> Option<usize> {
    let mut run_start = 0;
    let mut run_len = 0;
    for (idx, ch) in text.char_indices() {
        if ch == '.' {
            if run_len == 0 {
                run_start = idx;
            }
            run_len += 1;
            if run_len == MIN_DOT_RUN {
                return Some(run_start);
            }
        } else {
            run_len = 0;
        }
    }
    None
}

fn parse_meta(line: &str) -> Option<Meta> {
    let body = line.trim_start().strip_prefix('-')?;
    let normalized = body.split_whitespace().collect::<Vec<_>>().join(" ");

    if let Some(id) = normalized.strip_prefix("hook id:") {
        let id = id.trim();
        return (!id.is_empty()).then(|| Meta::HookId(id.to_string()));
    }
    if let Some(value) = normalized.strip_prefix("duration:") {
        return value.trim().strip_suffix('s')?.trim().parse().ok().map(Meta::Duration);
    }
    if let Some(value) = normalized.strip_prefix("exit code:") {
        return value.trim().parse().ok().map(Meta::ExitCode);
    }
    (normalized == "files were modified by this hook").then_some(Meta::FilesModified)
}
