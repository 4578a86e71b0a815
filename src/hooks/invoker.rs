//! Runs the hook tool once and turns its output into a [`RunOutcome`].

use std::borrow::Cow;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::outcome::{Pass, RunOutcome};
use super::parser::parse_run;
use crate::context::ServiceContext;
use crate::error::{HookError, HookResult};
use crate::ports::PortError;

/// Lines starting with one of these mean the tool itself broke down.
pub const FATAL_PREFIXES: [&str; 3] =
    ["An error has occurred", "An unexpected error has occurred", "[ERROR]"];

/// Which files the tool looks at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    /// Every tracked file.
    AllFiles,
    /// Files changed between two refs.
    Range {
        /// Older ref.
        from: String,
        /// Newer ref.
        to: String,
    },
}

impl Scope {
    /// Command-line arguments selecting this scope.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        match self {
            Self::AllFiles => vec!["--all-files".to_string()],
            Self::Range { from, to } => vec![
                "--from-ref".to_string(),
                from.clone(),
                "--to-ref".to_string(),
                to.clone(),
            ],
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AllFiles => f.write_str("all files"),
            Self::Range { from, to } => write!(f, "{from}..{to}"),
        }
    }
}

/// Whether the invocation may keep the files the tool rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// Rewrites are the point of the run.
    Fix,
    /// Rewrites are discarded by the caller; only the verdict matters.
    Validate,
}

impl Flavor {
    fn pass(self) -> Pass {
        match self {
            Self::Fix => Pass::Fix,
            Self::Validate => Pass::Validation,
        }
    }
}

/// Checks that the tool can be started and returns its version string.
///
/// # Errors
///
/// Returns [`HookError::ToolNotInstalled`] when the tool cannot be spawned or
/// `--version` exits non-zero.
pub fn ensure_installed(ctx: &ServiceContext) -> HookResult<String> {
    let tool = &ctx.settings.tool;
    let output = ctx
        .shell
        .run(tool, &["--version".to_string()], &ctx.root)
        .map_err(|e| HookError::ToolNotInstalled { tool: tool.clone(), reason: e.to_string() })?;
    if output.exit_code != 0 {
        return Err(HookError::ToolNotInstalled {
            tool: tool.clone(),
            reason: format!("`{tool} --version` exited with {}", output.exit_code),
        });
    }
    let version = output.stdout.trim().to_string();
    info!(%version, "hook tool version");
    Ok(version)
}

/// Full argument list for one run.
#[must_use]
pub fn build_args(hook_stage: &str, scope: &Scope, config_path: &Path) -> Vec<String> {
    let mut args = vec!["run".to_string()];
    args.extend(scope.args());
    args.extend([
        "--hook-stage".to_string(),
        hook_stage.to_string(),
        "--show-diff-on-failure".to_string(),
        "--color=always".to_string(),
        "--verbose".to_string(),
        "--config".to_string(),
        config_path.display().to_string(),
    ]);
    args
}

/// Runs the tool once over `scope` and parses what it printed.
///
/// A non-zero exit code is expected whenever a check fails and is not an
/// error by itself. Only stdout is parsed into check records; stderr is
/// scanned for fatal-error lines and otherwise just logged.
///
/// # Errors
///
/// - [`HookError::ToolNotInstalled`] if the tool cannot be spawned.
/// - [`HookError::UnexpectedToolError`] if it dies abnormally or prints a
///   fatal-error line.
/// - [`HookError::DuplicateCheckId`] from the parser.
pub fn invoke(
    ctx: &ServiceContext,
    scope: &Scope,
    config_path: &Path,
    flavor: Flavor,
) -> HookResult<RunOutcome> {
    let tool = &ctx.settings.tool;
    let args = build_args(&ctx.settings.hook_stage, scope, config_path);
    info!(?flavor, %scope, "running hooks");
    debug!(command = %format!("{tool} {}", args.join(" ")), "hook command");

    let output =
        ctx.shell.run(tool, &args, &ctx.root).map_err(|e| classify_spawn_error(tool, &e))?;
    if output.exit_code < 0 {
        return Err(HookError::UnexpectedToolError(format!("{tool} was terminated by a signal")));
    }

    check_fatal_lines(&strip_ansi(&output.combined()))?;
    if !output.stderr.trim().is_empty() {
        debug!(stderr = %strip_ansi(output.stderr.trim_end()), "hook tool stderr");
    }
    parse_run(&strip_ansi(&output.stdout), flavor.pass())
}

/// Removes ANSI escape sequences (colors, cursor movement, OSC titles).
#[must_use]
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    static ANSI: OnceLock<Regex> = OnceLock::new();
    let pattern = ANSI.get_or_init(|| {
        Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b[@-_]")
            .expect("ANSI escape pattern is valid")
    });
    pattern.replace_all(text, "")
}

/// Fails on the first line that starts with a fatal-error marker.
///
/// # Errors
///
/// Returns [`HookError::UnexpectedToolError`] carrying the offending line.
pub fn check_fatal_lines(text: &str) -> HookResult<()> {
    match text.lines().find(|line| FATAL_PREFIXES.iter().any(|p| line.starts_with(p))) {
        Some(line) => Err(HookError::UnexpectedToolError(line.to_string())),
        None => Ok(()),
    }
}

fn classify_spawn_error(tool: &str, err: &PortError) -> HookError {
    match err.downcast_ref::<std::io::Error>().map(std::io::Error::kind) {
        Some(ErrorKind::NotFound | ErrorKind::PermissionDenied) => {
            HookError::ToolNotInstalled { tool: tool.to_string(), reason: err.to_string() }
        }
        _ => HookError::UnexpectedToolError(err.to_string()),
    }
}
