//! Run Coordinator: one validation pass, or fix + commit + validation.

use std::path::Path;

use tracing::{info, warn};

use super::config::MaterializedConfig;
use super::invoker::{self, Flavor, Scope};
use super::outcome::{merge, RunOutcome};
use super::policy::{Policy, ReconciliationRequest};
use crate::context::ServiceContext;
use crate::error::{HookError, HookResult};
use crate::ports::{CommitRequest, GitRepo};

/// Runs the hooks as `request.policy` dictates, on whatever branch is
/// checked out. Relocation for `Pull` is the caller's job.
///
/// The materialized config is removed on every exit path.
///
/// # Errors
///
/// Any [`HookError`]; a run error wins over a cleanup error.
pub fn run(ctx: &ServiceContext, request: &ReconciliationRequest) -> HookResult<RunOutcome> {
    request.validate()?;
    if request.policy == Policy::None {
        info!("policy is none, hooks not run");
        return Ok(RunOutcome::skipped());
    }

    let mut config = MaterializedConfig::materialize(ctx.fs.as_ref(), &ctx.root, &request.config)?;
    let outcome = invoker::ensure_installed(ctx).and_then(|_| match request.policy {
        Policy::None => Ok(RunOutcome::skipped()),
        Policy::Report | Policy::Fail => validate(ctx, &request.scope, config.path()),
        Policy::Commit | Policy::Amend | Policy::Pull => fix_and_validate(
            ctx,
            request.policy,
            &request.scope,
            config.path(),
            &request.commit_message,
        ),
    });
    let cleanup = config.cleanup();

    let outcome = outcome?;
    cleanup?;
    info!(passed = outcome.passed, modified = outcome.modified, counts = %outcome.counts, "hooks finished");
    Ok(outcome)
}

/// Fix pass, commit of what it changed, validation pass, merge.
///
/// A fix pass that passed or modified nothing is the final word: its
/// failures sit in the working tree as it is, and there is nothing to commit
/// or re-check.
fn fix_and_validate(
    ctx: &ServiceContext,
    policy: Policy,
    scope: &Scope,
    config_path: &Path,
    message: &str,
) -> HookResult<RunOutcome> {
    let fix = invoker::invoke(ctx, scope, config_path, Flavor::Fix)?;
    if fix.passed || !fix.modified {
        info!(passed = fix.passed, "fix pass left nothing to commit");
        return Ok(fix);
    }

    let request = CommitRequest {
        message: message.to_string(),
        stage_all: true,
        amend: policy == Policy::Amend,
        allow_empty: policy == Policy::Amend,
    };
    let hash = ctx.git.commit(&request).map_err(|e| HookError::repository("commit", e))?;
    info!(commit = %hash, amend = request.amend, "committed hook fixes");

    let validation = revalidate(ctx, scope, config_path)?;
    Ok(merge(fix, validation, Some(hash)))
}

/// Validation pass over the commit just made.
///
/// Everything was staged into that commit, so the tree is checked as is and
/// only what the tool rewrites is thrown away afterwards.
fn revalidate(ctx: &ServiceContext, scope: &Scope, config_path: &Path) -> HookResult<RunOutcome> {
    let outcome = invoker::invoke(ctx, scope, config_path, Flavor::Validate);
    let discarded = ctx
        .git
        .discard_changes()
        .map_err(|e| HookError::stash_or_checkout("discard validation changes", e));
    let outcome = outcome?;
    discarded?;
    Ok(outcome)
}

/// A validation-only pass (`Report`, `Fail`) that leaves the working tree
/// as it found it.
fn validate(ctx: &ServiceContext, scope: &Scope, config_path: &Path) -> HookResult<RunOutcome> {
    let mut isolation = Isolation::begin(ctx.git.as_ref())?;
    let outcome = invoker::invoke(ctx, scope, config_path, Flavor::Validate);
    let restored = isolation.end();
    let outcome = outcome?;
    restored?;
    Ok(outcome)
}

/// Local changes stashed away for the duration of a validation pass.
struct Isolation<'a> {
    git: &'a dyn GitRepo,
    stashed: bool,
    ended: bool,
}

impl<'a> Isolation<'a> {
    fn begin(git: &'a dyn GitRepo) -> HookResult<Self> {
        let stashed = git
            .stash()
            .map_err(|e| HookError::stash_or_checkout("stash local changes before validation", e))?;
        Ok(Self { git, stashed, ended: false })
    }

    /// Throws away what the tool rewrote and brings the stash back.
    fn end(&mut self) -> HookResult<()> {
        if self.ended {
            return Ok(());
        }
        self.ended = true;
        self.git
            .discard_changes()
            .map_err(|e| HookError::stash_or_checkout("discard validation changes", e))?;
        if self.stashed {
            self.git.stash_pop().map_err(|e| HookError::stash_or_checkout("pop stash", e))?;
        }
        Ok(())
    }
}

impl Drop for Isolation<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.end() {
            warn!(error = %e, "failed to restore working tree after validation");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;
    use crate::cassette::recorder::CassetteRecorder;
    use crate::hooks::config::HookConfig;
    use crate::settings::Settings;

    const ROOT: &str = "/work/widgets";
    const CONFIG: &str = "/work/widgets/.pre-commit-config.yaml";

    const FIXED: &str = "\
Fix End of Files.........................................................Failed
- hook id: end-of-file-fixer
- exit code: 1
- files were modified by this hook

Fixing README.md

Check Toml...............................................................Passed
- hook id: check-toml
";
    const CLEAN: &str = "\
Fix End of Files.........................................................Passed
- hook id: end-of-file-fixer
Check Toml...............................................................Passed
- hook id: check-toml
";
    const LINT_FAIL: &str = "\
flake8...................................................................Failed
- hook id: flake8
- exit code: 1

app.py:1:1: F401 'os' imported but unused
";

    struct Script(CassetteRecorder);

    impl Script {
        fn new() -> Self {
            let mut script = Self(CassetteRecorder::new("unused.yaml", "script", "abc"));
            script.0.record("fs", "exists", json!({"path": CONFIG}), json!(true));
            script.shell(0, "pre-commit 3.7.1\n");
            script
        }

        fn shell(&mut self, exit_code: i32, stdout: &str) -> &mut Self {
            self.0.record(
                "shell",
                "run",
                json!({}),
                json!({"ok": {"exit_code": exit_code, "stdout": stdout, "stderr": ""}}),
            );
            self
        }

        fn git(&mut self, method: &str, output: serde_json::Value) -> &mut Self {
            self.0.record("git", method, json!({}), output);
            self
        }

        fn context(self) -> (ServiceContext, Arc<Mutex<CassetteRecorder>>) {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("script.cassette.yaml");
            let yaml = serde_yaml::to_string(&self.0.into_cassette()).unwrap();
            std::fs::write(&path, yaml).unwrap();
            let log = Arc::new(Mutex::new(CassetteRecorder::new("unused.yaml", "log", "abc")));
            let ctx = ServiceContext::replaying(ROOT, Settings::default(), &path)
                .unwrap()
                .record_into(&log);
            (ctx, log)
        }
    }

    fn git_calls(log: &Arc<Mutex<CassetteRecorder>>) -> Vec<String> {
        log.lock()
            .unwrap()
            .interactions()
            .iter()
            .filter(|i| i.port == "git")
            .map(|i| i.method.clone())
            .collect()
    }

    fn request(policy: Policy) -> ReconciliationRequest {
        ReconciliationRequest::new(policy, HookConfig::Path(CONFIG.into()))
            .with_message("style: apply hook fixes")
    }

    #[test]
    fn commit_policy_commits_fixes_then_validates() {
        let mut script = Script::new();
        script
            .shell(1, FIXED)
            .git("commit", json!({"ok": "c0ffee1"}))
            .shell(0, CLEAN)
            .git("discard_changes", json!({"ok": null}));
        let (ctx, log) = script.context();

        let outcome = run(&ctx, &request(Policy::Commit)).unwrap();

        assert!(outcome.passed);
        assert!(outcome.modified);
        assert_eq!(outcome.commit_hash.as_deref(), Some("c0ffee1"));
        assert_eq!(outcome.counts.modified, 1);
        assert_eq!(outcome.counts.modified_on_validation, Some(0));
        assert_eq!(git_calls(&log), ["commit", "discard_changes"]);

        let guard = log.lock().unwrap();
        let commit = guard.interactions().iter().find(|i| i.method == "commit").unwrap();
        assert_eq!(commit.input["amend"], json!(false));
        assert_eq!(commit.input["stage_all"], json!(true));
        assert_eq!(commit.input["message"], json!("style: apply hook fixes"));
    }

    #[test]
    fn clean_fix_pass_returns_without_commit_or_second_pass() {
        let mut script = Script::new();
        script.shell(0, CLEAN);
        let (ctx, log) = script.context();

        let outcome = run(&ctx, &request(Policy::Commit)).unwrap();
        assert!(outcome.passed);
        assert!(!outcome.modified);
        assert!(outcome.commit_hash.is_none());
        assert!(git_calls(&log).is_empty());
    }

    #[test]
    fn amend_uses_amend_and_allow_empty() {
        let mut script = Script::new();
        script
            .shell(1, FIXED)
            .git("commit", json!({"ok": "a1b2c3d"}))
            .shell(0, CLEAN)
            .git("discard_changes", json!({"ok": null}));
        let (ctx, log) = script.context();

        let request = ReconciliationRequest::new(Policy::Amend, HookConfig::Path(CONFIG.into()));
        let outcome = run(&ctx, &request).unwrap();
        assert_eq!(outcome.commit_hash.as_deref(), Some("a1b2c3d"));

        let guard = log.lock().unwrap();
        let commit = guard.interactions().iter().find(|i| i.method == "commit").unwrap();
        assert_eq!(commit.input["amend"], json!(true));
        assert_eq!(commit.input["allow_empty"], json!(true));
    }

    #[test]
    fn unfixable_failure_returns_fix_outcome_without_touching_git() {
        let mut script = Script::new();
        script.shell(1, LINT_FAIL);
        let (ctx, log) = script.context();

        let outcome = run(&ctx, &request(Policy::Commit)).unwrap();
        assert!(!outcome.passed);
        assert!(!outcome.modified);
        assert!(outcome.commit_hash.is_none());
        assert_eq!(outcome.pass, crate::hooks::Pass::Fix);
        assert_eq!(outcome.counts.nonzero(), [("Failed", 1)]);
        assert!(git_calls(&log).is_empty());
    }

    #[test]
    fn failing_revalidation_still_discards_and_keeps_commit() {
        let mut script = Script::new();
        script
            .shell(1, FIXED)
            .git("commit", json!({"ok": "feedf00"}))
            .shell(1, LINT_FAIL)
            .git("discard_changes", json!({"ok": null}));
        let (ctx, log) = script.context();

        let outcome = run(&ctx, &request(Policy::Commit)).unwrap();
        assert!(!outcome.passed);
        assert!(outcome.modified);
        assert_eq!(outcome.commit_hash.as_deref(), Some("feedf00"));
        assert_eq!(git_calls(&log), ["commit", "discard_changes"]);
    }

    #[test]
    fn report_runs_once_and_restores_stash() {
        let mut script = Script::new();
        script
            .git("stash", json!({"ok": true}))
            .shell(1, LINT_FAIL)
            .git("discard_changes", json!({"ok": null}))
            .git("stash_pop", json!({"ok": null}));
        let (ctx, log) = script.context();

        let outcome = run(&ctx, &request(Policy::Report)).unwrap();
        assert!(!outcome.passed);
        assert!(!outcome.modified);
        assert_eq!(outcome.counts.nonzero(), [("Failed", 1)]);
        assert_eq!(git_calls(&log), ["stash", "discard_changes", "stash_pop"]);
    }

    #[test]
    fn tool_error_during_validation_still_restores_tree() {
        let mut script = Script::new();
        script
            .git("stash", json!({"ok": true}))
            .shell(3, "An unexpected error has occurred: KeyboardInterrupt\n")
            .git("discard_changes", json!({"ok": null}))
            .git("stash_pop", json!({"ok": null}));
        let (ctx, log) = script.context();

        let err = run(&ctx, &request(Policy::Fail)).unwrap_err();
        assert!(matches!(err, HookError::UnexpectedToolError(_)));
        assert_eq!(git_calls(&log), ["stash", "discard_changes", "stash_pop"]);
    }

    #[test]
    fn missing_tool_aborts_before_running_hooks() {
        let mut script = Script(CassetteRecorder::new("unused.yaml", "script", "abc"));
        script.0.record("fs", "exists", json!({}), json!(true));
        script.0.record(
            "shell",
            "run",
            json!({}),
            json!({"err": "No such file or directory (os error 2)", "kind": "NotFound"}),
        );
        let (ctx, log) = script.context();

        let err = run(&ctx, &request(Policy::Report)).unwrap_err();
        assert!(matches!(err, HookError::ToolNotInstalled { .. }));
        assert!(git_calls(&log).is_empty());
    }

    #[test]
    fn inline_config_is_removed_after_tool_error() {
        let mut script = Script(CassetteRecorder::new("unused.yaml", "script", "abc"));
        script.0.record("fs", "write", json!({}), json!({"ok": null}));
        script.shell(0, "pre-commit 3.7.1\n");
        script
            .shell(3, "An error has occurred: InvalidConfigError\n")
            .0
            .record("fs", "remove_file", json!({}), json!({"ok": null}));
        let (ctx, log) = script.context();

        let request = ReconciliationRequest::new(Policy::Amend, HookConfig::Text("repos: []\n".into()));
        let err = run(&ctx, &request).unwrap_err();
        assert!(matches!(err, HookError::UnexpectedToolError(ref line) if line.contains("InvalidConfigError")));

        let fs_calls: Vec<String> = log
            .lock()
            .unwrap()
            .interactions()
            .iter()
            .filter(|i| i.port == "fs")
            .map(|i| i.method.clone())
            .collect();
        assert_eq!(fs_calls, ["write", "remove_file"]);
    }

    #[test]
    fn stderr_noise_stays_out_of_check_details() {
        let mut script = Script::new();
        script.0.record(
            "shell",
            "run",
            json!({}),
            json!({"ok": {
                "exit_code": 1,
                "stdout": LINT_FAIL,
                "stderr": "[WARNING] Unstaged files detected.\n[INFO] Stashing unstaged files.\n",
            }}),
        );
        let (ctx, _log) = script.context();

        let outcome = run(&ctx, &request(Policy::Commit)).unwrap();
        let flake8 = outcome.check("flake8").unwrap();
        assert_eq!(flake8.detail, "app.py:1:1: F401 'os' imported but unused");
        assert!(!flake8.detail.contains("Stashing"));
    }

    #[test]
    fn fatal_line_on_stderr_is_still_an_error() {
        let mut script = Script::new();
        script.0.record(
            "shell",
            "run",
            json!({}),
            json!({"ok": {
                "exit_code": 3,
                "stdout": "",
                "stderr": "An unexpected error has occurred: CalledProcessError\n",
            }}),
        );
        let (ctx, _log) = script.context();

        let err = run(&ctx, &request(Policy::Commit)).unwrap_err();
        assert!(matches!(err, HookError::UnexpectedToolError(ref line) if line.contains("CalledProcessError")));
    }

    #[test]
    fn invalid_request_fails_before_any_port_call() {
        let (ctx, log) = Script(CassetteRecorder::new("unused.yaml", "script", "abc")).context();
        let request = ReconciliationRequest::new(Policy::Pull, HookConfig::Path(CONFIG.into()));
        assert!(matches!(run(&ctx, &request), Err(HookError::InvalidPolicy(_))));
        assert!(log.lock().unwrap().interactions().is_empty());
    }
}
