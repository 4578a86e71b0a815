//! Live git adapter using `git` CLI commands.

use std::path::PathBuf;
use std::process::Command;

use crate::ports::git::{CommitRequest, GitRepo};
use crate::ports::PortError;

/// Live git adapter that shells out to the `git` CLI inside `root`.
pub struct LiveGitRepo {
    root: PathBuf,
}

impl LiveGitRepo {
    /// Creates an adapter operating on the working copy at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn git(&self, args: &[&str]) -> Result<String, PortError> {
        let output = Command::new("git").args(args).current_dir(&self.root).output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("git {} failed: {}", args.join(" "), stderr.trim()).into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Hash of `refs/stash`, or `None` when the stash is empty.
    fn stash_head(&self) -> Result<Option<String>, PortError> {
        let output = Command::new("git")
            .args(["rev-parse", "-q", "--verify", "refs/stash"])
            .current_dir(&self.root)
            .output()?;
        if output.status.success() {
            Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
        } else {
            Ok(None)
        }
    }
}

impl GitRepo for LiveGitRepo {
    fn current_commit(&self) -> Result<String, PortError> {
        self.git(&["rev-parse", "HEAD"])
    }

    fn current_branch(&self) -> Result<String, PortError> {
        let branch = self.git(&["branch", "--show-current"])?;
        if branch.is_empty() {
            return Err("HEAD is detached; no current branch".into());
        }
        Ok(branch)
    }

    fn checkout(&self, branch: &str, reset: bool) -> Result<(), PortError> {
        let flag = if reset { "-B" } else { "--no-guess" };
        self.git(&["checkout", flag, branch]).map(|_| ())
    }

    fn stash(&self) -> Result<bool, PortError> {
        let before = self.stash_head()?;
        self.git(&["stash", "push", "--include-untracked"])?;
        Ok(self.stash_head()? != before)
    }

    fn stash_pop(&self) -> Result<(), PortError> {
        self.git(&["stash", "pop"]).map(|_| ())
    }

    fn discard_changes(&self) -> Result<(), PortError> {
        self.git(&["reset", "--hard", "HEAD"])?;
        self.git(&["clean", "-fd"]).map(|_| ())
    }

    fn commit(&self, request: &CommitRequest) -> Result<String, PortError> {
        if request.stage_all {
            self.git(&["add", "--all"])?;
        }
        let mut args = vec!["commit"];
        if request.amend {
            args.push("--amend");
        }
        if request.allow_empty {
            args.push("--allow-empty");
        }
        if request.message.is_empty() && request.amend {
            args.push("--no-edit");
        } else {
            args.extend(["-m", request.message.as_str()]);
        }
        self.git(&args)?;
        self.current_commit()
    }

    fn push(&self, remote: &str, set_upstream: bool, force: bool) -> Result<String, PortError> {
        let mut args = vec!["push"];
        if set_upstream {
            args.push("--set-upstream");
        }
        if force {
            args.push("--force-with-lease");
        }
        args.extend([remote, "HEAD"]);
        self.git(&args)?;
        self.current_commit()
    }
}
