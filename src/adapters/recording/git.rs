//! Recording adapter for the `GitRepo` port.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::{CommitRequest, GitRepo, PortError};

/// Records git interactions while delegating to an inner implementation.
pub struct RecordingGitRepo {
    inner: Box<dyn GitRepo>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingGitRepo {
    /// Creates a new recording git repo wrapping the given implementation.
    pub fn new(inner: Box<dyn GitRepo>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }

    fn record<T: Serialize>(
        &self,
        method: &str,
        input: &impl Serialize,
        result: &Result<T, PortError>,
    ) {
        record_result(&self.recorder, "git", method, input, result);
    }
}

#[derive(Serialize)]
struct CheckoutInput<'a> {
    branch: &'a str,
    reset: bool,
}

#[derive(Serialize)]
struct PushInput<'a> {
    remote: &'a str,
    set_upstream: bool,
    force: bool,
}

impl GitRepo for RecordingGitRepo {
    fn current_commit(&self) -> Result<String, PortError> {
        let result = self.inner.current_commit();
        self.record("current_commit", &(), &result);
        result
    }

    fn current_branch(&self) -> Result<String, PortError> {
        let result = self.inner.current_branch();
        self.record("current_branch", &(), &result);
        result
    }

    fn checkout(&self, branch: &str, reset: bool) -> Result<(), PortError> {
        let result = self.inner.checkout(branch, reset);
        self.record("checkout", &CheckoutInput { branch, reset }, &result);
        result
    }

    fn stash(&self) -> Result<bool, PortError> {
        let result = self.inner.stash();
        self.record("stash", &(), &result);
        result
    }

    fn stash_pop(&self) -> Result<(), PortError> {
        let result = self.inner.stash_pop();
        self.record("stash_pop", &(), &result);
        result
    }

    fn discard_changes(&self) -> Result<(), PortError> {
        let result = self.inner.discard_changes();
        self.record("discard_changes", &(), &result);
        result
    }

    fn commit(&self, request: &CommitRequest) -> Result<String, PortError> {
        let result = self.inner.commit(request);
        self.record("commit", request, &result);
        result
    }

    fn push(&self, remote: &str, set_upstream: bool, force: bool) -> Result<String, PortError> {
        let result = self.inner.push(remote, set_upstream, force);
        self.record("push", &PushInput { remote, set_upstream, force }, &result);
        result
    }
}
