//! Recording adapter for the `ChangeRequests` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::{ChangeRequest, ChangeRequestDraft, ChangeRequests, PortError};

/// Records change-request interactions while delegating to an inner implementation.
pub struct RecordingChangeRequests {
    inner: Box<dyn ChangeRequests>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingChangeRequests {
    /// Creates a new recording adapter wrapping the given implementation.
    pub fn new(inner: Box<dyn ChangeRequests>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl ChangeRequests for RecordingChangeRequests {
    fn create_change_request(&self, draft: &ChangeRequestDraft) -> Result<ChangeRequest, PortError> {
        let result = self.inner.create_change_request(draft);
        record_result(&self.recorder, "change_requests", "create_change_request", draft, &result);
        result
    }
}
