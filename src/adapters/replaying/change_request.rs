//! Replaying adapter for the `ChangeRequests` port.

use std::sync::Mutex;

use super::replay_result;
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{ChangeRequest, ChangeRequestDraft, ChangeRequests, PortError};

/// Replays recorded change requests from a cassette.
pub struct ReplayingChangeRequests {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingChangeRequests {
    /// Creates a new replaying adapter from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl ChangeRequests for ReplayingChangeRequests {
    fn create_change_request(&self, _draft: &ChangeRequestDraft) -> Result<ChangeRequest, PortError> {
        replay_result(&self.replayer, "change_requests", "create_change_request")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::recorder::CassetteRecorder;
    use serde_json::json;

    #[test]
    fn replays_created_request() {
        let mut script = CassetteRecorder::new("unused.yaml", "cr", "abc");
        script.record(
            "change_requests",
            "create_change_request",
            json!({}),
            json!({"ok": {"id": "42", "url": "https://github.com/acme/widgets/pull/42"}}),
        );
        let adapter = ReplayingChangeRequests::new(CassetteReplayer::new(&script.into_cassette()));
        let draft = ChangeRequestDraft {
            head: "auto-update/main/hooks".into(),
            base: "main".into(),
            title: "t".into(),
            body: String::new(),
        };
        let created = adapter.create_change_request(&draft).unwrap();
        assert_eq!(created.id, "42");
    }
}
