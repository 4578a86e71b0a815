//! Change-request port for proposing a side branch upstream.

use serde::{Deserialize, Serialize};

use super::PortError;

/// What to open: head branch into base branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRequestDraft {
    /// Branch carrying the proposed commits.
    pub head: String,
    /// Branch the change should land on.
    pub base: String,
    /// Title of the change request.
    pub title: String,
    /// Body text.
    pub body: String,
}

/// A change request as created by the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRequest {
    /// Service-assigned identifier (e.g. the pull request number).
    pub id: String,
    /// Browser URL of the change request.
    pub url: String,
}

/// Opens change requests (pull/merge requests) on a code-hosting service.
pub trait ChangeRequests: Send + Sync {
    /// Creates a change request and returns its identifier and URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects the request or is unreachable.
    fn create_change_request(&self, draft: &ChangeRequestDraft) -> Result<ChangeRequest, PortError>;
}
