//! Live adapters for the `ChangeRequests` port.

use std::env;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::ports::change_request::{ChangeRequest, ChangeRequestDraft, ChangeRequests};
use crate::ports::PortError;
use crate::settings::GithubSettings;

/// Opens pull requests through the GitHub REST API.
pub struct GithubChangeRequests {
    client: Client,
    settings: GithubSettings,
}

impl GithubChangeRequests {
    /// Creates an adapter for the repository named in `settings`.
    #[must_use]
    pub fn new(settings: GithubSettings) -> Self {
        Self { client: Client::new(), settings }
    }

    fn pulls_url(&self) -> String {
        format!(
            "{}/repos/{}/pulls",
            self.settings.api_url.trim_end_matches('/'),
            self.settings.repository
        )
    }
}

/// Request body for `POST /repos/{owner}/{repo}/pulls`.
#[derive(Serialize)]
struct PullRequestBody<'a> {
    title: &'a str,
    head: &'a str,
    base: &'a str,
    body: &'a str,
    maintainer_can_modify: bool,
}

/// The fields of the created pull request we keep.
#[derive(Deserialize)]
struct PullRequestResponse {
    number: u64,
    html_url: String,
}

/// Error response from the GitHub API.
#[derive(Deserialize)]
struct GithubError {
    message: String,
}

impl ChangeRequests for GithubChangeRequests {
    fn create_change_request(&self, draft: &ChangeRequestDraft) -> Result<ChangeRequest, PortError> {
        let token = env::var(&self.settings.token_env).map_err(|_| -> PortError {
            format!("{} environment variable not set", self.settings.token_env).into()
        })?;
        let url = self.pulls_url();
        let body = PullRequestBody {
            title: &draft.title,
            head: &draft.head,
            base: &draft.base,
            body: &draft.body,
            maintainer_can_modify: true,
        };

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        let (status, response_text) = runtime.block_on(async {
            let response = self
                .client
                .post(&url)
                .bearer_auth(&token)
                .header("accept", "application/vnd.github+json")
                .header("user-agent", "hooksync")
                .json(&body)
                .send()
                .await
                .map_err(|e| -> PortError { format!("GitHub API request failed: {e}").into() })?;
            let status = response.status();
            let text = response.text().await.map_err(|e| -> PortError {
                format!("Failed to read GitHub API response: {e}").into()
            })?;
            Ok::<_, PortError>((status, text))
        })?;

        if !status.is_success() {
            let msg = serde_json::from_str::<GithubError>(&response_text)
                .map(|e| e.message)
                .unwrap_or(response_text);
            return Err(format!("GitHub API error ({}): {msg}", status.as_u16()).into());
        }

        let created: PullRequestResponse = serde_json::from_str(&response_text)
            .map_err(|e| -> PortError { format!("Failed to parse GitHub API response: {e}").into() })?;
        Ok(ChangeRequest { id: created.number.to_string(), url: created.html_url })
    }
}

/// Adapter used when no code-hosting service is configured.
pub struct UnconfiguredChangeRequests;

impl ChangeRequests for UnconfiguredChangeRequests {
    fn create_change_request(&self, draft: &ChangeRequestDraft) -> Result<ChangeRequest, PortError> {
        Err(format!(
            "cannot open a change request for '{}': no `github` section in settings",
            draft.head
        )
        .into())
    }
}
