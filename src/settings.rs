//! Repository-level settings, read from `.hooksync.yaml`.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File name looked up in the repository root.
pub const SETTINGS_FILE: &str = ".hooksync.yaml";

/// Engine settings. Every field has a default so an absent or partial file
/// is fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Hook tool executable.
    pub tool: String,
    /// Stage passed to `--hook-stage`.
    pub hook_stage: String,
    /// Prefix of side branches used by the `pull` policy.
    pub side_branch_prefix: String,
    /// Remote that side branches are pushed to.
    pub remote: String,
    /// Hook config used when none is given on the command line.
    pub hook_config: PathBuf,
    /// Manifest describing the dynamic files.
    pub dynamic_manifest: PathBuf,
    /// Code-hosting settings for opening change requests.
    pub github: Option<GithubSettings>,
}

/// Where and how to open pull requests on GitHub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubSettings {
    /// `owner/name` of the repository.
    pub repository: String,
    /// REST API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Environment variable holding the API token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tool: "pre-commit".to_string(),
            hook_stage: "manual".to_string(),
            side_branch_prefix: "auto-update/".to_string(),
            remote: "origin".to_string(),
            hook_config: PathBuf::from(".github/.pre-commit-config.yaml"),
            dynamic_manifest: PathBuf::from(".hooksync/dynamic.yaml"),
            github: None,
        }
    }
}

impl Settings {
    /// Loads `<root>/.hooksync.yaml` (defaults when absent) and applies
    /// `HOOKSYNC_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error string if the file exists but cannot be read or parsed.
    pub fn load(root: &Path) -> Result<Self, String> {
        let path = root.join(SETTINGS_FILE);
        let mut settings = if path.is_file() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read settings file {}: {e}", path.display()))?;
            Self::from_yaml(&content)
                .map_err(|e| format!("Failed to parse settings file {}: {e}", path.display()))?
        } else {
            Self::default()
        };
        settings.apply_env(|key| env::var(key).ok());
        Ok(settings)
    }

    /// Parses settings from YAML text.
    ///
    /// # Errors
    ///
    /// Returns the YAML error for malformed input or unknown keys.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(tool) = lookup("HOOKSYNC_TOOL") {
            self.tool = tool;
        }
        if let Some(prefix) = lookup("HOOKSYNC_SIDE_BRANCH_PREFIX") {
            self.side_branch_prefix = prefix;
        }
        if let Some(remote) = lookup("HOOKSYNC_REMOTE") {
            self.remote = remote;
        }
    }
}
