//! Cassette data structures for recording and replaying port interactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded call on a port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Sequence number (assigned automatically by the recorder).
    pub seq: u64,
    /// Port name (`fs`, `git`, `shell` or `change_requests`).
    pub port: String,
    /// Method name invoked on the port.
    pub method: String,
    /// Arguments of the call.
    pub input: serde_json::Value,
    /// Returned value, `{"ok": ..}` or `{"err": ".."}` for fallible methods.
    pub output: serde_json::Value,
}

/// A named, ordered list of interactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Human-readable name for this cassette.
    pub name: String,
    /// When this cassette was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Commit checked out at recording time.
    pub commit: String,
    /// Ordered list of interactions.
    pub interactions: Vec<Interaction>,
}

impl Cassette {
    /// Parses a cassette from YAML text.
    ///
    /// # Errors
    ///
    /// Returns the YAML error for malformed input.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Interactions recorded for one port, in order.
    pub fn for_port<'a>(&'a self, port: &'a str) -> impl Iterator<Item = &'a Interaction> + 'a {
        self.interactions.iter().filter(move |i| i.port == port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_hand_written_cassette() {
        let yaml = r#"
name: commit-fixes
recorded_at: 2026-03-01T12:00:00Z
commit: 4f2a9c1
interactions:
  - seq: 0
    port: git
    method: current_commit
    input: {}
    output: { ok: 4f2a9c1 }
  - seq: 1
    port: shell
    method: run
    input: { program: pre-commit, args: ["--version"], cwd: /work/widgets }
    output: { ok: { exit_code: 0, stdout: "pre-commit 3.7.0\n", stderr: "" } }
"#;
        let cassette = Cassette::from_yaml(yaml).unwrap();
        assert_eq!(cassette.name, "commit-fixes");
        assert_eq!(cassette.interactions.len(), 2);
        assert_eq!(cassette.interactions[0].output, json!({"ok": "4f2a9c1"}));
        assert_eq!(cassette.for_port("shell").count(), 1);
        assert_eq!(cassette.for_port("fs").count(), 0);
    }
}
