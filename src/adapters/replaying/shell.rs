//! Replaying adapter for the `ShellExecutor` port.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Mutex;

use super::{extract_result, next_output};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{PortError, ShellExecutor, ShellOutput};

/// Replays recorded command results from a cassette.
pub struct ReplayingShellExecutor {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingShellExecutor {
    /// Creates a new replaying shell executor from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

fn io_kind(name: &str) -> Option<ErrorKind> {
    match name {
        "NotFound" => Some(ErrorKind::NotFound),
        "PermissionDenied" => Some(ErrorKind::PermissionDenied),
        _ => None,
    }
}

impl ShellExecutor for ReplayingShellExecutor {
    fn run(&self, _program: &str, _args: &[String], _cwd: &Path) -> Result<ShellOutput, PortError> {
        let output = next_output(&self.replayer, "shell", "run");
        if let (Some(err), Some(kind)) = (
            output.get("err").and_then(serde_json::Value::as_str),
            output.get("kind").and_then(serde_json::Value::as_str).and_then(io_kind),
        ) {
            return Err(Box::new(std::io::Error::new(kind, err.to_string())));
        }
        extract_result(&output, "shell::run")
    }
}
