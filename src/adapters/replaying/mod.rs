//! Replaying adapters that replay recorded interactions.

pub mod change_request;
pub mod filesystem;
pub mod git;
pub mod shell;

pub use change_request::ReplayingChangeRequests;
pub use filesystem::ReplayingFileSystem;
pub use git::ReplayingGitRepo;
pub use shell::ReplayingShellExecutor;

use std::sync::Mutex;

use serde::de::DeserializeOwned;

use crate::cassette::replayer::CassetteReplayer;
use crate::ports::PortError;

/// Takes the output of the next interaction for `port::method`.
pub(crate) fn next_output(
    replayer: &Mutex<CassetteReplayer>,
    port: &str,
    method: &str,
) -> serde_json::Value {
    let mut replayer = replayer.lock().expect("replayer lock poisoned");
    replayer.next_interaction(port, method).output.clone()
}

/// Extracts a Result from a cassette output JSON value.
///
/// Expects `{"ok": <value>}` or `{"err": "message"}`; a bare value is
/// treated as ok.
pub(crate) fn extract_result<T: DeserializeOwned>(
    output: &serde_json::Value,
    context: &str,
) -> Result<T, PortError> {
    if let Some(err) = output.get("err") {
        let msg = err.as_str().unwrap_or("unknown error").to_string();
        return Err(msg.into());
    }
    let value = output.get("ok").unwrap_or(output);
    serde_json::from_value(value.clone())
        .map_err(|e| format!("{context}: failed to deserialize: {e}").into())
}

/// Next interaction for `port::method`, decoded as a Result.
pub(crate) fn replay_result<T: DeserializeOwned>(
    replayer: &Mutex<CassetteReplayer>,
    port: &str,
    method: &str,
) -> Result<T, PortError> {
    let output = next_output(replayer, port, method);
    extract_result(&output, &format!("{port}::{method}"))
}
