//! Recording adapter for the `ShellExecutor` port.

use std::path::Path;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::record_interaction;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::{PortError, ShellExecutor, ShellOutput};

/// Records shell interactions while delegating to an inner implementation.
pub struct RecordingShellExecutor {
    inner: Box<dyn ShellExecutor>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingShellExecutor {
    /// Creates a new recording shell executor wrapping the given implementation.
    pub fn new(inner: Box<dyn ShellExecutor>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct RunInput<'a> {
    program: &'a str,
    args: &'a [String],
    cwd: String,
}

impl ShellExecutor for RecordingShellExecutor {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<ShellOutput, PortError> {
        let result = self.inner.run(program, args, cwd);
        let input = RunInput { program, args, cwd: cwd.display().to_string() };
        // Spawn failures keep their io error kind so replays classify them alike.
        let output = match &result {
            Ok(output) => serde_json::json!({ "ok": output }),
            Err(e) => match e.downcast_ref::<std::io::Error>() {
                Some(io) => serde_json::json!({ "err": e.to_string(), "kind": format!("{:?}", io.kind()) }),
                None => serde_json::json!({ "err": e.to_string() }),
            },
        };
        record_interaction(&self.recorder, "shell", "run", &input, &output);
        result
    }
}
