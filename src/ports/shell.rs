//! Shell executor port for running external commands.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::PortError;

/// The output of a command execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellOutput {
    /// The exit code of the process, `-1` when it was killed by a signal.
    pub exit_code: i32,
    /// The captured standard output.
    pub stdout: String,
    /// The captured standard error.
    pub stderr: String,
}

impl ShellOutput {
    /// Standard output followed by standard error.
    ///
    /// Interleaving is lost, so this is for scanning and display only. Parse
    /// `stdout` when line order matters.
    #[must_use]
    pub fn combined(&self) -> String {
        let mut text = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&self.stderr);
        }
        text
    }
}

/// Executes external programs synchronously.
///
/// Abstracting execution allows deterministic replay by recording
/// and replaying command outputs during cassette playback.
pub trait ShellExecutor: Send + Sync {
    /// Runs `program` with `args` in `cwd`, blocking until it exits.
    ///
    /// A non-zero exit code is not an error; it is reported in the output.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned. Spawn failures
    /// from the live adapter carry the underlying [`std::io::Error`].
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<ShellOutput, PortError>;
}
