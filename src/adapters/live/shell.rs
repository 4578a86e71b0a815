//! Live shell executor using `std::process::Command`.

use std::path::Path;
use std::process::Command;

use crate::ports::shell::{ShellExecutor, ShellOutput};
use crate::ports::PortError;

/// Live executor that spawns programs directly (no intermediate shell).
pub struct LiveShellExecutor;

impl ShellExecutor for LiveShellExecutor {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<ShellOutput, PortError> {
        let output = Command::new(program).args(args).current_dir(cwd).output()?;
        Ok(ShellOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
