//! `hooksync parse` command.

use std::io::Read;
use std::path::Path;

use crate::hooks::invoker::{check_fatal_lines, strip_ansi};
use crate::hooks::parser::parse_run;
use crate::hooks::{report, Pass, RunOutcome};

/// Parses captured tool output the same way a live run does.
///
/// # Errors
///
/// Returns an error string for a fatal tool line or a duplicate hook id.
pub fn parse_text(text: &str) -> Result<RunOutcome, String> {
    let text = strip_ansi(text);
    check_fatal_lines(&text).map_err(|e| e.to_string())?;
    parse_run(&text, Pass::Validation).map_err(|e| e.to_string())
}

/// Execute the `parse` command on `file`, or stdin when `None`.
///
/// # Errors
///
/// Returns an error string if the input cannot be read or parsed.
pub fn run(file: Option<&Path>) -> Result<(), String> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| format!("Failed to read stdin: {e}"))?;
            text
        }
    };
    print!("{}", report::format_outcome(&parse_text(&text)?));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colored_output_is_parsed() {
        let outcome = parse_text(
            "trim trailing whitespace.....\x1b[42mPassed\x1b[m\n- hook id: trailing-whitespace\n",
        )
        .unwrap();
        assert!(outcome.passed);
        assert!(outcome.check("trailing-whitespace").is_some());
    }

    #[test]
    fn fatal_line_is_an_error() {
        let err = parse_text("An unexpected error has occurred: CalledProcessError\n").unwrap_err();
        assert!(err.contains("CalledProcessError"));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = run(Some(Path::new("/nonexistent/hooks.log"))).unwrap_err();
        assert!(err.starts_with("Failed to read /nonexistent/hooks.log"));
    }
}
