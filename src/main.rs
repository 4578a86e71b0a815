//! Binary entrypoint for the `hooksync` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // Tokens such as GITHUB_TOKEN may live in a local .env file.
    dotenvy::dotenv().ok();

    // Recording is handled in commands::dispatch via HOOKSYNC_RECORD=<dir>.
    match hooksync::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
