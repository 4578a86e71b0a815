//! Core library entry for the `hooksync` CLI.
//!
//! Keeps a working copy convergent with its lint/format hooks and with its
//! generated files. The engine lives in [`hooks`], [`relocate`] and [`sync`];
//! it talks to the outside world only through the traits in [`ports`].

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod context;
pub mod error;
pub mod hooks;
pub mod ports;
pub mod relocate;
pub mod settings;
pub mod sync;
pub mod telemetry;

use clap::error::ErrorKind;
use clap::Parser;
use tracing::Level;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.to_string()),
    };
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    telemetry::init_tracing(cli.log_json, level);
    commands::dispatch(&cli)
}
