//! Command dispatch and handlers.

pub mod parse;
pub mod run;
pub mod sync;

use std::env;
use std::path::{Path, PathBuf};

use crate::cassette::session::RecordingSession;
use crate::cli::{Cli, Command};
use crate::context::ServiceContext;
use crate::settings::Settings;

/// Dispatch a parsed command line to its handler.
///
/// When `HOOKSYNC_RECORD` is set to a directory path, all port interactions
/// are recorded to per-port cassette files in that directory.
///
/// # Errors
///
/// Returns an error string if the repository or settings cannot be loaded or
/// the selected command handler fails.
pub fn dispatch(cli: &Cli) -> Result<(), String> {
    if let Command::Parse { file } = &cli.command {
        return parse::run(file.as_deref());
    }

    let root = resolve_root(&cli.repo)?;
    let settings = Settings::load(&root)?;
    let (ctx, session) = if let Ok(dir) = env::var("HOOKSYNC_RECORD") {
        let (ctx, session) = ServiceContext::recording_at(root, settings, &PathBuf::from(dir))?;
        (ctx, Some(session))
    } else {
        (ServiceContext::live(root, settings), None)
    };

    let result = dispatch_with_context(&cli.command, &ctx);

    // Finish recording after command completes (even on error)
    if let Some(session) = session {
        // Drop context first to release Arc references
        drop(ctx);
        finish_recording(session)?;
    }

    result
}

/// Dispatch a command with the given service context.
///
/// # Errors
///
/// Returns the handler's error string.
pub fn dispatch_with_context(command: &Command, ctx: &ServiceContext) -> Result<(), String> {
    match command {
        Command::Run(args) => run::run_with_context(ctx, args),
        Command::Sync(args) => sync::run_with_context(ctx, args),
        Command::Parse { file } => parse::run(file.as_deref()),
    }
}

fn resolve_root(repo: &Path) -> Result<PathBuf, String> {
    repo.canonicalize()
        .map_err(|e| format!("Repository directory {} is not accessible: {e}", repo.display()))
}

/// Finish a recording session and print the output directory.
fn finish_recording(session: RecordingSession) -> Result<(), String> {
    let output_dir = session.finish()?;
    eprintln!("Recording saved to: {}", output_dir.display());
    Ok(())
}
