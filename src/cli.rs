//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::hooks::Policy;

/// Top-level CLI parser for `hooksync`.
#[derive(Debug, Parser)]
#[command(
    name = "hooksync",
    version,
    about = "Keep a working copy convergent with its hooks and generated files"
)]
pub struct Cli {
    /// Root of the working copy to act on.
    #[arg(long, global = true, env = "HOOKSYNC_REPO", default_value = ".")]
    pub repo: PathBuf,

    /// Log protocol steps at debug level.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Emit logs as newline-delimited JSON on stderr.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the hooks and act on the result according to a policy.
    Run(RunArgs),
    /// Bring the generated files in line with their manifest.
    Sync(SyncArgs),
    /// Parse captured hook-tool output and print the report.
    Parse {
        /// File holding the output; stdin when omitted.
        file: Option<PathBuf>,
    },
}

/// Arguments of `hooksync run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// none, report, fail, commit, amend or pull.
    #[arg(long)]
    pub policy: Policy,

    /// Commit message for fixes (required by commit and pull).
    #[arg(long, short)]
    pub message: Option<String>,

    /// Hook config file; defaults to the configured `hook_config`.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Only check files changed since this ref.
    #[arg(long, requires = "to_ref")]
    pub from_ref: Option<String>,

    /// Only check files changed up to this ref.
    #[arg(long, requires = "from_ref")]
    pub to_ref: Option<String>,

    /// Print the result as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Arguments of `hooksync sync`.
#[derive(Debug, Args)]
pub struct SyncArgs {
    /// none, report, fail, commit, amend or pull.
    #[arg(long)]
    pub policy: Policy,

    /// Message of the sync commit.
    #[arg(long, short)]
    pub message: Option<String>,

    /// Manifest of dynamic files; defaults to the configured `dynamic_manifest`.
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Hook config to run over the sync commit.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the result as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}
