//! Service context bundling all port trait objects.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adapters::live::change_request::{GithubChangeRequests, UnconfiguredChangeRequests};
use crate::adapters::live::filesystem::LiveFileSystem;
use crate::adapters::live::git::LiveGitRepo;
use crate::adapters::live::shell::LiveShellExecutor;
use crate::adapters::recording::{
    RecordingChangeRequests, RecordingFileSystem, RecordingGitRepo, RecordingShellExecutor,
};
use crate::adapters::replaying::{
    ReplayingChangeRequests, ReplayingFileSystem, ReplayingGitRepo, ReplayingShellExecutor,
};
use crate::cassette::config::CassetteConfig;
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::cassette::session::RecordingSession;
use crate::ports::{
    ChangeRequest, ChangeRequestDraft, ChangeRequests, CommitRequest, FileSystem, GitRepo,
    PortError, ShellExecutor, ShellOutput,
};
use crate::settings::Settings;

/// Bundles the repository root, settings and all port trait objects.
///
/// Every engine operation receives one of these explicitly. Constructors
/// wire up different adapter implementations (live, replaying, recording).
pub struct ServiceContext {
    /// Root of the working copy the engine acts on.
    pub root: PathBuf,
    /// Effective settings.
    pub settings: Settings,
    /// Filesystem for file I/O.
    pub fs: Box<dyn FileSystem>,
    /// Repository handle.
    pub git: Box<dyn GitRepo>,
    /// Subprocess runner for the hook tool.
    pub shell: Box<dyn ShellExecutor>,
    /// Code-hosting service for proposing side branches.
    pub change_requests: Box<dyn ChangeRequests>,
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("root", &self.root)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ServiceContext {
    /// Creates a live context acting on the working copy at `root`.
    ///
    /// Change requests go to GitHub when `settings.github` is set and fail
    /// with a clear error otherwise.
    #[must_use]
    pub fn live(root: impl Into<PathBuf>, settings: Settings) -> Self {
        let root = root.into();
        let change_requests: Box<dyn ChangeRequests> = match settings.github.clone() {
            Some(github) => Box::new(GithubChangeRequests::new(github)),
            None => Box::new(UnconfiguredChangeRequests),
        };
        Self {
            fs: Box::new(LiveFileSystem),
            git: Box::new(LiveGitRepo::new(root.clone())),
            shell: Box::new(LiveShellExecutor),
            change_requests,
            root,
            settings,
        }
    }

    /// Creates a live context whose ports record into per-port cassettes
    /// under `<dir>/<timestamp>/`.
    ///
    /// Drop the context before calling [`RecordingSession::finish`].
    ///
    /// # Errors
    ///
    /// Returns an error if the session directory cannot be created.
    pub fn recording_at(
        root: impl Into<PathBuf>,
        settings: Settings,
        dir: &Path,
    ) -> Result<(Self, RecordingSession), String> {
        let live = Self::live(root, settings);
        let commit = live.git.current_commit().unwrap_or_else(|_| "unknown".to_string());
        let session = RecordingSession::new(dir, &commit)?;

        let ctx = Self {
            fs: Box::new(RecordingFileSystem::new(live.fs, Arc::clone(&session.fs))),
            git: Box::new(RecordingGitRepo::new(live.git, Arc::clone(&session.git))),
            shell: Box::new(RecordingShellExecutor::new(live.shell, Arc::clone(&session.shell))),
            change_requests: Box::new(RecordingChangeRequests::new(
                live.change_requests,
                Arc::clone(&session.change_requests),
            )),
            root: live.root,
            settings: live.settings,
        };
        Ok((ctx, session))
    }

    /// Creates a replaying context from a monolithic cassette file.
    ///
    /// Each port gets its own replayer over the same cassette, so per-port
    /// cursors are independent.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(
        root: impl Into<PathBuf>,
        settings: Settings,
        path: &Path,
    ) -> Result<Self, String> {
        let cassette = CassetteConfig::load_cassette(path)?;
        Ok(Self {
            root: root.into(),
            settings,
            fs: Box::new(ReplayingFileSystem::new(CassetteReplayer::new(&cassette))),
            git: Box::new(ReplayingGitRepo::new(CassetteReplayer::new(&cassette))),
            shell: Box::new(ReplayingShellExecutor::new(CassetteReplayer::new(&cassette))),
            change_requests: Box::new(ReplayingChangeRequests::new(CassetteReplayer::new(
                &cassette,
            ))),
        })
    }

    /// Creates a replaying context from per-port cassette files.
    ///
    /// Ports without a configured cassette use a panicking adapter that
    /// fails with a clear message when called.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette file cannot be read or parsed.
    pub fn replaying_from(
        root: impl Into<PathBuf>,
        settings: Settings,
        config: &CassetteConfig,
    ) -> Result<Self, String> {
        let replayers = config.load_all()?;

        Ok(Self {
            root: root.into(),
            settings,
            fs: match replayers.fs {
                Some(r) => Box::new(ReplayingFileSystem::new(r)),
                None => Box::new(PanickingFileSystem),
            },
            git: match replayers.git {
                Some(r) => Box::new(ReplayingGitRepo::new(r)),
                None => Box::new(PanickingGitRepo),
            },
            shell: match replayers.shell {
                Some(r) => Box::new(ReplayingShellExecutor::new(r)),
                None => Box::new(PanickingShellExecutor),
            },
            change_requests: match replayers.change_requests {
                Some(r) => Box::new(ReplayingChangeRequests::new(r)),
                None => Box::new(PanickingChangeRequests),
            },
        })
    }

    /// Wraps every port in a recording adapter writing to `log`, giving one
    /// ordered trace of all port calls.
    #[must_use]
    pub fn record_into(self, log: &Arc<Mutex<CassetteRecorder>>) -> Self {
        Self {
            fs: Box::new(RecordingFileSystem::new(self.fs, Arc::clone(log))),
            git: Box::new(RecordingGitRepo::new(self.git, Arc::clone(log))),
            shell: Box::new(RecordingShellExecutor::new(self.shell, Arc::clone(log))),
            change_requests: Box::new(RecordingChangeRequests::new(
                self.change_requests,
                Arc::clone(log),
            )),
            root: self.root,
            settings: self.settings,
        }
    }
}

// --- Panicking adapters for unspecified ports ---

struct PanickingFileSystem;
impl FileSystem for PanickingFileSystem {
    fn read_to_string(&self, _path: &Path) -> Result<String, PortError> {
        panic!("FileSystem port not configured in CassetteConfig: no cassette loaded for fs");
    }
    fn write(&self, _path: &Path, _contents: &str) -> Result<(), PortError> {
        panic!("FileSystem port not configured in CassetteConfig: no cassette loaded for fs");
    }
    fn exists(&self, _path: &Path) -> bool {
        panic!("FileSystem port not configured in CassetteConfig: no cassette loaded for fs");
    }
    fn remove_file(&self, _path: &Path) -> Result<(), PortError> {
        panic!("FileSystem port not configured in CassetteConfig: no cassette loaded for fs");
    }
}

struct PanickingGitRepo;
impl PanickingGitRepo {
    fn unconfigured() -> ! {
        panic!("GitRepo port not configured in CassetteConfig: no cassette loaded for git");
    }
}
impl GitRepo for PanickingGitRepo {
    fn current_commit(&self) -> Result<String, PortError> {
        Self::unconfigured()
    }
    fn current_branch(&self) -> Result<String, PortError> {
        Self::unconfigured()
    }
    fn checkout(&self, _branch: &str, _reset: bool) -> Result<(), PortError> {
        Self::unconfigured()
    }
    fn stash(&self) -> Result<bool, PortError> {
        Self::unconfigured()
    }
    fn stash_pop(&self) -> Result<(), PortError> {
        Self::unconfigured()
    }
    fn discard_changes(&self) -> Result<(), PortError> {
        Self::unconfigured()
    }
    fn commit(&self, _request: &CommitRequest) -> Result<String, PortError> {
        Self::unconfigured()
    }
    fn push(&self, _remote: &str, _set_upstream: bool, _force: bool) -> Result<String, PortError> {
        Self::unconfigured()
    }
}

struct PanickingShellExecutor;
impl ShellExecutor for PanickingShellExecutor {
    fn run(&self, program: &str, _args: &[String], _cwd: &Path) -> Result<ShellOutput, PortError> {
        panic!(
            "ShellExecutor port not configured in CassetteConfig: no cassette loaded for shell \
             (tried to run {program})"
        );
    }
}

struct PanickingChangeRequests;
impl ChangeRequests for PanickingChangeRequests {
    fn create_change_request(&self, _draft: &ChangeRequestDraft) -> Result<ChangeRequest, PortError> {
        panic!(
            "ChangeRequests port not configured in CassetteConfig: no cassette loaded for change_requests"
        );
    }
}
