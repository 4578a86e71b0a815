//! Materializes the hook tool's config as a file for the duration of a run.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{HookError, HookResult};
use crate::ports::FileSystem;

/// Hook configuration as supplied by a caller.
#[derive(Debug, Clone, PartialEq)]
pub enum HookConfig {
    /// Structured config, serialized to YAML.
    Inline(serde_yaml::Value),
    /// Raw config text, written as is.
    Text(String),
    /// An existing config file, relative paths resolve against the repository root.
    Path(PathBuf),
}

/// A config file that exists for as long as this value lives.
///
/// Temporary files are written next to the repository root (outside the
/// working tree, so stashing never touches them) and removed exactly once:
/// by [`MaterializedConfig::cleanup`] or, failing that, on drop.
pub struct MaterializedConfig<'a> {
    fs: &'a dyn FileSystem,
    path: PathBuf,
    temporary: bool,
    removed: bool,
}

impl std::fmt::Debug for MaterializedConfig<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaterializedConfig")
            .field("path", &self.path)
            .field("temporary", &self.temporary)
            .field("removed", &self.removed)
            .finish_non_exhaustive()
    }
}

impl<'a> MaterializedConfig<'a> {
    /// Resolves `config` to a file path, writing a temporary file if needed.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::ConfigNotFound`] for a path that does not exist and
    /// [`HookError::ConfigWrite`] if the temporary file cannot be written.
    pub fn materialize(
        fs: &'a dyn FileSystem,
        root: &Path,
        config: &HookConfig,
    ) -> HookResult<Self> {
        let content = match config {
            HookConfig::Path(path) => {
                let path = if path.is_absolute() { path.clone() } else { root.join(path) };
                if !fs.exists(&path) {
                    return Err(HookError::ConfigNotFound(path));
                }
                return Ok(Self { fs, path, temporary: false, removed: false });
            }
            HookConfig::Text(text) => text.clone(),
            HookConfig::Inline(value) => {
                serde_yaml::to_string(value).map_err(|e| HookError::ConfigWrite {
                    path: temporary_path(root),
                    reason: e.to_string(),
                })?
            }
        };

        let path = temporary_path(root);
        fs.write(&path, &content)
            .map_err(|e| HookError::ConfigWrite { path: path.clone(), reason: e.to_string() })?;
        info!(path = %path.display(), "created temporary hook config");
        debug!(content = %content, "hook config content");
        Ok(Self { fs, path, temporary: true, removed: false })
    }

    /// Path to hand to the hook tool.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if the file was written by [`Self::materialize`].
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    /// Removes the temporary file. Safe to call any number of times;
    /// caller-owned files are never touched.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::ConfigWrite`] if the file exists but cannot be removed.
    pub fn cleanup(&mut self) -> HookResult<()> {
        if !self.temporary || self.removed {
            return Ok(());
        }
        self.fs
            .remove_file(&self.path)
            .map_err(|e| HookError::ConfigWrite { path: self.path.clone(), reason: e.to_string() })?;
        self.removed = true;
        info!(path = %self.path.display(), "removed temporary hook config");
        Ok(())
    }
}

impl Drop for MaterializedConfig<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            warn!(error = %e, "failed to remove temporary hook config");
        }
    }
}

/// Deterministic location of the temporary config for the clone at `root`.
#[must_use]
pub fn temporary_path(root: &Path) -> PathBuf {
    let name = root.file_name().map_or_else(|| "repo".into(), |n| n.to_string_lossy());
    let dir = root.parent().unwrap_or(root);
    dir.join(format!(".__hooksync_{name}_config__.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::live::filesystem::LiveFileSystem;

    fn repo_root() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("project");
        std::fs::create_dir_all(&root).unwrap();
        (dir, root)
    }

    #[test]
    fn existing_path_is_used_in_place() {
        let (_dir, root) = repo_root();
        std::fs::write(root.join(".pre-commit-config.yaml"), "repos: []\n").unwrap();
        let fs = LiveFileSystem;

        let mut config = MaterializedConfig::materialize(
            &fs,
            &root,
            &HookConfig::Path(PathBuf::from(".pre-commit-config.yaml")),
        )
        .unwrap();
        assert!(!config.is_temporary());
        assert_eq!(config.path(), root.join(".pre-commit-config.yaml"));

        config.cleanup().unwrap();
        drop(config);
        assert!(root.join(".pre-commit-config.yaml").exists());
    }

    #[test]
    fn missing_path_is_config_not_found() {
        let (_dir, root) = repo_root();
        let fs = LiveFileSystem;
        let err = MaterializedConfig::materialize(&fs, &root, &HookConfig::Path("nope.yaml".into()))
            .unwrap_err();
        assert!(matches!(err, HookError::ConfigNotFound(p) if p == root.join("nope.yaml")));
    }

    #[test]
    fn text_is_written_beside_the_root_and_removed_once() {
        let (_dir, root) = repo_root();
        let fs = LiveFileSystem;

        let mut config =
            MaterializedConfig::materialize(&fs, &root, &HookConfig::Text("repos: []\n".into()))
                .unwrap();
        let path = config.path().to_path_buf();
        assert!(config.is_temporary());
        assert_eq!(path.parent(), root.parent());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "repos: []\n");

        config.cleanup().unwrap();
        assert!(!path.exists());
        config.cleanup().unwrap();
    }

    #[test]
    fn inline_config_is_serialized_and_removed_on_drop() {
        let (_dir, root) = repo_root();
        let fs = LiveFileSystem;
        let value: serde_yaml::Value = serde_yaml::from_str(
            "repos:\n  - repo: local\n    hooks:\n      - id: fmt\n        name: fmt\n        entry: cargo fmt\n        language: system\n",
        )
        .unwrap();

        let path = {
            let config =
                MaterializedConfig::materialize(&fs, &root, &HookConfig::Inline(value.clone()))
                    .unwrap();
            let written: serde_yaml::Value =
                serde_yaml::from_str(&std::fs::read_to_string(config.path()).unwrap()).unwrap();
            assert_eq!(written, value);
            config.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn temporary_path_is_deterministic_per_clone() {
        let a = temporary_path(Path::new("/work/widgets"));
        assert_eq!(a, temporary_path(Path::new("/work/widgets")));
        assert_eq!(a, PathBuf::from("/work/.__hooksync_widgets_config__.yaml"));
        assert_ne!(a, temporary_path(Path::new("/work/gadgets")));
    }
}
