//! Content generator backed by a YAML manifest.
//!
//! ```yaml
//! files:
//!   .github/CODEOWNERS: |
//!     * @acme/maintainers
//! remove:
//!   - .travis.yml
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HookError, HookResult};
use crate::ports::{ContentComparison, ContentGenerator, FileComparison, FileStatus, FileSystem, PortError};

/// Category of files the manifest writes.
pub const FILES_CATEGORY: &str = "files";
/// Category of files the manifest deletes.
pub const REMOVE_CATEGORY: &str = "remove";

/// Desired state of the generated files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Path (relative to the repository root) to exact file content.
    #[serde(default)]
    pub files: BTreeMap<String, String>,
    /// Paths that must not exist.
    #[serde(default)]
    pub remove: Vec<String>,
}

/// Compares and applies a [`Manifest`] through the filesystem port.
pub struct ManifestGenerator<'a> {
    fs: &'a dyn FileSystem,
    root: PathBuf,
    manifest: Manifest,
}

impl<'a> ManifestGenerator<'a> {
    /// Generator for an already parsed manifest.
    #[must_use]
    pub fn new(fs: &'a dyn FileSystem, root: impl Into<PathBuf>, manifest: Manifest) -> Self {
        Self { fs, root: root.into(), manifest }
    }

    /// Reads the manifest at `path` (relative paths resolve against `root`).
    ///
    /// # Errors
    ///
    /// Returns [`HookError::Content`] if the manifest cannot be read or parsed.
    pub fn load(fs: &'a dyn FileSystem, root: &Path, path: &Path) -> HookResult<Self> {
        let path = if path.is_absolute() { path.to_path_buf() } else { root.join(path) };
        let content = fs.read_to_string(&path).map_err(|e| {
            HookError::Content(format!("failed to read manifest {}: {e}", path.display()))
        })?;
        let manifest: Manifest = serde_yaml::from_str(&content).map_err(|e| {
            HookError::Content(format!("failed to parse manifest {}: {e}", path.display()))
        })?;
        Ok(Self::new(fs, root, manifest))
    }

    fn status_of(&self, path: &str, wanted: Option<&str>) -> Result<FileStatus, PortError> {
        let full = self.root.join(path);
        let exists = self.fs.exists(&full);
        Ok(match wanted {
            None if exists => FileStatus::Removed,
            None => FileStatus::Unchanged,
            Some(_) if !exists => FileStatus::Created,
            Some(content) if self.fs.read_to_string(&full)? == content => FileStatus::Unchanged,
            Some(_) => FileStatus::Modified,
        })
    }
}

impl ContentGenerator for ManifestGenerator<'_> {
    fn compare_files(&self) -> Result<ContentComparison, PortError> {
        let mut comparison = ContentComparison::default();

        for (path, content) in &self.manifest.files {
            let status = self.status_of(path, Some(content))?;
            comparison
                .changes
                .entry(FILES_CATEGORY.to_string())
                .or_default()
                .insert(path.clone(), status.is_change());
            comparison.results.push(FileComparison { path: path.clone(), status });
        }
        for path in &self.manifest.remove {
            let status = self.status_of(path, None)?;
            comparison
                .changes
                .entry(REMOVE_CATEGORY.to_string())
                .or_default()
                .insert(path.clone(), status.is_change());
            comparison.results.push(FileComparison { path: path.clone(), status });
        }

        comparison.summary = summarize(&comparison.results);
        debug!(summary = %comparison.summary, "compared dynamic files");
        Ok(comparison)
    }

    fn apply_changes(&self) -> Result<(), PortError> {
        for (path, content) in &self.manifest.files {
            if self.status_of(path, Some(content))?.is_change() {
                self.fs.write(&self.root.join(path), content)?;
            }
        }
        for path in &self.manifest.remove {
            if self.status_of(path, None)?.is_change() {
                self.fs.remove_file(&self.root.join(path))?;
            }
        }
        Ok(())
    }
}

fn summarize(results: &[FileComparison]) -> String {
    let count = |wanted: FileStatus| results.iter().filter(|r| r.status == wanted).count();
    let mut summary = format!(
        "{} dynamic files checked: {} created, {} modified, {} removed, {} unchanged.",
        results.len(),
        count(FileStatus::Created),
        count(FileStatus::Modified),
        count(FileStatus::Removed),
        count(FileStatus::Unchanged),
    );
    for result in results.iter().filter(|r| r.status.is_change()) {
        summary.push_str(&format!("\n  {:?}: {}", result.status, result.path));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::live::filesystem::LiveFileSystem;

    fn manifest() -> Manifest {
        serde_yaml::from_str(
            "files:\n  README.md: \"# widgets\\n\"\n  .github/CODEOWNERS: \"* @acme\\n\"\n  LICENSE: \"MIT\\n\"\nremove:\n  - .travis.yml\n  - setup.cfg\n",
        )
        .unwrap()
    }

    #[test]
    fn compare_reports_each_status_and_drift() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), "# old\n").unwrap();
        std::fs::write(dir.path().join("LICENSE"), "MIT\n").unwrap();
        std::fs::write(dir.path().join(".travis.yml"), "language: rust\n").unwrap();

        let fs = LiveFileSystem;
        let generator = ManifestGenerator::new(&fs, dir.path(), manifest());
        let comparison = generator.compare_files().unwrap();

        let status = |path: &str| {
            comparison.results.iter().find(|r| r.path == path).map(|r| r.status)
        };
        assert_eq!(status("README.md"), Some(FileStatus::Modified));
        assert_eq!(status(".github/CODEOWNERS"), Some(FileStatus::Created));
        assert_eq!(status("LICENSE"), Some(FileStatus::Unchanged));
        assert_eq!(status(".travis.yml"), Some(FileStatus::Removed));
        assert_eq!(status("setup.cfg"), Some(FileStatus::Unchanged));
        assert!(comparison.has_drift());
        assert!(comparison
            .summary
            .starts_with("5 dynamic files checked: 1 created, 1 modified, 1 removed, 2 unchanged."));
    }

    #[test]
    fn apply_then_compare_has_no_drift() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".travis.yml"), "language: rust\n").unwrap();

        let fs = LiveFileSystem;
        let generator = ManifestGenerator::new(&fs, dir.path(), manifest());
        generator.apply_changes().unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join(".github/CODEOWNERS")).unwrap(),
            "* @acme\n"
        );
        assert!(!dir.path().join(".travis.yml").exists());
        assert!(!generator.compare_files().unwrap().has_drift());
    }

    #[test]
    fn load_rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("dynamic.yaml"), "files: {}\ntemplates: []\n").unwrap();
        let fs = LiveFileSystem;
        let err = ManifestGenerator::load(&fs, dir.path(), Path::new("dynamic.yaml")).err().unwrap();
        assert!(matches!(err, HookError::Content(ref msg) if msg.contains("failed to parse manifest")));
    }
}
