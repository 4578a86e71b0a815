//! Content-generator port: computes and regenerates "dynamic" files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::PortError;

/// How a generated file relates to what is on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileStatus {
    /// On disk content matches the generated content.
    Unchanged,
    /// File is generated but missing on disk.
    Created,
    /// File exists but its content differs.
    Modified,
    /// File exists but should not.
    Removed,
}

impl FileStatus {
    /// Returns `true` for every status except [`FileStatus::Unchanged`].
    #[must_use]
    pub fn is_change(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Comparison result for one generated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileComparison {
    /// Path relative to the repository root.
    pub path: String,
    /// Comparison status.
    pub status: FileStatus,
}

/// Result of comparing generated content against the working tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentComparison {
    /// Per-file comparison results.
    pub results: Vec<FileComparison>,
    /// Category name to (path to changed?) map.
    pub changes: BTreeMap<String, BTreeMap<String, bool>>,
    /// Human-readable summary.
    pub summary: String,
}

impl ContentComparison {
    /// Returns `true` if any entry of the change map is set.
    #[must_use]
    pub fn has_drift(&self) -> bool {
        self.changes.values().any(|category| category.values().any(|changed| *changed))
    }
}

/// Knows how to compute and materialize generated files.
pub trait ContentGenerator {
    /// Compares generated content with the working tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be computed or read.
    fn compare_files(&self) -> Result<ContentComparison, PortError>;

    /// Writes the generated content into the working tree.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be written or removed.
    fn apply_changes(&self) -> Result<(), PortError>;
}
