//! Shared, append-only record of everything that could not be backed up
//!
//! One collector is created per run and cloned into every extraction worker
//! and every fetch/write task. Appends go through a mutex, so none are lost no
//! matter how many threads or tasks report at once.

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

/// Marker used in place of a file path when a commit's diff could not be read
pub const FILES_UNAVAILABLE: &str = "Files could not be retrieved";

/// What failed within a commit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailureTarget {
  /// A single file could not be fetched or written
  File(PathBuf),
  /// The commit's changed-file list could not be extracted
  FilesUnavailable,
}

impl fmt::Display for FailureTarget {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FailureTarget::File(path) => write!(f, "{}", path.display()),
      FailureTarget::FilesUnavailable => f.write_str(FILES_UNAVAILABLE),
    }
  }
}

impl Serialize for FailureTarget {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

/// A (commit, file-or-marker) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FailureRecord {
  pub commit: String,
  #[serde(rename = "file")]
  pub target: FailureTarget,
}

impl FailureRecord {
  pub fn file(commit: impl Into<String>, path: impl Into<PathBuf>) -> Self {
    Self {
      commit: commit.into(),
      target: FailureTarget::File(path.into()),
    }
  }

  pub fn files_unavailable(commit: impl Into<String>) -> Self {
    Self {
      commit: commit.into(),
      target: FailureTarget::FilesUnavailable,
    }
  }
}

/// Clonable handle to the run's failure list
#[derive(Debug, Clone, Default)]
pub struct FailureCollector {
  records: Arc<Mutex<Vec<FailureRecord>>>,
}

impl FailureCollector {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append one record
  pub fn push(&self, record: FailureRecord) {
    self.lock().push(record);
  }

  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.lock().len()
  }

  #[cfg(test)]
  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }

  /// Copy of everything recorded so far
  pub fn snapshot(&self) -> Vec<FailureRecord> {
    self.lock().clone()
  }

  // A panicking appender cannot leave a half-pushed Vec, so poisoning is ignored.
  fn lock(&self) -> MutexGuard<'_, Vec<FailureRecord>> {
    self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}
