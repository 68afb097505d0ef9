pub mod system_git;
mod system_git_ops;

pub use system_git::SystemGit;

use crate::core::error::BackupResult;
use std::path::{Path, PathBuf};

/// Read-only view of a repository's history used by the backup pipeline
///
/// Every call may block on a subprocess. Implementations must be shareable
/// across the extraction thread pool and the blocking fetch workers.
pub trait RepositoryAccess: Send + Sync {
  /// Commits reachable from `branch`, newest first, with committed timestamps
  fn list_commits(&self, branch: &str) -> BackupResult<Vec<CommitInfo>>;

  /// Paths changed by `commit_sha` relative to its parent (name-only diff)
  fn changed_files(&self, commit_sha: &str) -> BackupResult<Vec<PathBuf>>;

  /// Exact content of `path` as tracked at `commit_sha`
  ///
  /// A path missing from the commit's tree, or replaced there by a
  /// directory, is reported as `BlobLookup::DeletedAtCommit`, never as an error.
  fn read_blob(&self, commit_sha: &str, path: &Path) -> BackupResult<BlobLookup>;
}

/// Information about a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
  pub sha: String,
  /// Committer time, seconds since the Unix epoch
  pub timestamp: i64,
}

impl CommitInfo {
  pub fn new(sha: impl Into<String>, timestamp: i64) -> Self {
    Self {
      sha: sha.into(),
      timestamp,
    }
  }
}

/// Outcome of a blob lookup that did not fail outright
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobLookup {
  /// Raw bytes of the file at that commit
  Content(Vec<u8>),
  /// The path does not exist in that commit's tree
  DeletedAtCommit,
}
