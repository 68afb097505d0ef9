//! In-memory repository for unit tests
//!
//! Commits are listed in insertion order (insert newest first to mimic git).
//! Every changed file gets the content `"<sha>:<path>"` unless overridden.

use crate::core::error::{BackupError, BackupResult, GitError};
use crate::core::vcs::{BlobLookup, CommitInfo, RepositoryAccess};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct MockRepo {
  commits: Vec<CommitInfo>,
  diffs: HashMap<String, Vec<PathBuf>>,
  failing_diffs: HashSet<String>,
  blobs: HashMap<(String, PathBuf), Vec<u8>>,
  failing_reads: HashSet<(String, PathBuf)>,
}

impl MockRepo {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a commit whose diff lists `files`, each with default content
  pub fn with_commit(mut self, sha: &str, timestamp: i64, files: &[&str]) -> Self {
    self.commits.push(CommitInfo::new(sha, timestamp));
    let paths: Vec<PathBuf> = files.iter().map(PathBuf::from).collect();
    for path in &paths {
      let content = format!("{}:{}", sha, path.display()).into_bytes();
      self.blobs.insert((sha.to_string(), path.clone()), content);
    }
    self.diffs.insert(sha.to_string(), paths);
    self
  }

  /// Set the content of one file at one commit
  pub fn with_blob(mut self, sha: &str, path: &str, content: &[u8]) -> Self {
    self.blobs.insert((sha.to_string(), PathBuf::from(path)), content.to_vec());
    self
  }

  /// Make `path` absent from the tree of `sha`
  pub fn deleted(mut self, sha: &str, path: &str) -> Self {
    self.blobs.remove(&(sha.to_string(), PathBuf::from(path)));
    self
  }

  /// Make the diff of `sha` fail
  pub fn fail_diff(mut self, sha: &str) -> Self {
    self.failing_diffs.insert(sha.to_string());
    self
  }

  /// Make reading `path` at `sha` fail with a non-deletion error
  pub fn fail_read(mut self, sha: &str, path: &str) -> Self {
    self.failing_reads.insert((sha.to_string(), PathBuf::from(path)));
    self
  }

  pub fn list_all(&self) -> Vec<CommitInfo> {
    self.commits.clone()
  }
}

impl RepositoryAccess for MockRepo {
  fn list_commits(&self, branch: &str) -> BackupResult<Vec<CommitInfo>> {
    if branch == "missing" {
      return Err(BackupError::Git(GitError::UnknownRevision {
        revision: branch.to_string(),
      }));
    }
    Ok(self.commits.clone())
  }

  fn changed_files(&self, commit_sha: &str) -> BackupResult<Vec<PathBuf>> {
    if self.failing_diffs.contains(commit_sha) {
      return Err(BackupError::Git(GitError::CommandFailed {
        command: "git diff-tree".to_string(),
        stderr: format!("fatal: bad object {}", commit_sha),
      }));
    }
    Ok(self.diffs.get(commit_sha).cloned().unwrap_or_default())
  }

  fn read_blob(&self, commit_sha: &str, path: &Path) -> BackupResult<BlobLookup> {
    let key = (commit_sha.to_string(), path.to_path_buf());
    if self.failing_reads.contains(&key) {
      return Err(BackupError::Git(GitError::CommandFailed {
        command: "git cat-file".to_string(),
        stderr: "fatal: unable to read object".to_string(),
      }));
    }
    Ok(match self.blobs.get(&key) {
      Some(bytes) => BlobLookup::Content(bytes.clone()),
      None => BlobLookup::DeletedAtCommit,
    })
  }
}
