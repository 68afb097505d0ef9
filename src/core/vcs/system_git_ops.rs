//! History operations for SystemGit (commit walking, diffs, blob reads)

use super::system_git::SystemGit;
use super::{BlobLookup, CommitInfo, RepositoryAccess};
use crate::core::error::{BackupError, BackupResult, GitError};
use crate::utils::{path_from_git_bytes, path_to_git_format};
use std::path::{Path, PathBuf};

impl RepositoryAccess for SystemGit {
  /// Walk `branch` newest first
  ///
  /// `rev-list --timestamp` prints `<committer time> <sha>` per line, in the
  /// same order `git log` would.
  fn list_commits(&self, branch: &str) -> BackupResult<Vec<CommitInfo>> {
    if !self.resolves_to_commit(branch)? {
      return Err(BackupError::Git(GitError::UnknownRevision {
        revision: branch.to_string(),
      }));
    }

    let mut cmd = self.git_cmd();
    cmd.args(["rev-list", "--timestamp", branch, "--"]);
    let output = self.run_checked(cmd, "git rev-list")?;

    parse_rev_list_output(&output.stdout)
  }

  /// Name-only diff of a commit against its parent(s)
  ///
  /// `--root` makes the first commit list every file it introduces; `--cc`
  /// gives merges the same dense combined view `git show` uses.
  fn changed_files(&self, commit_sha: &str) -> BackupResult<Vec<PathBuf>> {
    let mut cmd = self.git_cmd();
    cmd.args(["diff-tree", "-r", "--cc", "--root", "--no-commit-id", "--name-only", "-z", commit_sha]);
    let output = self.run_checked(cmd, "git diff-tree")?;

    Ok(parse_name_list(&output.stdout))
  }

  /// Read a blob via `cat-file`; on failure, ask the tree what the path is
  ///
  /// Only a missing entry or a directory counts as a deletion. A file or
  /// gitlink that is present but unreadable is an error.
  fn read_blob(&self, commit_sha: &str, path: &Path) -> BackupResult<BlobLookup> {
    let object = format!("{}:{}", commit_sha, path_to_git_format(path));

    let mut cmd = self.git_cmd();
    cmd.args(["cat-file", "blob", &object]);
    let read_err = match self.run_checked(cmd, "git cat-file") {
      Ok(output) => return Ok(BlobLookup::Content(output.stdout)),
      Err(e) => e,
    };

    match self.tree_entry_kind(commit_sha, path)? {
      Some(kind) if kind != "tree" => Err(read_err),
      _ => Ok(BlobLookup::DeletedAtCommit),
    }
  }
}

impl SystemGit {
  /// Object type (`blob`, `tree`, `commit`) of the exact entry `path` in `commit_sha`
  pub(crate) fn tree_entry_kind(&self, commit_sha: &str, path: &Path) -> BackupResult<Option<String>> {
    let mut cmd = self.git_cmd();
    cmd
      .args(["ls-tree", "-z", "--full-tree", commit_sha, "--"])
      .arg(path_to_git_format(path));
    let output = self.run_checked(cmd, "git ls-tree")?;

    Ok(
      parse_ls_tree(&output.stdout)?
        .into_iter()
        .find(|entry| path_from_git_bytes(entry.path) == path)
        .map(|entry| entry.kind),
    )
  }
}

/// One `<mode> SP <type> SP <oid> TAB <path>` record of `ls-tree -z`
#[derive(Debug, PartialEq, Eq)]
struct TreeEntry<'a> {
  kind: String,
  path: &'a [u8],
}

fn parse_ls_tree(data: &[u8]) -> BackupResult<Vec<TreeEntry<'_>>> {
  let mut entries = Vec::new();

  for record in data.split(|b| *b == 0).filter(|r| !r.is_empty()) {
    let tab = record.iter().position(|b| *b == b'\t').ok_or_else(|| malformed_tree(record))?;
    let (meta, path) = (&record[..tab], &record[tab + 1..]);
    let meta = String::from_utf8_lossy(meta);
    let mut fields = meta.split(' ');
    let kind = match (fields.next(), fields.next(), fields.next()) {
      (Some(_mode), Some(kind), Some(_oid)) => kind.to_string(),
      _ => return Err(malformed_tree(record)),
    };
    entries.push(TreeEntry { kind, path });
  }

  Ok(entries)
}

fn malformed_tree(record: &[u8]) -> BackupError {
  BackupError::Git(GitError::MalformedOutput {
    command: "git ls-tree".to_string(),
    detail: String::from_utf8_lossy(record).to_string(),
  })
}

/// Parse `rev-list --timestamp` output into commits
fn parse_rev_list_output(data: &[u8]) -> BackupResult<Vec<CommitInfo>> {
  let output = String::from_utf8_lossy(data);
  let mut commits = Vec::new();

  for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
    let (ts, sha) = line.split_once(' ').ok_or_else(|| malformed(line))?;
    let timestamp = ts.parse::<i64>().map_err(|_| malformed(line))?;
    let sha = sha.trim();
    if !is_valid_sha(sha) {
      return Err(malformed(line));
    }
    commits.push(CommitInfo::new(sha, timestamp));
  }

  Ok(commits)
}

fn malformed(line: &str) -> BackupError {
  BackupError::Git(GitError::MalformedOutput {
    command: "git rev-list --timestamp".to_string(),
    detail: line.to_string(),
  })
}

/// Split NUL-separated path output (`-z`), dropping empty fields
fn parse_name_list(data: &[u8]) -> Vec<PathBuf> {
  data
    .split(|b| *b == 0)
    .filter(|entry| !entry.is_empty())
    .map(path_from_git_bytes)
    .collect()
}

/// Validate SHA format (40 hex chars, or 64 for sha256 repositories)
fn is_valid_sha(sha: &str) -> bool {
  (sha.len() == 40 || sha.len() == 64) && sha.chars().all(|c| c.is_ascii_hexdigit())
}
