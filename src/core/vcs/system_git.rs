//! System git backend - zero dependencies, plumbing only
//!
//! Uses git plumbing commands for all operations:
//! - `rev-list` for history walks
//! - `diff-tree` for name-only diffs
//! - `cat-file` / `ls-tree` for historical content
//!
//! Every subprocess runs in an isolated environment rooted at the work tree.

use crate::core::error::{BackupError, BackupResult, GitError, ResultExt};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Git backend using system git (zero crate dependencies)
#[derive(Debug, Clone)]
pub struct SystemGit {
  /// Working tree root
  pub(crate) work_tree: PathBuf,
}

impl SystemGit {
  /// Whether `path` lies inside a git working tree
  pub fn is_work_tree(path: &Path) -> BackupResult<bool> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--is-inside-work-tree"])
      .output()
      .context("Failed to execute git rev-parse")?;

    Ok(output.status.success() && output.stdout.trim_ascii() == b"true")
  }

  /// Open a git repository
  ///
  /// This performs ONE subprocess call to get the repository metadata.
  pub fn open(path: &Path) -> BackupResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      return Err(BackupError::Git(GitError::RepoNotFound {
        path: path.to_path_buf(),
      }));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let work_tree = stdout.trim();

    Ok(Self {
      work_tree: PathBuf::from(work_tree),
    })
  }

  /// Working tree root
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Get current branch name
  pub fn current_branch(&self) -> BackupResult<String> {
    let output = self
      .git_cmd()
      .args(["rev-parse", "--abbrev-ref", "HEAD"])
      .output()
      .context("Failed to get current branch")?;

    if !output.status.success() {
      return Ok("HEAD".to_string()); // Detached HEAD or unborn branch
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Check that `revision` names a commit
  pub fn resolves_to_commit(&self, revision: &str) -> BackupResult<bool> {
    let rev = format!("{}^{{commit}}", revision);
    let output = self
      .git_cmd()
      .args(["rev-parse", "--verify", "--quiet", &rev])
      .output()
      .context("Failed to run git rev-parse")?;

    Ok(output.status.success())
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to the work tree root
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.work_tree);

    // Isolated environment (don't trust global config)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    // Paths are file names, never pathspec magic
    cmd.arg("--literal-pathspecs");

    // Force safe behavior (override user config)
    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII
    cmd.arg("-c").arg("diff.renames=false"); // Report both sides of a rename

    cmd
  }

  /// Run a prepared command, turning a non-zero exit into `GitError::CommandFailed`
  pub(crate) fn run_checked(&self, mut cmd: Command, label: &str) -> BackupResult<Output> {
    let output = cmd.output().with_context(|| format!("Failed to execute {}", label))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(BackupError::Git(GitError::CommandFailed {
        command: label.to_string(),
        stderr: stderr.to_string(),
      }));
    }

    Ok(output)
  }
}
