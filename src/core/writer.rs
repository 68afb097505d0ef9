//! Snapshot persistence under `backup_root/<commit>/<path>`
//!
//! Content goes to a temporary sibling first and is renamed into place, so a
//! destination is either missing or complete. Re-running overwrites with the
//! same bytes.

use crate::core::error::{BackupError, BackupResult, ResultExt};
use crate::utils::is_contained_relative;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Directory holding one commit's snapshot
pub fn commit_dir(backup_root: &Path, commit: &str) -> PathBuf {
  backup_root.join(commit)
}

/// Destination of a (commit, file) unit
///
/// Fails for absolute paths or paths with `..`, which would land outside the
/// commit's subtree.
pub fn destination_path(backup_root: &Path, commit: &str, file: &Path) -> BackupResult<PathBuf> {
  if !is_contained_relative(file) {
    return Err(BackupError::message(format!(
      "Refusing to write '{}' outside the snapshot of {}",
      file.display(),
      commit
    )));
  }
  Ok(commit_dir(backup_root, commit).join(file))
}

/// Create the commit's snapshot directory (idempotent)
pub async fn ensure_commit_dir(backup_root: &Path, commit: &str) -> BackupResult<PathBuf> {
  let dir = commit_dir(backup_root, commit);
  fs::create_dir_all(&dir)
    .await
    .with_context(|| format!("Failed to create {}", dir.display()))?;
  Ok(dir)
}

/// Write `content` to `dest`, creating parent directories as needed
pub async fn write_snapshot(dest: &Path, content: &[u8]) -> BackupResult<()> {
  let parent = dest
    .parent()
    .ok_or_else(|| BackupError::message(format!("No parent directory for {}", dest.display())))?;
  fs::create_dir_all(parent)
    .await
    .with_context(|| format!("Failed to create {}", parent.display()))?;

  let tmp = temp_sibling(dest);
  if let Err(e) = fs::write(&tmp, content).await {
    let _ = fs::remove_file(&tmp).await;
    return Err(e).with_context(|| format!("Failed to write {}", dest.display()));
  }
  if let Err(e) = fs::rename(&tmp, dest).await {
    let _ = fs::remove_file(&tmp).await;
    return Err(e).with_context(|| format!("Failed to move snapshot into {}", dest.display()));
  }

  Ok(())
}

fn temp_sibling(dest: &Path) -> PathBuf {
  let mut name = OsString::from(".");
  name.push(dest.file_name().unwrap_or_default());
  name.push(format!(
    ".{}-{}.partial",
    std::process::id(),
    TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
  ));
  dest.with_file_name(name)
}
