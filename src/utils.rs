//! Utility functions for cross-platform path handling

use std::path::{Path, PathBuf};

/// Convert a path to Git format (always forward slashes)
///
/// Git expects paths with forward slashes, even on Windows.
/// This function converts backslashes to forward slashes for use in Git commands.
pub fn path_to_git_format(path: &Path) -> String {
  // On Windows, convert backslashes to forward slashes
  // On Unix, this is a no-op since paths already use forward slashes
  #[cfg(target_os = "windows")]
  {
    path.to_string_lossy().replace('\\', "/")
  }
  #[cfg(not(target_os = "windows"))]
  {
    path.to_string_lossy().to_string()
  }
}

/// Convert raw path bytes printed by git into a native path
///
/// On Unix the bytes are taken as-is so non-UTF-8 file names survive the
/// round trip back into `cat-file`.
pub fn path_from_git_bytes(bytes: &[u8]) -> PathBuf {
  #[cfg(unix)]
  {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
  }
  #[cfg(not(unix))]
  {
    PathBuf::from(String::from_utf8_lossy(bytes).as_ref())
  }
}

/// Whether a repository-relative path is safe to join under a backup directory
///
/// Rejects absolute paths and any `..` component so a crafted path cannot
/// escape the commit's subtree.
pub fn is_contained_relative(path: &Path) -> bool {
  use std::path::Component;

  !path.as_os_str().is_empty() && path.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
