//! Preconditions checked before a run starts
//!
//! Anything rejected here is fatal: the pipeline never starts.

use crate::core::error::{BackupError, BackupResult, ValidationError};
use crate::core::selector::{DateWindow, parse_date};
use crate::core::vcs::SystemGit;
use chrono::NaiveDate;
use std::path::Path;

/// Check both directories exist and the repository is a git working tree
pub fn validate_paths(repo_dir: &Path, backup_dir: &Path) -> BackupResult<()> {
  if !backup_dir.is_dir() {
    return Err(BackupError::Validation(ValidationError::BackupDirMissing {
      path: backup_dir.to_path_buf(),
    }));
  }

  if !repo_dir.exists() {
    return Err(BackupError::Validation(ValidationError::RepoDirMissing {
      path: repo_dir.to_path_buf(),
    }));
  }

  if !SystemGit::is_work_tree(repo_dir)? {
    return Err(BackupError::Validation(ValidationError::NotARepository {
      path: repo_dir.to_path_buf(),
    }));
  }

  Ok(())
}

/// Parse and check the optional date bounds against `today`
pub fn validate_window(start: Option<&str>, end: Option<&str>, today: NaiveDate) -> BackupResult<DateWindow> {
  let start_date = start.map(parse_date).transpose()?;
  let end_date = end.map(parse_date).transpose()?;

  for (label, raw, date) in [("start", start, start_date), ("end", end, end_date)] {
    if let (Some(raw), Some(date)) = (raw, date)
      && date > today
    {
      return Err(BackupError::Validation(ValidationError::FutureDate {
        label,
        value: raw.to_string(),
      }));
    }
  }

  if let (Some(s), Some(e)) = (start_date, end_date)
    && s > e
  {
    return Err(BackupError::Validation(ValidationError::InvertedRange {
      start: start.unwrap_or_default().to_string(),
      end: end.unwrap_or_default().to_string(),
    }));
  }

  Ok(DateWindow::new(start_date, end_date))
}
