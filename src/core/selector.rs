//! Commit selection by inclusive, day-granularity date window

use crate::core::error::{BackupError, BackupResult, ValidationError};
use crate::core::vcs::{CommitInfo, RepositoryAccess};
use chrono::{DateTime, Local, NaiveDate};

/// Date format accepted on the command line
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Parse a `DD-MM-YYYY` date
pub fn parse_date(value: &str) -> BackupResult<NaiveDate> {
  NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
    BackupError::Validation(ValidationError::MalformedDate {
      value: value.to_string(),
    })
  })
}

/// Optional inclusive bounds on a commit's committed date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
  pub start: Option<NaiveDate>,
  pub end: Option<NaiveDate>,
}

impl DateWindow {
  pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
    Self { start, end }
  }

  /// No bounds at all
  pub fn is_unbounded(&self) -> bool {
    self.start.is_none() && self.end.is_none()
  }

  /// Whether a committer timestamp falls inside the window
  ///
  /// The timestamp is reduced to its local calendar date first, so any commit
  /// made on the end date itself is still included.
  pub fn contains(&self, timestamp: i64) -> bool {
    if self.is_unbounded() {
      return true;
    }

    let Some(date) = local_date(timestamp) else {
      return false;
    };

    self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
  }
}

fn local_date(timestamp: i64) -> Option<NaiveDate> {
  DateTime::from_timestamp(timestamp, 0).map(|utc| utc.with_timezone(&Local).date_naive())
}

/// Keep commits inside the window, preserving history order
pub fn filter_commits(commits: Vec<CommitInfo>, window: &DateWindow) -> Vec<CommitInfo> {
  if window.is_unbounded() {
    return commits;
  }
  commits.into_iter().filter(|c| window.contains(c.timestamp)).collect()
}

/// Walk `branch` and keep the commits inside `window`
pub fn select_commits(repo: &dyn RepositoryAccess, branch: &str, window: &DateWindow) -> BackupResult<Vec<CommitInfo>> {
  let commits = repo.list_commits(branch)?;
  Ok(filter_commits(commits, window))
}
