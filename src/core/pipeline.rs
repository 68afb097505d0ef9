//! End-to-end backup run: select, extract, then fetch and write
//!
//! ```text
//! select_commits ──> extract_changed_files (rayon, one task per commit)
//!                         │  full barrier
//!                         v
//!                    process_commits (tokio current-thread, task per commit/file)
//!                         │
//!                         v
//!                    RunResult { success, failures }
//! ```

use crate::core::context::BackupContext;
use crate::core::error::BackupResult;
use crate::core::extractor::extract_changed_files;
use crate::core::failures::{FailureCollector, FailureRecord};
use crate::core::processor::process_commits;
use crate::core::selector::select_commits;
use crate::ui::progress::MultiProgress;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Outcome of a run, handed to the reporting layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunResult {
  /// True when no failure was recorded
  pub success: bool,
  /// Every failure, in no particular order
  pub failures: Vec<FailureRecord>,
  pub commits_selected: usize,
  pub files_written: usize,
  pub deletions_skipped: usize,
}

/// Back up every file touched by every selected commit
///
/// Errors only when the commit history cannot be listed or a worker pool
/// cannot be started. Content-level problems end up in `RunResult::failures`.
pub fn run_backup(ctx: &BackupContext, progress: &MultiProgress) -> BackupResult<RunResult> {
  let commits = select_commits(ctx.repo.as_ref(), &ctx.branch, &ctx.window)?;
  info!(branch = %ctx.branch, commits = commits.len(), "selected commits");

  let failures = FailureCollector::new();

  // Stage A
  let extract_bar = progress.add_bar(commits.len(), "Reading changed files");
  let changed = extract_changed_files(
    ctx.repo.as_ref(),
    &commits,
    ctx.config.concurrency.diff_workers(),
    &failures,
    &extract_bar,
  )?;

  // Stage B
  let write_bar = Arc::new(progress.add_bar(changed.len(), "Writing snapshots"));
  let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
  let stats = runtime.block_on(process_commits(
    Arc::clone(&ctx.repo),
    changed,
    ctx.backup_root.clone(),
    ctx.config.concurrency.max_in_flight(),
    failures.clone(),
    write_bar,
  ));

  let failures = failures.snapshot();
  info!(
    commits = commits.len(),
    written = stats.files_written,
    skipped = stats.deletions_skipped,
    failed = failures.len(),
    "backup run finished"
  );

  Ok(RunResult {
    success: failures.is_empty(),
    failures,
    commits_selected: commits.len(),
    files_written: stats.files_written,
    deletions_skipped: stats.deletions_skipped,
  })
}
