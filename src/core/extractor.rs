//! Stage A: per-commit changed-file discovery
//!
//! Each commit's name-only diff is one blocking `git` subprocess. Tasks run on
//! a dedicated rayon pool sized to the logical CPU count, so the subprocesses
//! execute truly in parallel. A failed diff records one failure for the commit
//! and leaves it out of the map; no other commit is affected.

use crate::core::error::BackupResult;
use crate::core::failures::{FailureCollector, FailureRecord};
use crate::core::vcs::{CommitInfo, RepositoryAccess};
use crate::ui::progress::StageBar;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, error};

/// commit sha -> paths changed by that commit, in diff order
pub type ChangedFileMap = HashMap<String, Vec<PathBuf>>;

/// Logical CPUs available to this process (at least 1)
pub fn default_worker_count() -> usize {
  std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Extract changed files for every commit in parallel
///
/// Returns once every commit has either produced its file list or been
/// recorded as a failure. Only a failure to build the worker pool is fatal.
pub fn extract_changed_files(
  repo: &dyn RepositoryAccess,
  commits: &[CommitInfo],
  workers: usize,
  failures: &FailureCollector,
  bar: &StageBar,
) -> BackupResult<ChangedFileMap> {
  let pool = rayon::ThreadPoolBuilder::new()
    .num_threads(workers.max(1))
    .thread_name(|idx| format!("diff-worker-{}", idx))
    .build()?;

  let map = pool.install(|| {
    commits
      .par_iter()
      .filter_map(|commit| {
        let result = repo.changed_files(&commit.sha);
        bar.inc();

        match result {
          Ok(files) => {
            debug!(commit = %commit.sha, files = files.len(), "extracted changed files");
            Some((commit.sha.clone(), files))
          }
          Err(e) => {
            error!(commit = %commit.sha, "An error occurred while retrieving files for commit: {}", e);
            failures.push(FailureRecord::files_unavailable(&commit.sha));
            None
          }
        }
      })
      .collect::<ChangedFileMap>()
  });

  Ok(map)
}
