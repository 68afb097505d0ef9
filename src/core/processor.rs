//! Stage B: concurrent fetch + write of every changed file
//!
//! One task per commit, one nested task per file. Blocking retrieval is
//! pushed to the blocking pool, writes go through `tokio::fs`. An optional
//! semaphore caps how many file units fetch or write at the same time.
//!
//! Every failure is converted into a `FailureRecord` by the smallest unit that
//! sees it. Nothing here returns an error to the caller.

use crate::core::extractor::ChangedFileMap;
use crate::core::failures::{FailureCollector, FailureRecord};
use crate::core::fetch::fetch_content;
use crate::core::vcs::{BlobLookup, RepositoryAccess};
use crate::core::writer::{destination_path, ensure_commit_dir, write_snapshot};
use crate::ui::progress::StageBar;
use std::ops::AddAssign;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

/// Counters for the successful and skipped units of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessStats {
  pub files_written: usize,
  pub deletions_skipped: usize,
}

impl AddAssign for ProcessStats {
  fn add_assign(&mut self, other: Self) {
    self.files_written += other.files_written;
    self.deletions_skipped += other.deletions_skipped;
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
  Written,
  DeletionSkip,
  Failed,
}

/// Shared state every unit needs
struct Shared {
  repo: Arc<dyn RepositoryAccess>,
  backup_root: PathBuf,
  limit: Option<Arc<Semaphore>>,
  failures: FailureCollector,
}

/// Back up every (commit, file) unit in `changed`
///
/// `max_in_flight = None` spawns everything at once. Must run inside a tokio
/// runtime; returns after every spawned unit has finished.
pub async fn process_commits(
  repo: Arc<dyn RepositoryAccess>,
  changed: ChangedFileMap,
  backup_root: PathBuf,
  max_in_flight: Option<usize>,
  failures: FailureCollector,
  bar: Arc<StageBar>,
) -> ProcessStats {
  let shared = Arc::new(Shared {
    repo,
    backup_root,
    limit: max_in_flight.map(|n| Arc::new(Semaphore::new(n.max(1)))),
    failures,
  });

  let handles: Vec<_> = changed
    .into_iter()
    .map(|(commit, files)| {
      let shared = Arc::clone(&shared);
      let bar = Arc::clone(&bar);
      let task_commit = commit.clone();
      let task_files = files.clone();
      let handle = tokio::spawn(async move {
        let stats = process_commit(shared, task_commit, task_files).await;
        bar.inc();
        stats
      });
      (commit, files, handle)
    })
    .collect();

  let mut totals = ProcessStats::default();
  for (commit, files, handle) in handles {
    match handle.await {
      Ok(stats) => totals += stats,
      Err(e) => {
        // Only reachable if a unit panicked; its files were never confirmed.
        error!(commit = %commit, "Error backing up commit: {}", e);
        for file in files {
          shared.failures.push(FailureRecord::file(&commit, file));
        }
      }
    }
  }
  totals
}

/// Back up all files of one commit and wait for them
async fn process_commit(shared: Arc<Shared>, commit: String, files: Vec<PathBuf>) -> ProcessStats {
  let mut stats = ProcessStats::default();

  if let Err(e) = ensure_commit_dir(&shared.backup_root, &commit).await {
    error!(commit = %commit, "Error backing up commit: {}", e);
    for file in files {
      shared.failures.push(FailureRecord::file(&commit, file));
    }
    return stats;
  }

  let handles: Vec<_> = files
    .into_iter()
    .map(|file| {
      let shared = Arc::clone(&shared);
      let task_commit = commit.clone();
      let task_file = file.clone();
      (file, tokio::spawn(process_file(shared, task_commit, task_file)))
    })
    .collect();

  for (file, handle) in handles {
    match handle.await {
      Ok(FileOutcome::Written) => stats.files_written += 1,
      Ok(FileOutcome::DeletionSkip) => stats.deletions_skipped += 1,
      Ok(FileOutcome::Failed) => {}
      Err(e) => {
        error!(commit = %commit, file = %file.display(), "Error backing up commit: {}", e);
        shared.failures.push(FailureRecord::file(&commit, file));
      }
    }
  }

  debug!(
    commit = %commit,
    written = stats.files_written,
    skipped = stats.deletions_skipped,
    "commit processed"
  );
  stats
}

/// Fetch one file and write it; records its own failure
async fn process_file(shared: Arc<Shared>, commit: String, file: PathBuf) -> FileOutcome {
  let _permit = match &shared.limit {
    Some(limit) => Arc::clone(limit).acquire_owned().await.ok(),
    None => None,
  };

  let dest = match destination_path(&shared.backup_root, &commit, &file) {
    Ok(dest) => dest,
    Err(e) => return fail(&shared, &commit, file, e),
  };

  match fetch_content(Arc::clone(&shared.repo), commit.clone(), file.clone()).await {
    Ok(BlobLookup::DeletedAtCommit) => {
      warn!("The file {} was deleted in commit {}", file.display(), commit);
      FileOutcome::DeletionSkip
    }
    Ok(BlobLookup::Content(bytes)) => match write_snapshot(&dest, &bytes).await {
      Ok(()) => FileOutcome::Written,
      Err(e) => fail(&shared, &commit, file, e),
    },
    Err(e) => fail(&shared, &commit, file, e),
  }
}

fn fail(shared: &Shared, commit: &str, file: PathBuf, err: impl std::fmt::Display) -> FileOutcome {
  error!(commit = %commit, "Error processing file {}: {}", file.display(), err);
  shared.failures.push(FailureRecord::file(commit, file));
  FileOutcome::Failed
}
