//! Historical content retrieval, kept off the cooperative scheduler

use crate::core::error::BackupResult;
use crate::core::vcs::{BlobLookup, RepositoryAccess};
use std::path::PathBuf;
use std::sync::Arc;

/// Fetch `path` as it was at `commit` on tokio's blocking pool
///
/// The lookup spawns git subprocesses, so it must never run on the task that
/// drives sibling fetch/write units.
pub async fn fetch_content(repo: Arc<dyn RepositoryAccess>, commit: String, path: PathBuf) -> BackupResult<BlobLookup> {
  tokio::task::spawn_blocking(move || repo.read_blob(&commit, &path)).await?
}
