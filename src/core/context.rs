//! Run context - build once, pass to the pipeline
//!
//! `BackupContext::build` performs every precondition check, opens the
//! repository, resolves the branch and merges config file values with CLI
//! overrides. The pipeline itself never re-validates anything.

use crate::core::config::BackupConfig;
use crate::core::error::BackupResult;
use crate::core::selector::DateWindow;
use crate::core::validate::{validate_paths, validate_window};
use crate::core::vcs::{RepositoryAccess, SystemGit};
use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;

/// Raw inputs from the command line
#[derive(Debug, Clone, Default)]
pub struct BackupArgs {
  pub repo_dir: PathBuf,
  pub backup_dir: PathBuf,
  pub start_date: Option<String>,
  pub end_date: Option<String>,
  pub branch: Option<String>,
  pub config: Option<PathBuf>,
  pub diff_workers: Option<usize>,
  pub max_in_flight: Option<usize>,
  pub no_progress: bool,
}

/// Everything a run needs, already validated
#[derive(Clone)]
pub struct BackupContext {
  /// History source shared by every worker and task
  pub repo: Arc<dyn RepositoryAccess>,

  /// Branch whose history is walked
  pub branch: String,

  /// Inclusive date bounds
  pub window: DateWindow,

  /// Destination root (one subdirectory per commit)
  pub backup_root: PathBuf,

  /// Config file merged with CLI overrides
  pub config: BackupConfig,
}

impl BackupContext {
  /// Validate inputs, open the repository and resolve settings
  pub fn build(args: &BackupArgs) -> BackupResult<Self> {
    validate_paths(&args.repo_dir, &args.backup_dir)?;
    let window = validate_window(
      args.start_date.as_deref(),
      args.end_date.as_deref(),
      Local::now().date_naive(),
    )?;

    let git = SystemGit::open(&args.repo_dir)?;
    let branch = match &args.branch {
      Some(branch) => branch.clone(),
      None => git.current_branch()?,
    };

    let mut config = match &args.config {
      Some(path) => BackupConfig::load_from(path)?,
      None => BackupConfig::load(git.work_tree())?,
    };
    if args.diff_workers.is_some() {
      config.concurrency.diff_workers = args.diff_workers;
    }
    if args.max_in_flight.is_some() {
      config.concurrency.max_in_flight = args.max_in_flight;
    }
    if args.no_progress {
      config.output.progress = false;
    }
    config.concurrency.validate()?;

    Ok(Self {
      repo: Arc::new(git),
      branch,
      window,
      backup_root: args.backup_dir.clone(),
      config,
    })
  }
}
