use crate::core::error::{BackupError, BackupResult, ConfigError, ResultExt};
use crate::core::extractor::default_worker_count;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// How many fetch/write units may be in flight per logical CPU by default
const IN_FLIGHT_PER_CPU: usize = 4;

/// Configuration for commit-backup
/// Searched in order: commit-backup.toml, .commit-backup.toml, .config/commit-backup.toml
///
/// # Example
///
/// ```toml
/// [concurrency]
/// diff_workers = 8      # default: logical CPUs
/// max_in_flight = 64    # default: 4 x logical CPUs, 0 = unbounded
///
/// [output]
/// progress = false
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackupConfig {
  #[serde(default)]
  pub concurrency: ConcurrencyConfig,
  #[serde(default)]
  pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConcurrencyConfig {
  /// Worker threads for changed-file extraction
  #[serde(default)]
  pub diff_workers: Option<usize>,

  /// Ceiling on simultaneous fetch/write units (0 = unbounded)
  #[serde(default)]
  pub max_in_flight: Option<usize>,
}

impl ConcurrencyConfig {
  /// Validate concurrency settings
  pub fn validate(&self) -> BackupResult<()> {
    if self.diff_workers == Some(0) {
      return Err(BackupError::Config(ConfigError::InvalidValue {
        field: "concurrency.diff_workers".to_string(),
        reason: "must be at least 1".to_string(),
      }));
    }
    Ok(())
  }

  /// Diff worker count, falling back to the logical CPU count
  pub fn diff_workers(&self) -> usize {
    self.diff_workers.unwrap_or_else(default_worker_count)
  }

  /// In-flight ceiling; `None` means unbounded
  pub fn max_in_flight(&self) -> Option<usize> {
    match self.max_in_flight {
      Some(0) => None,
      Some(n) => Some(n),
      None => Some(default_worker_count() * IN_FLIGHT_PER_CPU),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
  /// Draw progress bars on stderr
  #[serde(default = "default_progress")]
  pub progress: bool,
}

fn default_progress() -> bool {
  true
}

impl Default for OutputConfig {
  fn default() -> Self {
    Self {
      progress: default_progress(),
    }
  }
}

impl BackupConfig {
  /// Find config file in search order: commit-backup.toml, .commit-backup.toml, .config/commit-backup.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("commit-backup.toml"),
      path.join(".commit-backup.toml"),
      path.join(".config").join("commit-backup.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from the repository root, or defaults if none is present
  pub fn load(path: &Path) -> BackupResult<Self> {
    match Self::find_config_path(path) {
      Some(config_path) => Self::load_from(&config_path),
      None => Ok(Self::default()),
    }
  }

  /// Load config from an explicit file
  pub fn load_from(config_path: &Path) -> BackupResult<Self> {
    if !config_path.exists() {
      return Err(BackupError::Config(ConfigError::NotFound {
        path: config_path.to_path_buf(),
      }));
    }

    let content = fs::read_to_string(config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: BackupConfig = toml_edit::de::from_str(&content)?;

    config.concurrency.validate()?;

    Ok(config)
  }
}
