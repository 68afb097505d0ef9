//! Error types for commit-backup with contextual messages and exit codes
//!
//! Only fatal errors travel through `BackupError`: a precondition that does not
//! hold, a repository that cannot be opened, a history that cannot be listed.
//! Per-file and per-commit problems during a run never surface here; they are
//! recorded as `FailureRecord`s and reported once the run finishes.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for commit-backup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args)
  User = 1,
  /// System error (git, I/O)
  System = 2,
  /// Validation failure (paths, dates)
  Validation = 3,
  /// The run completed but some files could not be backed up
  BackupFailed = 4,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for commit-backup
#[derive(Debug)]
pub enum BackupError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Validation errors (paths, dates)
  Validation(ValidationError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl BackupError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    BackupError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      BackupError::Message { message, context, help } => BackupError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      BackupError::Io(err) => BackupError::Message {
        message: format!("{}: {}", ctx_str, err),
        context: None,
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      BackupError::Config(_) => ExitCode::User,
      BackupError::Git(_) => ExitCode::System,
      BackupError::Validation(_) => ExitCode::Validation,
      BackupError::Io(_) => ExitCode::System,
      BackupError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      BackupError::Config(e) => e.help_message(),
      BackupError::Git(e) => e.help_message(),
      BackupError::Validation(e) => e.help_message(),
      BackupError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for BackupError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BackupError::Config(e) => write!(f, "{}", e),
      BackupError::Git(e) => write!(f, "{}", e),
      BackupError::Validation(e) => write!(f, "{}", e),
      BackupError::Io(e) => write!(f, "I/O error: {}", e),
      BackupError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for BackupError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      BackupError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for BackupError {
  fn from(err: io::Error) -> Self {
    BackupError::Io(err)
  }
}

impl From<String> for BackupError {
  fn from(msg: String) -> Self {
    BackupError::message(msg)
  }
}

impl From<&str> for BackupError {
  fn from(msg: &str) -> Self {
    BackupError::message(msg)
  }
}

impl From<toml_edit::de::Error> for BackupError {
  fn from(err: toml_edit::de::Error) -> Self {
    BackupError::Config(ConfigError::Parse {
      reason: err.to_string(),
    })
  }
}

impl From<serde_json::Error> for BackupError {
  fn from(err: serde_json::Error) -> Self {
    BackupError::message(format!("JSON error: {}", err))
  }
}

impl From<tokio::task::JoinError> for BackupError {
  fn from(err: tokio::task::JoinError) -> Self {
    BackupError::message(format!("Background task failed: {}", err))
  }
}

impl From<rayon::ThreadPoolBuildError> for BackupError {
  fn from(err: rayon::ThreadPoolBuildError) -> Self {
    BackupError::message(format!("Failed to build worker pool: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Explicit config file does not exist
  NotFound { path: PathBuf },

  /// Config file could not be parsed
  Parse { reason: String },

  /// Field has an unusable value
  InvalidValue { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Drop --config to use defaults, or create commit-backup.toml in the repository root.".to_string())
      }
      ConfigError::InvalidValue { field, .. } => Some(format!("Fix or remove `{}` in the config file.", field)),
      ConfigError::Parse { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { path } => {
        write!(f, "Config file not found: {}", path.display())
      }
      ConfigError::Parse { reason } => {
        write!(f, "Invalid config file: {}", reason)
      }
      ConfigError::InvalidValue { field, reason } => {
        write!(f, "Invalid value for '{}': {}", field, reason)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Branch or revision could not be resolved
  UnknownRevision { revision: String },

  /// Git produced output we could not understand
  MalformedOutput { command: String, detail: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::RepoNotFound { path } => Some(format!(
        "Initialize the repository first or check the path: {}",
        path.display()
      )),
      GitError::UnknownRevision { .. } => Some("List local branches with `git branch`.".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr.trim_end())
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::UnknownRevision { revision } => {
        write!(f, "Unknown branch or revision: {}", revision)
      }
      GitError::MalformedOutput { command, detail } => {
        write!(f, "Unexpected output from {}: {}", command, detail)
      }
    }
  }
}

/// Validation errors
#[derive(Debug)]
pub enum ValidationError {
  /// Backup folder is missing
  BackupDirMissing { path: PathBuf },

  /// Repository folder is missing
  RepoDirMissing { path: PathBuf },

  /// Repository folder is not inside a git working tree
  NotARepository { path: PathBuf },

  /// Date is not DD-MM-YYYY
  MalformedDate { value: String },

  /// Date lies after today
  FutureDate { label: &'static str, value: String },

  /// Start date lies after end date
  InvertedRange { start: String, end: String },
}

impl ValidationError {
  fn help_message(&self) -> Option<String> {
    match self {
      ValidationError::BackupDirMissing { path } => Some(format!("Create it first: mkdir -p {}", path.display())),
      ValidationError::NotARepository { .. } => Some("Point --repo at a git working tree.".to_string()),
      ValidationError::MalformedDate { .. } => Some("Dates use the DD-MM-YYYY format, e.g. 01-03-2023.".to_string()),
      ValidationError::InvertedRange { .. } => Some("Swap --start-date and --end-date.".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValidationError::BackupDirMissing { path } => {
        write!(f, "The backup folder '{}' does not exist", path.display())
      }
      ValidationError::RepoDirMissing { path } => {
        write!(f, "The repository directory '{}' does not exist", path.display())
      }
      ValidationError::NotARepository { path } => {
        write!(f, "'{}' is not a git repository", path.display())
      }
      ValidationError::MalformedDate { value } => {
        write!(f, "Invalid date '{}'", value)
      }
      ValidationError::FutureDate { label, value } => {
        write!(f, "The {} date '{}' is later than today's date", label, value)
      }
      ValidationError::InvertedRange { start, end } => {
        write!(f, "The start date '{}' is after the end date '{}'", start, end)
      }
    }
  }
}

/// Result type alias for commit-backup
pub type BackupResult<T> = Result<T, BackupError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> BackupResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> BackupResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<BackupError>,
{
  fn context(self, ctx: impl Into<String>) -> BackupResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> BackupResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &BackupError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
