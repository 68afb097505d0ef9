//! Progress indicators for the two backup stages
//!
//! Uses `linya` for allocation-free, concurrency-optimized progress bars.
//! Bars are shared by rayon workers and tokio tasks alike, so every draw goes
//! through one mutex-guarded `Progress`.

use linya::{Bar, Progress};
use std::sync::{Arc, Mutex};

/// Multi-bar progress container for a whole run
/// Thread-safe wrapper for concurrent progress tracking
#[derive(Clone)]
pub struct MultiProgress {
  progress: Option<Arc<Mutex<Progress>>>,
}

impl MultiProgress {
  /// Create a new multi-progress container that draws to stderr
  pub fn new() -> Self {
    Self {
      progress: Some(Arc::new(Mutex::new(Progress::new()))),
    }
  }

  /// A container whose bars never draw
  pub fn hidden() -> Self {
    Self { progress: None }
  }

  /// Add a new bar with a label and total
  pub fn add_bar(&self, total: usize, label: impl Into<String>) -> StageBar {
    let Some(progress) = &self.progress else {
      return StageBar::hidden();
    };

    let bar = match progress.lock() {
      Ok(mut guard) => guard.bar(total, label.into()),
      Err(poisoned) => poisoned.into_inner().bar(total, label.into()),
    };

    StageBar {
      inner: Some((Arc::clone(progress), bar)),
    }
  }
}

impl Default for MultiProgress {
  fn default() -> Self {
    Self::new()
  }
}

/// One bar inside a `MultiProgress`; a no-op when hidden
pub struct StageBar {
  inner: Option<(Arc<Mutex<Progress>>, Bar)>,
}

impl StageBar {
  /// A bar that never draws
  pub fn hidden() -> Self {
    Self { inner: None }
  }

  /// Increment the bar by 1 (thread-safe)
  pub fn inc(&self) {
    if let Some((progress, bar)) = &self.inner
      && let Ok(mut guard) = progress.lock()
    {
      guard.inc_and_draw(bar, 1);
    }
  }
}
