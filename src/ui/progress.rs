//! Progress indicators for long-running attribution
//!
//! Uses `linya` for allocation-free, concurrency-friendly progress bars.
//! Bars draw to stderr so `--json` output on stdout stays clean.

use linya::{Bar, Progress};
use std::sync::Mutex;

/// Progress bar over the commits being attributed
///
/// Shared by reference across attribution workers.
pub struct CommitProgress {
  progress: Mutex<Progress>,
  bar: Bar,
}

impl CommitProgress {
  pub fn new(total: usize, label: impl Into<String>) -> Self {
    let mut progress = Progress::new();
    let bar = progress.bar(total, label.into());
    Self {
      progress: Mutex::new(progress),
      bar,
    }
  }

  /// Increment by 1 (thread-safe)
  pub fn inc(&self) {
    let mut progress = self.progress.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    progress.inc_and_draw(&self.bar, 1);
  }
}
