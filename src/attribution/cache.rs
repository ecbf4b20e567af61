//! Per-commit changed-file memo
//!
//! Commit file lists never change, so one lookup per hash per process is
//! enough no matter how many packages ask. The cache is append-only.

use crate::core::error::MonorepoResult;
use crate::core::vcs::History;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Process-scoped memo of `hash -> changed files`
///
/// Concurrent first lookups of the same hash may both reach git; whichever
/// result lands first is the one every caller sees afterwards.
pub struct AttributionCache {
  history: Arc<dyn History>,
  /// Uses RwLock so lookups from worker threads only contend on misses
  entries: RwLock<HashMap<String, Arc<Vec<String>>>>,
}

impl AttributionCache {
  pub fn new(history: Arc<dyn History>) -> Self {
    Self {
      history,
      entries: RwLock::new(HashMap::new()),
    }
  }

  /// History this cache reads through
  pub fn history(&self) -> &Arc<dyn History> {
    &self.history
  }

  /// Changed files of `hash`, asking git only on the first call
  pub fn get_files(&self, hash: &str) -> MonorepoResult<Arc<Vec<String>>> {
    if let Some(files) = self.lookup(hash) {
      debug!(hash, "attribution cache hit");
      return Ok(files);
    }

    debug!(hash, "attribution cache miss");
    let files = Arc::new(self.history.files_changed_by(hash)?);

    let mut entries = self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    let stored = entries.entry(hash.to_string()).or_insert(files);
    Ok(Arc::clone(stored))
  }

  pub fn contains(&self, hash: &str) -> bool {
    self.lookup(hash).is_some()
  }

  pub fn len(&self) -> usize {
    self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  fn lookup(&self, hash: &str) -> Option<Arc<Vec<String>>> {
    let entries = self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    entries.get(hash).cloned()
  }
}

impl std::fmt::Debug for AttributionCache {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AttributionCache").field("entries", &self.len()).finish()
  }
}
