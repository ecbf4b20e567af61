//! Bounded fan-out for blocking history queries

use crate::core::config::SrmConfig;
use crate::core::error::{MonorepoError, MonorepoResult};
use rayon::prelude::*;
use tracing::debug;

/// Runs blocking tasks with at most `max_concurrent` in flight
///
/// Each call builds a dedicated rayon pool no wider than the task list, so
/// the global rayon pool is never saturated by git subprocesses. Results come
/// back in input order regardless of completion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcurrencyLimiter {
  max_concurrent: usize,
}

impl ConcurrencyLimiter {
  /// `max_concurrent` below 1 is raised to 1
  pub fn new(max_concurrent: usize) -> Self {
    Self {
      max_concurrent: max_concurrent.max(1),
    }
  }

  pub fn from_config(config: &SrmConfig) -> Self {
    Self::new(config.max_threads)
  }

  pub fn max_concurrent(&self) -> usize {
    self.max_concurrent
  }

  /// Run every task, returning outputs in input order
  pub fn run<T, F>(&self, tasks: Vec<F>) -> MonorepoResult<Vec<T>>
  where
    F: FnOnce() -> T + Send,
    T: Send,
  {
    if tasks.is_empty() {
      return Ok(Vec::new());
    }

    let pool = self.pool(tasks.len())?;
    Ok(pool.install(|| tasks.into_par_iter().map(|task| task()).collect()))
  }

  /// Run fallible tasks; the first failure stops new work from starting and
  /// is returned
  pub fn try_run<T, F>(&self, tasks: Vec<F>) -> MonorepoResult<Vec<T>>
  where
    F: FnOnce() -> MonorepoResult<T> + Send,
    T: Send,
  {
    if tasks.is_empty() {
      return Ok(Vec::new());
    }

    let pool = self.pool(tasks.len())?;
    pool.install(|| tasks.into_par_iter().map(|task| task()).collect::<Result<Vec<T>, MonorepoError>>())
  }

  fn pool(&self, task_count: usize) -> MonorepoResult<rayon::ThreadPool> {
    let width = self.max_concurrent.min(task_count);
    debug!(width, task_count, "starting attribution workers");
    Ok(
      rayon::ThreadPoolBuilder::new()
        .num_threads(width)
        .thread_name(|i| format!("srm-attribution-{}", i))
        .build()?,
    )
  }
}

impl Default for ConcurrencyLimiter {
  fn default() -> Self {
    Self::from_config(&SrmConfig::default())
  }
}
