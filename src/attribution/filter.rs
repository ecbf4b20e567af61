//! Commit-to-package attribution
//!
//! A commit belongs to a package when at least one file it changed lies
//! under the package directory. The decision depends only on the package
//! path and the commit's file list, so filtering is idempotent and never
//! reorders.

use super::cache::AttributionCache;
use super::limiter::ConcurrencyLimiter;
use super::path::PackagePath;
use crate::core::context::PackageContext;
use crate::core::error::MonorepoResult;
use crate::core::vcs::Commit;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Filters commit lists down to the ones touching one package
#[derive(Debug, Clone)]
pub struct CommitFilter {
  package: PackagePath,
  cache: Arc<AttributionCache>,
  limiter: ConcurrencyLimiter,
}

impl CommitFilter {
  pub fn new(package: PackagePath, cache: Arc<AttributionCache>, limiter: ConcurrencyLimiter) -> Self {
    Self { package, cache, limiter }
  }

  /// Resolve the package containing `cwd` and build a filter for it
  pub fn discover(cwd: &Path, cache: Arc<AttributionCache>, limiter: ConcurrencyLimiter) -> MonorepoResult<Self> {
    let context = PackageContext::discover(cwd, cache.history().as_ref())?;
    Ok(Self::new(context.package_path, cache, limiter))
  }

  pub fn package_path(&self) -> &PackagePath {
    &self.package
  }

  /// True when any of `files` lies under the package
  pub fn is_relevant(&self, files: &[String]) -> bool {
    files.iter().any(|file| self.package.contains(file))
  }

  /// Keep the commits that touched the package, in their original order,
  /// each carrying its changed-file list
  pub fn filter_to_package(&self, commits: Vec<Commit>) -> MonorepoResult<Vec<Commit>> {
    self.filter_to_package_with(commits, &|_| {})
  }

  /// Same as [`filter_to_package`](Self::filter_to_package), calling
  /// `on_attributed` once per commit after its files are known (from any
  /// worker thread)
  pub fn filter_to_package_with(
    &self,
    commits: Vec<Commit>,
    on_attributed: &(dyn Fn(&Commit) + Sync),
  ) -> MonorepoResult<Vec<Commit>> {
    let total = commits.len();

    let tasks: Vec<_> = commits
      .into_iter()
      .map(|commit| {
        move || -> MonorepoResult<Option<Commit>> {
          let files = self.cache.get_files(&commit.hash)?;
          let commit = commit.with_files(files.as_ref().clone());
          on_attributed(&commit);

          let relevant = commit.files.as_deref().is_some_and(|files| self.is_relevant(files));
          Ok(relevant.then_some(commit))
        }
      })
      .collect();

    let kept: Vec<Commit> = self.limiter.try_run(tasks)?.into_iter().flatten().collect();

    debug!(package = %self.package, total, kept = kept.len(), "attributed commits");
    Ok(kept)
  }
}
