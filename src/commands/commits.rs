//! `srm commits`: show which commits belong to the current package

use crate::attribution::{AttributionCache, CommitFilter, ConcurrencyLimiter};
use crate::core::config::SrmConfig;
use crate::core::context::PackageContext;
use crate::core::error::{MonorepoResult, ResultExt};
use crate::core::vcs::{Commit, History, SystemGit};
use crate::release::tag;
use crate::ui::CommitProgress;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Flags of `srm commits`
#[derive(Debug, Clone, Default)]
pub struct CommitsOptions {
  /// Start after this revision instead of the package's last tag
  pub since: Option<String>,
  /// Skip attribution and list the whole range
  pub all: bool,
  pub json: bool,
  pub progress: bool,
}

/// Commits attributed to one package over one range
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitsReport {
  pub package: String,
  pub package_path: String,
  /// Exclusive lower bound of the range; `None` means full history
  pub since: Option<String>,
  /// Version of the package's last release, when `since` is one of its tags
  pub last_release: Option<String>,
  /// Commits in the range before attribution
  pub scanned: usize,
  pub commits: Vec<Commit>,
}

/// Gather the report without printing
pub fn collect_commits(cwd: &Path, options: &CommitsOptions) -> MonorepoResult<CommitsReport> {
  let git = SystemGit::open(cwd)?;
  let config = SrmConfig::load(git.work_tree())?;
  let history: Arc<dyn History> = Arc::new(git.clone());
  let context = PackageContext::discover(cwd, history.as_ref())?;

  let since = match &options.since {
    Some(rev) => Some(rev.clone()),
    None => git.latest_tag_with_prefix(&context.tag_prefix())?,
  };
  let last_release = since
    .as_deref()
    .and_then(|rev| tag::version_from_tag(&context.name, rev))
    .map(|v| v.to_string());

  let range: Vec<Commit> = git
    .commits_since(since.as_deref())?
    .collect::<MonorepoResult<Vec<Commit>>>()
    .with_context(|| format!("Failed to list commits for {}", context.name))?;
  let scanned = range.len();
  debug!(scanned, since = ?since, "listed commit range");

  let commits = if options.all {
    range
  } else {
    let cache = Arc::new(AttributionCache::new(history));
    let filter = CommitFilter::new(
      context.package_path.clone(),
      cache,
      ConcurrencyLimiter::from_config(&config),
    );

    if options.progress && scanned > 0 {
      let progress = CommitProgress::new(scanned, format!("Attributing commits to {}", context.name));
      filter.filter_to_package_with(range, &|_| progress.inc())?
    } else {
      filter.filter_to_package(range)?
    }
  };

  Ok(CommitsReport {
    package: context.name,
    package_path: context.package_path.to_string(),
    since,
    last_release,
    scanned,
    commits,
  })
}

/// Run the commits command
pub fn run_commits(cwd: &Path, options: CommitsOptions) -> MonorepoResult<()> {
  let report = collect_commits(cwd, &options)?;

  if options.json {
    println!("{}", serde_json::to_string_pretty(&report)?);
    return Ok(());
  }

  let range = match &report.since {
    Some(since) => format!("since {}", since),
    None => "in full history".to_string(),
  };
  println!(
    "📦 {} ({}): {} of {} commits {}",
    report.package,
    report.package_path,
    report.commits.len(),
    report.scanned,
    range
  );
  for commit in &report.commits {
    println!("  {} {}", commit.short_hash(), commit.subject());
  }

  Ok(())
}
