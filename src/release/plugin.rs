//! Lifecycle hook adapter
//!
//! Each host hook is wrapped in a middleware chain. Middlewares are listed
//! outermost first and applied right to left:
//!
//! ```text
//! analyzeCommits:            log_step → only_package_commits → report_package_commits → hook
//! generateNotes/success/fail: log_step → only_package_commits → next_release_as_tag   → hook
//! ```
//!
//! The hook's result and errors come back unchanged.

use super::state::ReleaseState;
use super::tag;
use crate::attribution::{AttributionCache, CommitFilter, ConcurrencyLimiter};
use crate::core::config::SrmConfig;
use crate::core::context::PackageContext;
use crate::core::error::MonorepoResult;
use crate::core::vcs::{History, SystemGit};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// A host lifecycle hook
pub trait Hook: Send + Sync {
  fn call(&self, plugin_config: &Value, state: ReleaseState) -> MonorepoResult<Value>;
}

impl<F> Hook for F
where
  F: Fn(&Value, ReleaseState) -> MonorepoResult<Value> + Send + Sync,
{
  fn call(&self, plugin_config: &Value, state: ReleaseState) -> MonorepoResult<Value> {
    self(plugin_config, state)
  }
}

pub type Handler = Arc<dyn Hook>;

pub type Middleware = Box<dyn Fn(Handler) -> Handler + Send + Sync>;

/// Box a closure as a [`Handler`]
pub fn handler<F>(f: F) -> Handler
where
  F: Fn(&Value, ReleaseState) -> MonorepoResult<Value> + Send + Sync + 'static,
{
  Arc::new(f)
}

/// Apply `middlewares` around `delegate`; the first middleware ends up
/// outermost
pub fn compose(middlewares: Vec<Middleware>, delegate: Handler) -> Handler {
  middlewares.iter().rev().fold(delegate, |next, middleware| middleware(next))
}

/// Host lifecycle steps this adapter wraps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleStep {
  AnalyzeCommits,
  GenerateNotes,
  Success,
  Fail,
}

impl LifecycleStep {
  pub const ALL: [LifecycleStep; 4] = [Self::AnalyzeCommits, Self::GenerateNotes, Self::Success, Self::Fail];

  /// Name the host uses for the step
  pub fn host_name(self) -> &'static str {
    match self {
      Self::AnalyzeCommits => "analyzeCommits",
      Self::GenerateNotes => "generateNotes",
      Self::Success => "success",
      Self::Fail => "fail",
    }
  }

  pub fn from_host_name(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|step| step.host_name() == name)
  }
}

impl fmt::Display for LifecycleStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.host_name())
  }
}

/// Package context and filter, built on the first hook call
#[derive(Debug)]
struct ResolvedPackage {
  context: PackageContext,
  filter: CommitFilter,
}

/// Adapts single-package hooks to one package of a monorepo
///
/// Cheap to clone; clones share the resolved package and the attribution
/// cache.
#[derive(Clone)]
pub struct MonorepoPlugin {
  cwd: PathBuf,
  config: SrmConfig,
  cache: Arc<AttributionCache>,
  resolved: Arc<OnceLock<ResolvedPackage>>,
}

impl MonorepoPlugin {
  /// Plugin for the package containing `cwd`, reading history with git and
  /// settings from the environment
  pub fn new(cwd: impl Into<PathBuf>) -> MonorepoResult<Self> {
    let cwd = cwd.into();
    let history: Arc<dyn History> = Arc::new(SystemGit::open(&cwd)?);
    let config = SrmConfig::load(&history.repository_root()?)?;
    Ok(Self::with_config(cwd, config, Arc::new(AttributionCache::new(history))))
  }

  /// Plugin with explicit settings and a (possibly shared) cache
  pub fn with_config(cwd: impl Into<PathBuf>, config: SrmConfig, cache: Arc<AttributionCache>) -> Self {
    let cwd = cwd.into();
    Self {
      // Pinned now so a later change of the process directory has no effect
      cwd: std::path::absolute(&cwd).unwrap_or(cwd),
      config,
      cache,
      resolved: Arc::new(OnceLock::new()),
    }
  }

  pub fn cwd(&self) -> &Path {
    &self.cwd
  }

  pub fn cache(&self) -> &Arc<AttributionCache> {
    &self.cache
  }

  /// Package being released, resolved on first use
  pub fn package(&self) -> MonorepoResult<&PackageContext> {
    Ok(&self.resolve()?.context)
  }

  /// Host tag template, `<name>-v${version}`
  pub fn tag_format(&self) -> MonorepoResult<String> {
    Ok(tag::tag_format(&self.package()?.name))
  }

  /// Wrap `delegate` for `step`
  pub fn wrap(&self, step: LifecycleStep, delegate: Handler) -> Handler {
    let mut chain = vec![self.log_step(step), self.only_package_commits()];
    match step {
      LifecycleStep::AnalyzeCommits => chain.push(self.report_package_commits()),
      _ => chain.push(self.next_release_as_tag()),
    }
    compose(chain, delegate)
  }

  fn resolve(&self) -> MonorepoResult<&ResolvedPackage> {
    if let Some(resolved) = self.resolved.get() {
      return Ok(resolved);
    }

    let context = PackageContext::discover(&self.cwd, self.cache.history().as_ref())?;
    let filter = CommitFilter::new(
      context.package_path.clone(),
      Arc::clone(&self.cache),
      ConcurrencyLimiter::from_config(&self.config),
    );

    // A concurrent first call may have won; both resolved the same package
    Ok(self.resolved.get_or_init(|| ResolvedPackage { context, filter }))
  }

  fn debug_enabled(&self, state: &ReleaseState) -> bool {
    state.options.debug || self.config.debug
  }

  fn log_step(&self, step: LifecycleStep) -> Middleware {
    let plugin = self.clone();
    Box::new(move |next: Handler| {
      let plugin = plugin.clone();
      handler(move |plugin_config: &Value, state: ReleaseState| {
        if plugin.debug_enabled(&state) {
          state.logger.log(&format!(
            "Running {} step from release-monorepo v{}",
            step,
            env!("CARGO_PKG_VERSION")
          ));
        }
        next.call(plugin_config, state)
      })
    })
  }

  fn only_package_commits(&self) -> Middleware {
    let plugin = self.clone();
    Box::new(move |next: Handler| {
      let plugin = plugin.clone();
      handler(move |plugin_config: &Value, mut state: ReleaseState| {
        let resolved = plugin.resolve()?;
        let commits = std::mem::take(&mut state.commits);
        state.commits = resolved.filter.filter_to_package(commits)?;
        next.call(plugin_config, state)
      })
    })
  }

  fn next_release_as_tag(&self) -> Middleware {
    let plugin = self.clone();
    Box::new(move |next: Handler| {
      let plugin = plugin.clone();
      handler(move |plugin_config: &Value, mut state: ReleaseState| {
        if let Some(next_release) = state.next_release.as_mut() {
          let name = &plugin.resolve()?.context.name;
          next_release.version = tag::tag_for(name, &next_release.version);
          debug!(version = %next_release.version, "rewrote next release version as tag");
        }
        next.call(plugin_config, state)
      })
    })
  }

  fn report_package_commits(&self) -> Middleware {
    let plugin = self.clone();
    Box::new(move |next: Handler| {
      let plugin = plugin.clone();
      handler(move |plugin_config: &Value, state: ReleaseState| {
        let count = state.commits.len();
        let logger = Arc::clone(&state.logger);
        let debug = plugin.debug_enabled(&state);

        let result = next.call(plugin_config, state)?;

        if debug {
          let name = &plugin.resolve()?.context.name;
          logger.log(&format!("Found {} commits for package {} since last release", count, name));
        }
        Ok(result)
      })
    })
  }
}

impl fmt::Debug for MonorepoPlugin {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MonorepoPlugin")
      .field("cwd", &self.cwd)
      .field("config", &self.config)
      .field("resolved", &self.resolved.get().map(|r| &r.context.name))
      .finish()
  }
}
