//! Release state exchanged with the host pipeline
//!
//! Only `commits` and `nextRelease.version` are ever rewritten. Every other
//! field, known or not, survives a deserialize/serialize trip through
//! `extra`.

use crate::core::error::MonorepoResult;
use crate::core::vcs::Commit;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Host-provided sink for user-facing diagnostics
pub trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

/// Forwards host diagnostics to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
  fn log(&self, message: &str) {
    tracing::info!(target: "srm", "{}", message);
  }
}

fn default_logger() -> Arc<dyn Logger> {
  Arc::new(TracingLogger)
}

/// The release being prepared, when the host already knows it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextRelease {
  pub version: String,

  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl NextRelease {
  pub fn new(version: impl Into<String>) -> Self {
    Self {
      version: version.into(),
      extra: Map::new(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseOptions {
  #[serde(default)]
  pub debug: bool,

  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// State handed to each lifecycle hook
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseState {
  #[serde(default)]
  pub commits: Vec<Commit>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub next_release: Option<NextRelease>,

  #[serde(default)]
  pub options: ReleaseOptions,

  #[serde(skip, default = "default_logger")]
  pub logger: Arc<dyn Logger>,

  /// Host fields this crate does not interpret
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl ReleaseState {
  pub fn new(commits: Vec<Commit>) -> Self {
    Self {
      commits,
      next_release: None,
      options: ReleaseOptions::default(),
      logger: default_logger(),
      extra: Map::new(),
    }
  }

  pub fn with_next_release(mut self, version: impl Into<String>) -> Self {
    self.next_release = Some(NextRelease::new(version));
    self
  }

  pub fn with_debug(mut self, debug: bool) -> Self {
    self.options.debug = debug;
    self
  }

  pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
    self.logger = logger;
    self
  }

  /// Parse a host state document; the logger defaults to [`TracingLogger`]
  pub fn from_json(value: Value) -> MonorepoResult<Self> {
    Ok(serde_json::from_value(value)?)
  }

  pub fn to_json(&self) -> MonorepoResult<Value> {
    Ok(serde_json::to_value(self)?)
  }
}

impl fmt::Debug for ReleaseState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ReleaseState")
      .field("commits", &self.commits.len())
      .field("next_release", &self.next_release)
      .field("options", &self.options)
      .field("extra", &self.extra)
      .finish_non_exhaustive()
  }
}
