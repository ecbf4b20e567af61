use crate::core::error::{ConfigError, MonorepoResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the attribution concurrency limit
pub const MAX_THREADS_ENV: &str = "SRM_MAX_THREADS";

/// Environment variable forcing debug diagnostics
pub const DEBUG_ENV: &str = "SRM_DEBUG";

/// Default number of concurrently running history queries
pub const DEFAULT_MAX_THREADS: usize = 500;

/// Configuration for release-monorepo
/// Searched in order: srm.toml, .srm.toml, .config/srm.toml (repository root)
///
/// Environment variables win over the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrmConfig {
  /// Upper bound on in-flight git subprocesses during attribution
  #[serde(default = "default_max_threads")]
  pub max_threads: usize,

  /// Emit step and attribution diagnostics through the host logger
  #[serde(default)]
  pub debug: bool,
}

fn default_max_threads() -> usize {
  DEFAULT_MAX_THREADS
}

impl Default for SrmConfig {
  fn default() -> Self {
    Self {
      max_threads: DEFAULT_MAX_THREADS,
      debug: false,
    }
  }
}

impl SrmConfig {
  /// Find config file in search order: srm.toml, .srm.toml, .config/srm.toml
  pub fn find_config_path(root: &Path) -> Option<PathBuf> {
    let candidates = vec![
      root.join("srm.toml"),
      root.join(".srm.toml"),
      root.join(".config").join("srm.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load the file config (if any) under `root`, then apply the process
  /// environment.
  pub fn load(root: &Path) -> MonorepoResult<Self> {
    let config = Self::load_file(root)?;
    config.with_env(|key| std::env::var(key).ok())
  }

  /// Defaults plus the process environment, no file lookup
  pub fn from_env() -> MonorepoResult<Self> {
    Self::default().with_env(|key| std::env::var(key).ok())
  }

  fn load_file(root: &Path) -> MonorepoResult<Self> {
    let Some(config_path) = Self::find_config_path(root) else {
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Unreadable {
      path: config_path.clone(),
      reason: e.to_string(),
    })?;
    let config: SrmConfig = toml_edit::de::from_str(&content).map_err(|e| ConfigError::Unreadable {
      path: config_path.clone(),
      reason: e.to_string(),
    })?;

    config.validate("max_threads", &config.max_threads.to_string())?;
    Ok(config)
  }

  /// Apply environment overrides read through `lookup`
  pub fn with_env<F>(mut self, lookup: F) -> MonorepoResult<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    if let Some(raw) = lookup(MAX_THREADS_ENV) {
      let raw = raw.trim().to_string();
      if !raw.is_empty() {
        self.max_threads = raw.parse::<usize>().map_err(|e| ConfigError::InvalidValue {
          key: MAX_THREADS_ENV.to_string(),
          value: raw.clone(),
          reason: e.to_string(),
        })?;
        self.validate(MAX_THREADS_ENV, &raw)?;
      }
    }

    if let Some(raw) = lookup(DEBUG_ENV) {
      self.debug = matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
    }

    Ok(self)
  }

  fn validate(&self, key: &str, raw: &str) -> Result<(), ConfigError> {
    if self.max_threads == 0 {
      return Err(ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        reason: "must be at least 1".to_string(),
      });
    }
    Ok(())
  }
}
