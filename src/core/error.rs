//! Error types for release-monorepo with contextual messages and exit codes
//!
//! Every failure is categorized so the host pipeline (or the `srm` CLI) can
//! report it with a useful hint. Nothing here retries: attribution is
//! all-or-nothing per invocation.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for the `srm` binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, package resolution, invalid args)
  User = 1,
  /// System error (git, I/O)
  System = 2,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Boxed error produced by a wrapped lifecycle hook
pub type HookFailure = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for release-monorepo
#[derive(Debug)]
pub enum MonorepoError {
  /// git could not be run, exited non-zero, or produced unusable output
  HistoryUnavailable(GitError),

  /// The current package could not be located or related to the repository
  PackageResolution(PackageError),

  /// Invalid configuration (environment or srm.toml)
  Config(ConfigError),

  /// Failure raised by the wrapped host hook, passed through untouched
  Hook(HookFailure),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl MonorepoError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    MonorepoError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    MonorepoError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Wrap an error raised by a host hook
  pub fn hook(err: impl Into<HookFailure>) -> Self {
    MonorepoError::Hook(err.into())
  }

  /// Add context to an existing error
  ///
  /// Only free-form messages carry context; categorized errors and hook
  /// failures are returned as they are.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      MonorepoError::Message { message, context, help } => MonorepoError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      MonorepoError::Io(err) => MonorepoError::Message {
        message: format!("I/O error: {}", err),
        context: Some(ctx_str),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      MonorepoError::HistoryUnavailable(_) => ExitCode::System,
      MonorepoError::PackageResolution(_) => ExitCode::User,
      MonorepoError::Config(_) => ExitCode::User,
      MonorepoError::Hook(_) => ExitCode::User,
      MonorepoError::Io(_) => ExitCode::System,
      MonorepoError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      MonorepoError::HistoryUnavailable(e) => e.help_message(),
      MonorepoError::PackageResolution(e) => e.help_message(),
      MonorepoError::Config(e) => e.help_message(),
      MonorepoError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }

  /// True for the `HistoryUnavailable` category
  pub fn is_history_unavailable(&self) -> bool {
    matches!(self, MonorepoError::HistoryUnavailable(_))
  }

  /// True for the `PackageResolution` category
  pub fn is_package_resolution(&self) -> bool {
    matches!(self, MonorepoError::PackageResolution(_))
  }
}

impl fmt::Display for MonorepoError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      MonorepoError::HistoryUnavailable(e) => write!(f, "History unavailable: {}", e),
      MonorepoError::PackageResolution(e) => write!(f, "Package resolution failed: {}", e),
      MonorepoError::Config(e) => write!(f, "{}", e),
      MonorepoError::Hook(e) => write!(f, "{}", e),
      MonorepoError::Io(e) => write!(f, "I/O error: {}", e),
      MonorepoError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for MonorepoError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      MonorepoError::Io(e) => Some(e),
      MonorepoError::Hook(e) => Some(e.as_ref()),
      _ => None,
    }
  }
}

impl From<io::Error> for MonorepoError {
  fn from(err: io::Error) -> Self {
    MonorepoError::Io(err)
  }
}

impl From<GitError> for MonorepoError {
  fn from(err: GitError) -> Self {
    MonorepoError::HistoryUnavailable(err)
  }
}

impl From<PackageError> for MonorepoError {
  fn from(err: PackageError) -> Self {
    MonorepoError::PackageResolution(err)
  }
}

impl From<ConfigError> for MonorepoError {
  fn from(err: ConfigError) -> Self {
    MonorepoError::Config(err)
  }
}

impl From<String> for MonorepoError {
  fn from(msg: String) -> Self {
    MonorepoError::message(msg)
  }
}

impl From<&str> for MonorepoError {
  fn from(msg: &str) -> Self {
    MonorepoError::message(msg)
  }
}

impl From<toml_edit::de::Error> for MonorepoError {
  fn from(err: toml_edit::de::Error) -> Self {
    MonorepoError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for MonorepoError {
  fn from(err: serde_json::Error) -> Self {
    MonorepoError::message(format!("JSON error: {}", err))
  }
}

impl From<rayon::ThreadPoolBuildError> for MonorepoError {
  fn from(err: rayon::ThreadPoolBuildError) -> Self {
    MonorepoError::message(format!("Failed to start attribution workers: {}", err))
  }
}

/// Host hooks written with anyhow can use `?` directly; the failure is kept
/// as a hook failure so it passes through the adapter untouched.
impl From<anyhow::Error> for MonorepoError {
  fn from(err: anyhow::Error) -> Self {
    MonorepoError::Hook(err.into())
  }
}

/// Git operation errors (all surface as `HistoryUnavailable`)
#[derive(Debug)]
pub enum GitError {
  /// git could not be spawned at all
  SpawnFailed { command: String, reason: String },

  /// Git command exited non-zero
  CommandFailed { command: String, stderr: String },

  /// Not inside a git work tree
  RepoNotFound { path: PathBuf },

  /// Output could not be parsed
  MalformedOutput { command: String, detail: String },

  /// Revision argument refused before reaching git
  InvalidRevision { rev: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::SpawnFailed { .. } => Some("Make sure `git` is installed and available on PATH.".to_string()),
      GitError::RepoNotFound { path } => Some(format!(
        "Run this from inside a git work tree (checked: {}).",
        path.display()
      )),
      GitError::CommandFailed { stderr, .. } if stderr.contains("unknown revision") => {
        Some("The reference does not exist in this clone. Fetch tags or use a full clone.".to_string())
      }
      GitError::CommandFailed { stderr, .. } if stderr.contains("does not have any commits") => {
        Some("The repository has no commits yet.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::SpawnFailed { command, reason } => {
        write!(f, "Failed to execute {}: {}", command, reason)
      }
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr.trim_end())
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::MalformedOutput { command, detail } => {
        write!(f, "Unexpected output from {}: {}", command, detail)
      }
      GitError::InvalidRevision { rev } => {
        write!(f, "Refusing revision argument '{}'", rev)
      }
    }
  }
}

/// Package resolution errors
#[derive(Debug)]
pub enum PackageError {
  /// No manifest between the start directory and the filesystem root
  ManifestNotFound { start: PathBuf },

  /// Manifest exists but could not be read or parsed
  ManifestUnreadable { path: PathBuf, reason: String },

  /// The package root is not inside the repository
  OutsideRepository { package_root: PathBuf, repository_root: PathBuf },

  /// The package path cannot identify a package directory
  InvalidPackagePath { path: PathBuf, reason: String },
}

impl PackageError {
  fn help_message(&self) -> Option<String> {
    match self {
      PackageError::ManifestNotFound { .. } => {
        Some("Run from a package directory containing a Cargo.toml [package] or a named package.json.".to_string())
      }
      PackageError::OutsideRepository { .. } => {
        Some("The package must live inside the git repository whose history is analyzed.".to_string())
      }
      PackageError::InvalidPackagePath { .. } => {
        Some("Run from the package's own directory, not from the repository root.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for PackageError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PackageError::ManifestNotFound { start } => {
        write!(f, "No package manifest found in {} or any parent directory", start.display())
      }
      PackageError::ManifestUnreadable { path, reason } => {
        write!(f, "Cannot read package manifest {}: {}", path.display(), reason)
      }
      PackageError::OutsideRepository {
        package_root,
        repository_root,
      } => write!(
        f,
        "Package root {} is outside repository {}",
        package_root.display(),
        repository_root.display()
      ),
      PackageError::InvalidPackagePath { path, reason } => {
        write!(f, "Invalid package path '{}': {}", path.display(), reason)
      }
    }
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// A setting has an unusable value
  InvalidValue { key: String, value: String, reason: String },

  /// Config file exists but could not be loaded
  Unreadable { path: PathBuf, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::InvalidValue { key, .. } if key == "SRM_MAX_THREADS" || key == "max_threads" => {
        Some("Use a positive integer, e.g. SRM_MAX_THREADS=64.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::InvalidValue { key, value, reason } => {
        write!(f, "Invalid value '{}' for {}: {}", value, key, reason)
      }
      ConfigError::Unreadable { path, reason } => {
        write!(f, "Failed to load config {}: {}", path.display(), reason)
      }
    }
  }
}

/// Result type alias for release-monorepo
pub type MonorepoResult<T> = Result<T, MonorepoError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> MonorepoResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> MonorepoResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<MonorepoError>,
{
  fn context(self, ctx: impl Into<String>) -> MonorepoResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> MonorepoResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &MonorepoError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
