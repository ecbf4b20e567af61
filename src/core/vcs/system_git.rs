//! System git backend
//!
//! Every history query is a `git` subprocess. Optimized for:
//! - One `rev-parse` at open time (work tree cached)
//! - Streaming `git log` output instead of buffering whole histories
//! - Safe subprocess execution (isolated environment)

use crate::core::error::{GitError, MonorepoResult};
use crate::core::vcs::History;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

/// Git backend using system git
#[derive(Debug, Clone)]
pub struct SystemGit {
  /// Directory git is run from
  pub(crate) repo_path: PathBuf,

  /// Working tree root
  pub(crate) work_tree: PathBuf,
}

impl SystemGit {
  /// Open the repository containing `path`
  ///
  /// This performs ONE subprocess call to get the repository metadata.
  pub fn open(path: &Path) -> MonorepoResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .map_err(|e| GitError::SpawnFailed {
        command: "git rev-parse --show-toplevel".to_string(),
        reason: e.to_string(),
      })?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(
          GitError::RepoNotFound {
            path: path.to_path_buf(),
          }
          .into(),
        );
      }
      return Err(
        GitError::CommandFailed {
          command: "git rev-parse --show-toplevel".to_string(),
          stderr: stderr.to_string(),
        }
        .into(),
      );
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let work_tree = PathBuf::from(stdout.trim());
    debug!(work_tree = %work_tree.display(), "opened git repository");

    Ok(Self {
      repo_path: path.to_path_buf(),
      work_tree,
    })
  }

  /// Working tree root reported by git
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

    // Isolated environment (don't trust global config)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    // Force parseable output regardless of user config
    cmd.arg("-c").arg("core.quotePath=false");
    cmd.arg("-c").arg("log.showSignature=false");
    cmd.arg("-c").arg("color.ui=false");

    cmd
  }

  /// Run a git command to completion, mapping failures to `HistoryUnavailable`
  pub(crate) fn run(&self, args: &[&str]) -> MonorepoResult<Output> {
    let command = format!("git {}", args.join(" "));
    debug!(%command, "running git");

    let output = self.git_cmd().args(args).output().map_err(|e| GitError::SpawnFailed {
      command: command.clone(),
      reason: e.to_string(),
    })?;

    if !output.status.success() {
      return Err(
        GitError::CommandFailed {
          command,
          stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
        .into(),
      );
    }

    Ok(output)
  }
}

impl History for SystemGit {
  fn repository_root(&self) -> MonorepoResult<PathBuf> {
    Ok(self.work_tree.clone())
  }

  fn files_changed_by(&self, hash: &str) -> MonorepoResult<Vec<String>> {
    self.changed_files(hash)
  }
}

/// Reject anything git could read as an option
pub(crate) fn validate_revision(rev: &str) -> Result<(), GitError> {
  if rev.is_empty() || rev.starts_with('-') || rev.contains(char::is_whitespace) {
    return Err(GitError::InvalidRevision { rev: rev.to_string() });
  }
  Ok(())
}
