pub mod system_git;
mod system_git_ops;

pub use system_git::SystemGit;
pub use system_git_ops::CommitLog;

use crate::core::error::MonorepoResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A commit as seen by the release pipeline
///
/// `files` starts out empty and is filled once by the attribution engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
  pub hash: String,
  #[serde(default)]
  pub message: String,
  #[serde(default, alias = "gitTags", deserialize_with = "deserialize_tags")]
  pub tags: Vec<String>,
  pub committer_date: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub files: Option<Vec<String>>,
}

impl Commit {
  pub fn new(hash: impl Into<String>, message: impl Into<String>, committer_date: DateTime<Utc>) -> Self {
    Self {
      hash: hash.into(),
      message: message.into(),
      tags: Vec::new(),
      committer_date,
      files: None,
    }
  }

  /// Attach the changed-file list. A list that is already present is kept.
  pub fn with_files(mut self, files: Vec<String>) -> Self {
    if self.files.is_none() {
      self.files = Some(files);
    }
    self
  }

  /// Short hash for display
  pub fn short_hash(&self) -> &str {
    let end = self.hash.len().min(7);
    &self.hash[..end]
  }

  /// First line of the message
  pub fn subject(&self) -> &str {
    self.message.lines().next().unwrap_or("")
  }
}

/// Extract tag names from a git ref decoration such as
/// `(HEAD -> main, tag: a-v1.0.0, origin/main)`.
pub(crate) fn parse_ref_tags(decoration: &str) -> Vec<String> {
  decoration
    .trim()
    .trim_start_matches('(')
    .trim_end_matches(')')
    .split(',')
    .filter_map(|r| r.trim().strip_prefix("tag:"))
    .map(|t| t.trim().to_string())
    .filter(|t| !t.is_empty())
    .collect()
}

/// Hosts send tags either as a list or as a raw ref decoration string.
fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Tags {
    List(Vec<String>),
    Decoration(String),
  }

  Ok(match Option::<Tags>::deserialize(deserializer)? {
    Some(Tags::List(tags)) => tags.into_iter().map(|t| t.trim().to_string()).collect(),
    Some(Tags::Decoration(raw)) => parse_ref_tags(&raw),
    None => Vec::new(),
  })
}

/// Read access to version-control history
///
/// [`SystemGit`] is the production implementation; tests substitute
/// in-memory histories.
pub trait History: Send + Sync {
  /// Absolute path of the repository's top-level directory
  fn repository_root(&self) -> MonorepoResult<PathBuf>;

  /// Paths changed by `hash`, relative to the repository root
  ///
  /// Root and merge commits are included. A commit touching nothing yields an
  /// empty vector.
  fn files_changed_by(&self, hash: &str) -> MonorepoResult<Vec<String>>;
}
