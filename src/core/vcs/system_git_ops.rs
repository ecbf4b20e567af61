//! History operations for SystemGit (commit listing, per-commit diffs, tags)

use super::system_git::{SystemGit, validate_revision};
use super::{Commit, parse_ref_tags};
use crate::core::error::{GitError, MonorepoError, MonorepoResult};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::io::{BufRead, BufReader, Read};
use std::process::{Child, ChildStdout, Stdio};
use std::thread::JoinHandle;
use tracing::debug;

/// Separates fields inside one log record
const FIELD_SEP: char = '\x1f';

/// Terminates one log record
const RECORD_SEP: u8 = 0x1e;

/// hash, committer date (strict ISO 8601), ref decoration, raw body
const LOG_FORMAT: &str = "--format=%H%x1f%cI%x1f%D%x1f%B%x1e";

impl SystemGit {
  /// Stream commits from `since` (exclusive) to HEAD (inclusive), newest first
  ///
  /// With no `since`, the whole history reachable from HEAD is listed. The
  /// returned iterator parses records as git writes them.
  pub fn commits_since(&self, since: Option<&str>) -> MonorepoResult<CommitLog> {
    let range = match since {
      Some(rev) => {
        validate_revision(rev)?;
        format!("{}..HEAD", rev)
      }
      None => "HEAD".to_string(),
    };
    let command = format!("git log {} {}", LOG_FORMAT, range);
    debug!(%command, "streaming history");

    let mut child = self
      .git_cmd()
      .args(["log", LOG_FORMAT, &range, "--"])
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .spawn()
      .map_err(|e| GitError::SpawnFailed {
        command: command.clone(),
        reason: e.to_string(),
      })?;

    let stdout = child.stdout.take().ok_or_else(|| GitError::MalformedOutput {
      command: command.clone(),
      detail: "stdout was not captured".to_string(),
    })?;

    // Drained concurrently so a chatty stderr cannot stall stdout
    let stderr = child.stderr.take().map(|pipe| {
      std::thread::spawn(move || {
        let mut text = String::new();
        let _ = BufReader::new(pipe).read_to_string(&mut text);
        text
      })
    });

    Ok(CommitLog {
      command,
      child,
      reader: BufReader::new(stdout),
      stderr,
      finished: false,
    })
  }

  /// Files changed by a single commit, relative to the repository root
  ///
  /// Uses `diff-tree --root -m` so root commits list every file they add and
  /// merge commits list the files that differ from each parent. Paths are
  /// de-duplicated keeping first-seen order.
  pub fn changed_files(&self, hash: &str) -> MonorepoResult<Vec<String>> {
    validate_revision(hash)?;

    let output = self.run(&["diff-tree", "--root", "-m", "-r", "--name-only", "--no-commit-id", "-z", hash])?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut seen = HashSet::new();
    let files: Vec<String> = stdout
      .split('\0')
      .filter(|p| !p.is_empty())
      .filter(|p| seen.insert(p.to_string()))
      .map(str::to_string)
      .collect();

    debug!(hash, files = files.len(), "listed changed files");
    Ok(files)
  }

  /// Highest-versioned `<prefix><semver>` tag reachable from HEAD
  ///
  /// Tags that merely share the prefix (`core-v` against `core-vue-v1.0.0`)
  /// are skipped.
  pub fn latest_tag_with_prefix(&self, prefix: &str) -> MonorepoResult<Option<String>> {
    let pattern = format!("{}*", prefix);
    let output = self.run(&["tag", "--list", &pattern, "--merged", "HEAD", "--sort=-v:refname"])?;

    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .find(|t| is_versioned_tag(t, prefix))
        .map(str::to_string),
    )
  }
}

/// Lazy sequence of commits read from a running `git log`
///
/// A non-zero exit from git is reported as the final item. Dropping the log
/// before it is exhausted terminates the child process.
pub struct CommitLog {
  command: String,
  child: Child,
  reader: BufReader<ChildStdout>,
  stderr: Option<JoinHandle<String>>,
  finished: bool,
}

impl CommitLog {
  fn finish(&mut self) -> MonorepoResult<()> {
    self.finished = true;

    let status = self.child.wait().map_err(|e| GitError::SpawnFailed {
      command: self.command.clone(),
      reason: e.to_string(),
    })?;

    let stderr = self
      .stderr
      .take()
      .and_then(|handle| handle.join().ok())
      .unwrap_or_default();

    if !status.success() {
      return Err(
        GitError::CommandFailed {
          command: self.command.clone(),
          stderr,
        }
        .into(),
      );
    }

    Ok(())
  }
}

impl Iterator for CommitLog {
  type Item = MonorepoResult<Commit>;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      if self.finished {
        return None;
      }

      let mut record = Vec::new();
      match self.reader.read_until(RECORD_SEP, &mut record) {
        Ok(0) => return self.finish().err().map(Err),
        Ok(_) => {
          if record.last() == Some(&RECORD_SEP) {
            record.pop();
          }
          let text = String::from_utf8_lossy(&record);
          let text = text.trim_start_matches(['\n', '\r']);
          if text.trim().is_empty() {
            continue;
          }
          return Some(parse_log_record(text).map_err(|detail| {
            MonorepoError::from(GitError::MalformedOutput {
              command: self.command.clone(),
              detail,
            })
          }));
        }
        Err(e) => {
          self.finished = true;
          let _ = self.child.kill();
          let _ = self.child.wait();
          return Some(Err(
            GitError::SpawnFailed {
              command: self.command.clone(),
              reason: e.to_string(),
            }
            .into(),
          ));
        }
      }
    }
  }
}

impl Drop for CommitLog {
  fn drop(&mut self) {
    if !self.finished {
      let _ = self.child.kill();
      let _ = self.child.wait();
    }
  }
}

/// `tag` is `prefix` followed by a semantic version
fn is_versioned_tag(tag: &str, prefix: &str) -> bool {
  tag
    .strip_prefix(prefix)
    .is_some_and(|version| semver::Version::parse(version).is_ok())
}

/// Parse one `LOG_FORMAT` record into a Commit
fn parse_log_record(record: &str) -> Result<Commit, String> {
  let mut fields = record.splitn(4, FIELD_SEP);

  let hash = fields
    .next()
    .map(str::trim)
    .filter(|h| !h.is_empty())
    .ok_or_else(|| "missing commit hash".to_string())?;
  let date = fields.next().ok_or_else(|| format!("missing committer date for {}", hash))?;
  let refs = fields.next().ok_or_else(|| format!("missing refs for {}", hash))?;
  let body = fields.next().unwrap_or("");

  let committer_date = DateTime::parse_from_rfc3339(date.trim())
    .map_err(|e| format!("invalid committer date '{}' for {}: {}", date.trim(), hash, e))?
    .with_timezone(&Utc);

  let mut commit = Commit::new(hash, body.trim(), committer_date);
  commit.tags = parse_ref_tags(refs);
  Ok(commit)
}
