//! Hook adapter driven by real git history

use crate::helpers::TestRepo;
use anyhow::Result;
use release_monorepo::release::{LifecycleStep, MonorepoPlugin, ReleaseState, handler};
use release_monorepo::{Commit, MonorepoResult, SystemGit};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

fn history(repo: &TestRepo) -> MonorepoResult<Vec<Commit>> {
  SystemGit::open(&repo.path)?.commits_since(None)?.collect()
}

#[test]
fn test_full_release_cycle_for_one_package() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.add_node_package("packages/api", "api")?;
  repo.add_node_package("packages/ui", "ui")?;
  repo.commit("chore: scaffold")?;
  let api_fix = repo.commit_files("fix(api): timeout", &["packages/api/src/client.js"])?;
  repo.commit_files("feat(ui): button", &["packages/ui/src/button.js"])?;

  let plugin = MonorepoPlugin::new(repo.path.join("packages/api"))?;
  assert_eq!(plugin.tag_format()?, "api-v${version}");

  let seen: Arc<Mutex<Vec<(String, Vec<String>, Option<String>)>>> = Arc::new(Mutex::new(Vec::new()));
  let record = |step: &'static str| {
    let seen = Arc::clone(&seen);
    handler(move |_config: &Value, state: ReleaseState| {
      let hashes = state.commits.iter().map(|c| c.hash.clone()).collect();
      let version = state.next_release.as_ref().map(|n| n.version.clone());
      seen.lock().unwrap().push((step.to_string(), hashes, version));
      Ok(json!({ "step": step }))
    })
  };

  let commits = history(&repo)?;
  assert_eq!(commits.len(), 4);

  let analyze = plugin.wrap(LifecycleStep::AnalyzeCommits, record("analyze"));
  let notes = plugin.wrap(LifecycleStep::GenerateNotes, record("notes"));

  let result = analyze.call(&json!({}), ReleaseState::new(commits.clone()))?;
  assert_eq!(result, json!({ "step": "analyze" }));
  notes.call(&json!({}), ReleaseState::new(commits).with_next_release("1.1.0"))?;

  let seen = seen.lock().unwrap();
  assert_eq!(seen[0].0, "analyze");
  assert_eq!(seen[0].1.len(), 2);
  assert_eq!(seen[0].1[0], api_fix);
  assert_eq!(seen[0].2, None);
  assert_eq!(seen[1].1, seen[0].1);
  assert_eq!(seen[1].2.as_deref(), Some("api-v1.1.0"));
  Ok(())
}

#[test]
fn test_host_json_round_trip() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.add_node_package("svc", "svc")?;
  let svc = repo.commit("feat(svc): init")?;
  repo.commit_files("docs: readme", &["README.md"])?;

  let commits = serde_json::to_value(history(&repo)?)?;
  let input = json!({
    "commits": commits,
    "nextRelease": {"version": "0.1.0", "type": "minor", "gitHead": "deadbeef"},
    "options": {"debug": false, "repositoryUrl": "https://example.invalid/repo.git"},
    "branch": {"name": "main"}
  });

  let plugin = MonorepoPlugin::new(repo.path.join("svc"))?;
  let echo = plugin.wrap(
    LifecycleStep::Success,
    handler(|_config: &Value, state: ReleaseState| state.to_json()),
  );
  let output = echo.call(&json!({}), ReleaseState::from_json(input)?)?;

  assert_eq!(output["commits"].as_array().map(Vec::len), Some(1));
  assert_eq!(output["commits"][0]["hash"], svc.as_str());
  assert_eq!(output["nextRelease"]["version"], "svc-v0.1.0");
  assert_eq!(output["nextRelease"]["gitHead"], "deadbeef");
  assert_eq!(output["options"]["repositoryUrl"], "https://example.invalid/repo.git");
  assert_eq!(output["branch"]["name"], "main");
  Ok(())
}

/// Restores the process directory when dropped
struct CurrentDir(std::path::PathBuf);

impl Drop for CurrentDir {
  fn drop(&mut self) {
    let _ = std::env::set_current_dir(&self.0);
  }
}

#[test]
fn test_relative_cwd_from_nested_directory() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.add_node_package("packages/api", "api")?;
  let fix = repo.commit_files("fix(api): retry", &["packages/api/src/client.js"])?;
  repo.commit_files("docs: readme", &["README.md"])?;

  let plugin = {
    let _restore = CurrentDir(std::env::current_dir()?);
    std::env::set_current_dir(repo.path.join("packages/api/src"))?;
    MonorepoPlugin::new(".")?
  };

  assert!(plugin.cwd().is_absolute());
  assert_eq!(plugin.tag_format()?, "api-v${version}");

  let only = plugin.wrap(
    LifecycleStep::AnalyzeCommits,
    handler(|_config: &Value, state: ReleaseState| {
      Ok(json!(state.commits.iter().map(|c| c.hash.clone()).collect::<Vec<_>>()))
    }),
  );
  let kept = only.call(&json!({}), ReleaseState::new(history(&repo)?))?;
  assert_eq!(kept[0], fix.as_str());
  Ok(())
}

#[test]
fn test_outside_repository_fails_at_construction() -> Result<()> {
  let dir = tempfile::TempDir::new()?;
  let err = MonorepoPlugin::new(dir.path()).unwrap_err();
  assert!(err.is_history_unavailable());
  Ok(())
}
