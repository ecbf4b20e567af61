//! Attribution against real git history

use crate::helpers::{TestRepo, git};
use anyhow::Result;
use release_monorepo::attribution::{AttributionCache, CommitFilter, ConcurrencyLimiter};
use release_monorepo::core::context::PackageContext;
use release_monorepo::{Commit, History, MonorepoResult, SystemGit};
use std::sync::Arc;

struct Fixture {
  repo: TestRepo,
  base: String,
  c1: String,
  c2: String,
  c3: String,
}

/// Packages `a/` (npm) and `b/` (cargo); c1 touches a, c2 touches b, c3 both
fn fixture() -> Result<Fixture> {
  let repo = TestRepo::new()?;
  repo.add_node_package("a", "a")?;
  repo.add_crate("b", "b", "0.1.0")?;
  let base = repo.commit("chore: add packages")?;

  let c1 = repo.commit_files("feat(a): index", &["a/index.js"])?;
  let c2 = repo.commit_files("feat(b): index", &["b/index.js"])?;
  let c3 = repo.commit_files("chore: touch both", &["a/x.js", "b/y.js"])?;

  Ok(Fixture { repo, base, c1, c2, c3 })
}

fn list(git: &SystemGit, since: Option<&str>) -> MonorepoResult<Vec<Commit>> {
  git.commits_since(since)?.collect()
}

fn hashes(commits: &[Commit]) -> Vec<String> {
  commits.iter().map(|c| c.hash.clone()).collect()
}

fn filter_for(cache: &Arc<AttributionCache>, fx: &Fixture, dir: &str) -> Result<CommitFilter> {
  Ok(CommitFilter::discover(
    &fx.repo.path.join(dir),
    Arc::clone(cache),
    ConcurrencyLimiter::new(2),
  )?)
}

#[test]
fn test_log_is_newest_first() -> Result<()> {
  let fx = fixture()?;
  let git = SystemGit::open(&fx.repo.path)?;

  let commits = list(&git, Some(&fx.base))?;
  assert_eq!(hashes(&commits), vec![fx.c3.clone(), fx.c2.clone(), fx.c1.clone()]);
  assert_eq!(commits[0].subject(), "chore: touch both");
  assert!(commits.iter().all(|c| c.files.is_none()));

  // Full history includes the two setup commits
  assert_eq!(list(&git, None)?.len(), 5);
  Ok(())
}

#[test]
fn test_each_package_sees_its_commits() -> Result<()> {
  let fx = fixture()?;
  let git = SystemGit::open(&fx.repo.path)?;
  let cache = Arc::new(AttributionCache::new(Arc::new(git.clone())));
  let commits = list(&git, Some(&fx.base))?;

  let for_a = filter_for(&cache, &fx, "a")?.filter_to_package(commits.clone())?;
  let for_b = filter_for(&cache, &fx, "b")?.filter_to_package(commits)?;

  assert_eq!(hashes(&for_a), vec![fx.c3.clone(), fx.c1.clone()]);
  assert_eq!(hashes(&for_b), vec![fx.c3.clone(), fx.c2.clone()]);

  // Both packages shared one lookup per commit
  assert_eq!(cache.len(), 3);
  Ok(())
}

#[test]
fn test_attributed_commits_carry_their_files() -> Result<()> {
  let fx = fixture()?;
  let git = SystemGit::open(&fx.repo.path)?;
  let cache = Arc::new(AttributionCache::new(Arc::new(git.clone())));

  let kept = filter_for(&cache, &fx, "a")?.filter_to_package(list(&git, Some(&fx.base))?)?;
  let mut files = kept[0].files.clone().unwrap_or_default();
  files.sort();
  assert_eq!(files, vec!["a/x.js".to_string(), "b/y.js".to_string()]);
  Ok(())
}

#[test]
fn test_filter_from_nested_directory() -> Result<()> {
  let fx = fixture()?;
  let git = SystemGit::open(&fx.repo.path)?;
  let cache = Arc::new(AttributionCache::new(Arc::new(git.clone())));

  // b/src resolves to the crate at b/
  let filter = filter_for(&cache, &fx, "b/src")?;
  assert_eq!(filter.package_path().to_string(), "b");
  Ok(())
}

#[test]
fn test_similar_prefix_is_not_a_match() -> Result<()> {
  let fx = fixture()?;
  let lookalike = fx.repo.commit_files("feat: a2", &["a2/index.js"])?;
  let git = SystemGit::open(&fx.repo.path)?;
  let cache = Arc::new(AttributionCache::new(Arc::new(git.clone())));

  let kept = filter_for(&cache, &fx, "a")?.filter_to_package(list(&git, Some(&fx.c3))?)?;
  assert!(!hashes(&kept).contains(&lookalike));
  Ok(())
}

#[test]
fn test_root_commit_and_merge_commit() -> Result<()> {
  let fx = fixture()?;

  git(&fx.repo.path, &["checkout", "-b", "feature"])?;
  fx.repo.commit_files("feat(a): on branch", &["a/branch.js"])?;
  git(&fx.repo.path, &["checkout", "main"])?;
  fx.repo.commit_files("docs: root readme", &["README.md"])?;
  git(&fx.repo.path, &["merge", "--no-ff", "-m", "Merge branch 'feature'", "feature"])?;
  let merge = fx.repo.head()?;

  let git = SystemGit::open(&fx.repo.path)?;
  let merged_files = git.files_changed_by(&merge)?;
  assert!(merged_files.contains(&"a/branch.js".to_string()));

  // The root commit lists the files it added
  let all = list(&git, None)?;
  let root = all.last().map(|c| c.hash.clone()).unwrap_or_default();
  assert_eq!(git.files_changed_by(&root)?, vec!["README.md".to_string()]);

  let cache = Arc::new(AttributionCache::new(Arc::new(git.clone())));
  let kept = filter_for(&cache, &fx, "a")?.filter_to_package(list(&git, Some(&fx.c3))?)?;
  assert!(hashes(&kept).contains(&merge));
  assert!(kept.iter().all(|c| c.subject() != "docs: root readme"));
  Ok(())
}

#[test]
fn test_empty_commit_is_not_attributed() -> Result<()> {
  let fx = fixture()?;
  git(&fx.repo.path, &["commit", "--allow-empty", "-m", "chore: empty"])?;
  let empty = fx.repo.head()?;

  let git = SystemGit::open(&fx.repo.path)?;
  assert!(git.files_changed_by(&empty)?.is_empty());

  let cache = Arc::new(AttributionCache::new(Arc::new(git.clone())));
  let kept = filter_for(&cache, &fx, "a")?.filter_to_package(list(&git, Some(&fx.c3))?)?;
  assert!(kept.is_empty());
  Ok(())
}

#[test]
fn test_context_resolution() -> Result<()> {
  let fx = fixture()?;
  let git = SystemGit::open(&fx.repo.path)?;

  let ctx = PackageContext::discover(&fx.repo.path.join("b"), &git)?;
  assert_eq!(ctx.name, "b");
  assert_eq!(ctx.version, Some(semver::Version::new(0, 1, 0)));
  assert_eq!(ctx.repository_root, fx.repo.path.canonicalize()?);

  // The repository root itself is not a package
  fx.repo.write_file("package.json", r#"{"name": "root"}"#)?;
  let err = PackageContext::discover(&fx.repo.path, &git).unwrap_err();
  assert!(err.is_package_resolution());
  Ok(())
}

#[test]
fn test_unknown_revision_is_history_unavailable() -> Result<()> {
  let fx = fixture()?;
  let git = SystemGit::open(&fx.repo.path)?;

  let err = list(&git, Some("no-such-tag")).unwrap_err();
  assert!(err.is_history_unavailable());

  let err = git.files_changed_by("--output=/tmp/x").unwrap_err();
  assert!(err.is_history_unavailable());
  Ok(())
}

#[test]
fn test_latest_package_tag() -> Result<()> {
  let fx = fixture()?;
  let git = SystemGit::open(&fx.repo.path)?;
  assert_eq!(git.latest_tag_with_prefix("a-v")?, None);

  git_tag(&fx, "a-v1.0.0", &fx.c1)?;
  git_tag(&fx, "a-v1.10.0", &fx.c3)?;
  git_tag(&fx, "a-v1.9.0", &fx.c2)?;
  git_tag(&fx, "ab-v9.0.0", &fx.c3)?;

  assert_eq!(git.latest_tag_with_prefix("a-v")?, Some("a-v1.10.0".to_string()));
  Ok(())
}

#[test]
fn test_package_tag_ignores_longer_package_names() -> Result<()> {
  let fx = fixture()?;
  let git = SystemGit::open(&fx.repo.path)?;

  // `core-vue-v1.0.0` sorts above `core-v1.0.0` and shares its prefix
  git_tag(&fx, "core-v1.0.0", &fx.c1)?;
  git_tag(&fx, "core-vue-v1.0.0", &fx.c3)?;
  git_tag(&fx, "core-vnext", &fx.c3)?;

  assert_eq!(git.latest_tag_with_prefix("core-v")?, Some("core-v1.0.0".to_string()));
  assert_eq!(git.latest_tag_with_prefix("core-vue-v")?, Some("core-vue-v1.0.0".to_string()));
  Ok(())
}

#[test]
fn test_paths_keep_surrounding_whitespace() -> Result<()> {
  let fx = fixture()?;
  let spaced = fx.repo.commit_files("feat(a): spaced", &["a/ spaced.js "])?;
  let git = SystemGit::open(&fx.repo.path)?;

  assert_eq!(git.files_changed_by(&spaced)?, vec!["a/ spaced.js ".to_string()]);
  Ok(())
}

fn git_tag(fx: &Fixture, name: &str, rev: &str) -> Result<()> {
  git(&fx.repo.path, &["tag", name, rev])?;
  Ok(())
}
