//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A throwaway monorepo with git history
pub struct TestRepo {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestRepo {
  /// Create an empty repository with one root commit (a README)
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;
    git(&path, &["config", "commit.gpgsign", "false"])?;
    git(&path, &["config", "tag.gpgsign", "false"])?;

    std::fs::write(path.join("README.md"), "# monorepo\n")?;
    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "chore: initial commit"])?;

    Ok(Self { _root: root, path })
  }

  /// Add a JavaScript package at `dir` (not committed)
  pub fn add_node_package(&self, dir: &str, name: &str) -> Result<PathBuf> {
    let package_path = self.path.join(dir);
    std::fs::create_dir_all(&package_path)?;
    std::fs::write(
      package_path.join("package.json"),
      format!("{{\n  \"name\": \"{}\",\n  \"version\": \"0.0.0-development\"\n}}\n", name),
    )?;
    Ok(package_path)
  }

  /// Add a Rust crate at `dir` (not committed)
  pub fn add_crate(&self, dir: &str, name: &str, version: &str) -> Result<PathBuf> {
    let crate_path = self.path.join(dir);
    std::fs::create_dir_all(crate_path.join("src"))?;
    std::fs::write(
      crate_path.join("Cargo.toml"),
      format!("[package]\nname = \"{}\"\nversion = \"{}\"\nedition = \"2021\"\n", name, version),
    )?;
    std::fs::write(crate_path.join("src/lib.rs"), format!("//! {} crate\n", name))?;
    Ok(crate_path)
  }

  /// Write a file relative to the repository root, creating parents
  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    let file_path = self.path.join(path);
    if let Some(parent) = file_path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
  }

  /// Commit everything and return the new HEAD hash
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;
    self.head()
  }

  /// Write `files` (with their own path as content) and commit them
  pub fn commit_files(&self, message: &str, files: &[&str]) -> Result<String> {
    for file in files {
      self.write_file(file, &format!("{}\n{}\n", file, message))?;
    }
    self.commit(message)
  }

  pub fn tag(&self, name: &str) -> Result<()> {
    git(&self.path, &["tag", name])?;
    Ok(())
  }

  pub fn head(&self) -> Result<String> {
    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the srm CLI, returning its output whatever the exit status
pub fn srm(cwd: &Path, args: &[&str]) -> Result<Output> {
  Command::new(env!("CARGO_BIN_EXE_srm"))
    .current_dir(cwd)
    .args(args)
    .env("SRM_MAX_THREADS", "4")
    .env_remove("SRM_DEBUG")
    .env_remove("RUST_LOG")
    .output()
    .context("Failed to run srm")
}

/// Run the srm CLI and require success
pub fn run_srm(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = srm(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "srm command failed: srm {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

/// Hashes from the JSON report of `srm commits --json`
pub fn report_hashes(output: &Output) -> Result<Vec<String>> {
  let report: serde_json::Value = serde_json::from_slice(&output.stdout).context("srm did not print JSON")?;
  let commits = report["commits"].as_array().context("report has no commits array")?;
  Ok(
    commits
      .iter()
      .filter_map(|c| c["hash"].as_str().map(str::to_string))
      .collect(),
  )
}
