//! `srm tag-format` and `srm tag`

use crate::core::error::{MonorepoError, MonorepoResult};
use crate::package;
use crate::release::tag;
use std::path::Path;

/// Tag template of the package containing `cwd`
pub fn tag_format_for(cwd: &Path) -> MonorepoResult<String> {
  let manifest = package::find_nearest_manifest(cwd)?;
  Ok(tag::tag_format(&manifest.name))
}

/// Tag for `version` of the package containing `cwd`
pub fn tag_for_version(cwd: &Path, version: &str) -> MonorepoResult<String> {
  let version = version.trim();
  let parsed = semver::Version::parse(version).map_err(|e| {
    MonorepoError::with_help(
      format!("Invalid version '{}': {}", version, e),
      "Pass a semantic version such as 1.4.0 or 2.0.0-rc.1 (no leading 'v').",
    )
  })?;

  let manifest = package::find_nearest_manifest(cwd)?;
  Ok(tag::tag_for(&manifest.name, &parsed.to_string()))
}

pub fn run_tag_format(cwd: &Path) -> MonorepoResult<()> {
  println!("{}", tag_format_for(cwd)?);
  Ok(())
}

pub fn run_tag(cwd: &Path, version: &str) -> MonorepoResult<()> {
  println!("{}", tag_for_version(cwd, version)?);
  Ok(())
}
