/// package.json manifest reader (npm, pnpm, yarn and bun all share it)
use super::{ManifestAdapter, PackageManifest};
use crate::core::error::{MonorepoResult, PackageError};
use serde::Deserialize;
use std::path::Path;

pub struct NodeManifest;

/// package.json structure (minimal fields we care about)
#[derive(Debug, Deserialize)]
struct PackageJson {
  #[serde(default)]
  name: Option<String>,
  #[serde(default)]
  version: Option<String>,
}

impl ManifestAdapter for NodeManifest {
  fn file_name(&self) -> &'static str {
    "package.json"
  }

  fn read(&self, path: &Path) -> MonorepoResult<Option<PackageManifest>> {
    let content = std::fs::read_to_string(path).map_err(|e| PackageError::ManifestUnreadable {
      path: path.to_path_buf(),
      reason: e.to_string(),
    })?;
    let pkg: PackageJson = serde_json::from_str(&content).map_err(|e| PackageError::ManifestUnreadable {
      path: path.to_path_buf(),
      reason: format!("Failed to parse package.json: {}", e),
    })?;

    let Some(name) = pkg.name.filter(|n| !n.trim().is_empty()) else {
      return Ok(None);
    };

    Ok(Some(PackageManifest {
      name,
      version: pkg.version.and_then(|v| semver::Version::parse(&v).ok()),
      manifest_path: path.to_path_buf(),
    }))
  }
}
