/// Cargo.toml manifest reader
use super::{ManifestAdapter, PackageManifest};
use crate::core::error::{MonorepoResult, PackageError};
use std::path::Path;
use toml_edit::DocumentMut;

pub struct CargoManifest;

impl ManifestAdapter for CargoManifest {
  fn file_name(&self) -> &'static str {
    "Cargo.toml"
  }

  fn read(&self, path: &Path) -> MonorepoResult<Option<PackageManifest>> {
    let unreadable = |reason: String| PackageError::ManifestUnreadable {
      path: path.to_path_buf(),
      reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| unreadable(e.to_string()))?;
    let doc = content.parse::<DocumentMut>().map_err(|e| unreadable(e.to_string()))?;

    // Virtual workspace manifests have no [package]
    let Some(package) = doc.get("package").and_then(|p| p.as_table_like()) else {
      return Ok(None);
    };

    let Some(name) = package.get("name").and_then(|n| n.as_str()) else {
      return Err(unreadable("[package] has no name".to_string()).into());
    };

    // `version.workspace = true` and friends leave the version unknown here
    let version = package
      .get("version")
      .and_then(|v| v.as_str())
      .and_then(|v| semver::Version::parse(v).ok());

    Ok(Some(PackageManifest {
      name: name.to_string(),
      version,
      manifest_path: path.to_path_buf(),
    }))
  }
}
