//! Package manifest discovery
//!
//! A package root is the nearest directory, walking up from the working
//! directory, that holds a manifest declaring a package name.
//!
//! Currently supports:
//! - Rust (`Cargo.toml` with a `[package]` table)
//! - JavaScript/TypeScript (`package.json` with a `name`)
//!
//! Manifests without a name (virtual Cargo workspaces, private workspace
//! roots) are skipped and the search continues upward.

use crate::core::error::{MonorepoResult, PackageError};
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod cargo;
pub mod node;

pub use cargo::CargoManifest;
pub use node::NodeManifest;

/// What a manifest declares about its package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
  pub name: String,
  pub version: Option<semver::Version>,
  pub manifest_path: PathBuf,
}

impl PackageManifest {
  /// Directory containing the manifest
  pub fn root(&self) -> &Path {
    self.manifest_path.parent().unwrap_or_else(|| Path::new("."))
  }
}

/// A manifest format that can name a package
pub trait ManifestAdapter: Send + Sync {
  /// File name looked for in each directory
  fn file_name(&self) -> &'static str;

  /// Read the manifest at `path`. `Ok(None)` means the file exists but does
  /// not declare a package.
  fn read(&self, path: &Path) -> MonorepoResult<Option<PackageManifest>>;
}

/// Default adapters, checked in this order within a directory
pub fn default_adapters() -> Vec<Box<dyn ManifestAdapter>> {
  vec![Box::new(CargoManifest), Box::new(NodeManifest)]
}

/// Find the nearest named package manifest at or above `start`
pub fn find_nearest_manifest(start: &Path) -> MonorepoResult<PackageManifest> {
  find_nearest_manifest_with(start, &default_adapters())
}

/// Same as [`find_nearest_manifest`] with an explicit adapter list
pub fn find_nearest_manifest_with(start: &Path, adapters: &[Box<dyn ManifestAdapter>]) -> MonorepoResult<PackageManifest> {
  // A relative start has no parents past its first component
  let start = std::path::absolute(start)?;
  let mut current = Some(start.as_path());

  while let Some(dir) = current {
    for adapter in adapters {
      let candidate = dir.join(adapter.file_name());
      if !candidate.is_file() {
        continue;
      }
      if let Some(manifest) = adapter.read(&candidate)? {
        debug!(name = %manifest.name, manifest = %candidate.display(), "resolved package manifest");
        return Ok(manifest);
      }
      debug!(manifest = %candidate.display(), "manifest declares no package, continuing upward");
    }
    current = dir.parent();
  }

  Err(PackageError::ManifestNotFound { start }.into())
}
