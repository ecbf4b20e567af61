//! Package context - resolve once, share everywhere
//!
//! ```text
//! cwd ──find_nearest_manifest──▶ manifest dir ─┐
//!                                              ├─ strip_prefix ─▶ PackagePath
//! History::repository_root() ─────────────────┘
//! ```
//!
//! Both roots are canonicalized first so a symlinked checkout or a symlinked
//! temp dir does not make the package look like it lives elsewhere.

use crate::attribution::path::PackagePath;
use crate::core::error::{MonorepoResult, ResultExt};
use crate::core::vcs::History;
use crate::package::{self, PackageManifest};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything known about the package being released
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageContext {
  /// Declared package name
  pub name: String,

  /// Declared version, when the manifest carries a literal one
  pub version: Option<semver::Version>,

  pub manifest_path: PathBuf,

  /// Package root directory (absolute, canonical)
  pub root: PathBuf,

  /// Repository top-level directory (absolute, canonical)
  pub repository_root: PathBuf,

  /// Package root relative to the repository root
  pub package_path: PackagePath,
}

impl PackageContext {
  /// Resolve the package containing `cwd` within the repository of `history`
  pub fn discover(cwd: &Path, history: &dyn History) -> MonorepoResult<Self> {
    let manifest = package::find_nearest_manifest(cwd)?;
    let repository_root = history.repository_root()?;
    Self::from_manifest(manifest, &repository_root)
  }

  /// Relate an already-read manifest to `repository_root`
  pub fn from_manifest(manifest: PackageManifest, repository_root: &Path) -> MonorepoResult<Self> {
    let root = canonical(manifest.root())?;
    let repository_root = canonical(repository_root)?;
    let package_path = PackagePath::from_roots(&root, &repository_root)?;

    debug!(name = %manifest.name, path = %package_path, "resolved package context");

    Ok(Self {
      name: manifest.name,
      version: manifest.version,
      manifest_path: manifest.manifest_path,
      root,
      repository_root,
      package_path,
    })
  }

  /// Prefix shared by every tag of this package (`<name>-v`)
  pub fn tag_prefix(&self) -> String {
    crate::release::tag::tag_prefix(&self.name)
  }
}

fn canonical(path: &Path) -> MonorepoResult<PathBuf> {
  path
    .canonicalize()
    .with_context(|| format!("Failed to resolve {}", path.display()))
}
