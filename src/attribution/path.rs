//! Tree-relative path matching
//!
//! A changed file belongs to a package when the package's segments are a
//! segment-wise prefix of the file's segments. Comparison is on whole
//! segments: `pkg` never matches `pkg-other/x`.

use crate::core::error::{MonorepoResult, PackageError};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Lexically normalize a repository-relative path into segments
///
/// `.` is dropped and `..` pops the previous segment (or is kept when there
/// is nothing left to pop, so escaping paths stay detectable). Both `/` and
/// the platform separator split segments.
pub fn normalize_segments(path: &str) -> Vec<String> {
  let unified;
  let path = if std::path::MAIN_SEPARATOR != '/' {
    unified = path.replace('/', std::path::MAIN_SEPARATOR_STR);
    unified.as_str()
  } else {
    path
  };

  let mut segments: Vec<String> = Vec::new();
  for component in Path::new(path).components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => {
        if segments.last().is_some_and(|s| s != "..") {
          segments.pop();
        } else {
          segments.push("..".to_string());
        }
      }
      Component::Normal(part) => segments.push(part.to_string_lossy().into_owned()),
      Component::RootDir | Component::Prefix(_) => {}
    }
  }
  segments
}

/// True when `file_path` lies inside (or is) the directory named by
/// `package_segments`
///
/// An empty `package_segments` is the repository root and matches
/// everything.
pub fn is_descendant_or_self(package_segments: &[String], file_path: &str) -> bool {
  let file_segments = normalize_segments(file_path);

  if file_segments.len() < package_segments.len() {
    return false;
  }

  package_segments
    .iter()
    .zip(file_segments.iter())
    .all(|(package, file)| package == file)
}

/// Repository-relative location of a package
///
/// Never empty, never absolute, never outside the repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackagePath {
  segments: Vec<String>,
}

impl PackagePath {
  /// Build from a path relative to the repository root
  pub fn new(relative: &Path) -> MonorepoResult<Self> {
    let invalid = |reason: &str| PackageError::InvalidPackagePath {
      path: relative.to_path_buf(),
      reason: reason.to_string(),
    };

    if relative.is_absolute() || relative.has_root() {
      return Err(invalid("must be relative to the repository root").into());
    }

    let segments = normalize_segments(&relative.to_string_lossy());
    if segments.first().is_some_and(|s| s == "..") {
      return Err(invalid("escapes the repository root").into());
    }
    if segments.is_empty() {
      return Err(invalid("the package root is the repository root").into());
    }

    Ok(Self { segments })
  }

  /// Relate an absolute package root to an absolute repository root
  pub fn from_roots(package_root: &Path, repository_root: &Path) -> MonorepoResult<Self> {
    let relative = package_root.strip_prefix(repository_root).map_err(|_| PackageError::OutsideRepository {
      package_root: package_root.to_path_buf(),
      repository_root: repository_root.to_path_buf(),
    })?;
    Self::new(relative)
  }

  pub fn segments(&self) -> &[String] {
    &self.segments
  }

  /// True when `file_path` (repository-relative) belongs to this package
  pub fn contains(&self, file_path: &str) -> bool {
    is_descendant_or_self(&self.segments, file_path)
  }

  /// Path form, joined with the platform separator
  pub fn to_path_buf(&self) -> PathBuf {
    self.segments.iter().collect()
  }
}

impl fmt::Display for PackagePath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.segments.join("/"))
  }
}
