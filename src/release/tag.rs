//! Package-scoped tag names: `<name>-v<version>`

/// Placeholder the host substitutes with the release version
pub const VERSION_PLACEHOLDER: &str = "${version}";

/// `<name>-v`, shared by every tag of the package
pub fn tag_prefix(name: &str) -> String {
  format!("{}-v", name)
}

/// Tag for one release of `name`
pub fn tag_for(name: &str, version: &str) -> String {
  format!("{}{}", tag_prefix(name), version)
}

/// Host tag template for `name`
pub fn tag_format(name: &str) -> String {
  tag_for(name, VERSION_PLACEHOLDER)
}

/// Version encoded in `tag`, when it is a semver tag of `name`
pub fn version_from_tag(name: &str, tag: &str) -> Option<semver::Version> {
  let raw = tag.strip_prefix(&tag_prefix(name))?;
  semver::Version::parse(raw).ok()
}
