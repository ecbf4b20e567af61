//! CLI commands for srm
//!
//! ## Inspection
//! - **commits**: commits attributed to the current package since its last tag
//! - **tags**: the package's tag format, and the tag for a given version
//!
//! All commands resolve the package from the working directory they are given.

pub mod commits;
pub mod tags;

pub use commits::{CommitsOptions, CommitsReport, collect_commits, run_commits};
pub use tags::{run_tag, run_tag_format, tag_for_version, tag_format_for};
