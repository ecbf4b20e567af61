//! Core building blocks shared by the attribution engine and the plugin
//!
//! - **config**: `SRM_*` environment settings and the optional srm.toml
//! - **context**: the package being released, resolved once
//! - **error**: error categories with contextual help messages
//! - **vcs**: history access (the `History` trait and `SystemGit`)

pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
