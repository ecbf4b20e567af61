//! Monorepo support for single-package release pipelines
//!
//! Decides which commits of a shared git history belong to one package and
//! presents only those, together with a package-scoped tag, to the host
//! pipeline's lifecycle hooks.
//!
//! - **attribution**: the commit-to-package attribution engine
//! - **core**: config, package context, errors, git access
//! - **package**: manifest discovery (`Cargo.toml`, `package.json`)
//! - **release**: host state, tag template, hook adapter
//! - **commands** / **ui**: the `srm` inspection CLI

pub mod attribution;
pub mod commands;
pub mod core;
pub mod package;
pub mod release;
pub mod ui;

pub use attribution::{AttributionCache, CommitFilter, ConcurrencyLimiter, PackagePath};
pub use crate::core::error::{MonorepoError, MonorepoResult};
pub use crate::core::vcs::{Commit, History, SystemGit};
pub use release::{LifecycleStep, MonorepoPlugin, ReleaseState};
