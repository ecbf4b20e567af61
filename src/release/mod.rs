//! Host pipeline integration
//!
//! # Architecture
//!
//! - **state**: `ReleaseState` as the host sends it, plus the `Logger` sink
//! - **tag**: package-scoped tag names (`<name>-v<version>`)
//! - **plugin**: `MonorepoPlugin`, wrapping the host's lifecycle hooks
//!
//! # Example
//!
//! ```no_run
//! use release_monorepo::release::{LifecycleStep, MonorepoPlugin, ReleaseState, handler};
//! use serde_json::{Value, json};
//!
//! # fn main() -> release_monorepo::core::error::MonorepoResult<()> {
//! let plugin = MonorepoPlugin::new("packages/api")?;
//! let analyze = plugin.wrap(
//!   LifecycleStep::AnalyzeCommits,
//!   handler(|_config: &Value, state: ReleaseState| Ok(json!(state.commits.len()))),
//! );
//! let _count = analyze.call(&json!({}), ReleaseState::new(Vec::new()))?;
//! # Ok(())
//! # }
//! ```

pub mod plugin;
pub mod state;
pub mod tag;

pub use plugin::{Handler, Hook, LifecycleStep, Middleware, MonorepoPlugin, compose, handler};
pub use state::{Logger, NextRelease, ReleaseOptions, ReleaseState, TracingLogger};
pub use tag::{tag_for, tag_format, tag_prefix};
