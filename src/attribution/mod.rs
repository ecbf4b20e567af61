//! Commit-to-package attribution engine
//!
//! - **path**: segment-prefix matching of changed files against a package
//! - **cache**: per-commit changed-file memo shared by every package
//! - **limiter**: bounded, order-preserving fan-out of history queries
//! - **filter**: `CommitFilter`, which ties the three together

pub mod cache;
pub mod filter;
pub mod limiter;
pub mod path;

pub use cache::AttributionCache;
pub use filter::CommitFilter;
pub use limiter::ConcurrencyLimiter;
pub use path::{PackagePath, is_descendant_or_self};
