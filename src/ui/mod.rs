//! Terminal output helpers

pub mod progress;

pub use progress::CommitProgress;
