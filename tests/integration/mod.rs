//! Integration tests against real git repositories

mod helpers;
mod test_attribution;
mod test_plugin;
