//! Group Module
//!
//! Named cache namespaces and the registry that makes them discoverable.
//!
//! A lookup goes through three stages:
//! 1. Local shard hit - returned as is
//! 2. Remote owner - fetched over HTTP, not cached locally
//! 3. Local load - the [`Getter`] is called and the result cached

mod getter;
#[allow(clippy::module_inception)]
mod group;
mod registry;
mod stats;

pub use getter::Getter;
pub use group::Group;
pub use registry::GroupRegistry;
pub use stats::{GroupStats, LoadStats};
