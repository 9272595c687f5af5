// Cache module for local filesystem snapshots.
// Stores provider responses so repeated bar refreshes stay off the network.

pub mod paths;
pub mod store;

pub use store::{CacheEntry, DEFAULT_FRESHNESS, Lookup, SnapshotCache, Source};
