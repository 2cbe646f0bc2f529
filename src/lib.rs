//! prefix-cache-tier: tiered prefix cache with GDSF eviction.
//!
//! Caches ordered sequences of reusable content-block identifiers (document
//! spans, retrieval chunks) as paths in a prefix tree, so sequences sharing
//! a prefix reuse the same cached nodes. Each node is resident in a bounded
//! fast tier or a slower tier; a Greedy-Dual-Size-Frequency policy with an
//! aging clock decides which fast-tier leaves to demote under capacity
//! pressure.
//!
//! ```
//! use prefix_cache_tier::cache::sequencer::PrefixCache;
//! use prefix_cache_tier::config::CacheConfig;
//!
//! let mut cache = PrefixCache::new(&CacheConfig::default());
//! let events = cache.access_sequence(&["doc-1", "doc-2"]).unwrap();
//! assert_eq!(events.len(), 2);
//! ```

pub mod cache;
pub mod config;

pub use cache::node::{NodeId, Tier};
pub use cache::placement::PlacementError;
pub use cache::sequencer::{
    new_shared_cache, AccessEvent, CacheError, CacheStats, PrefixCache, SharedCache,
};
pub use config::CacheConfig;
