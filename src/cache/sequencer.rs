//! The access sequencer: the cache's only mutating entry point.
//!
//! A caller submits an ordered identifier sequence; the sequencer walks the
//! prefix tree from the root, creating nodes on first sight, refreshing GDSF
//! scores, and guaranteeing the accessed path ends up resident in the fast
//! tier. All tree growth, priority updates, and tier transitions happen as a
//! side effect of [`PrefixCache::access_sequence`].

use std::sync::{Arc, Mutex};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::cache::node::{NodeArena, NodeId, Tier, ROOT_ID};
use crate::cache::placement::{PlacementError, PlacementManager};
use crate::cache::ranker::PriorityRanker;
use crate::config::CacheConfig;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Placement(#[from] PlacementError),
}

/// One observable step of an access sequence.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AccessEvent {
    /// The node was already resident in the fast tier.
    Hit { id: String, priority: f64 },
    /// The node was Cold or Warm and has been promoted to the fast tier.
    Promoted {
        id: String,
        from: Tier,
        priority: f64,
    },
    /// A node was demoted to the slow tier to make room during a promotion.
    Evicted { id: String, priority: f64 },
}

/// Read-only snapshot for external monitoring collaborators.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub fast_usage: u64,
    pub fast_capacity: u64,
    pub slow_usage: u64,
    pub slow_capacity: u64,
    pub node_count: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Tiered prefix cache over ordered content-block identifier sequences.
pub struct PrefixCache {
    arena: NodeArena,
    ranker: PriorityRanker,
    placement: PlacementManager,
    default_node_size: u64,
    default_node_cost: f64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl PrefixCache {
    /// Create a cache whose root is already resident in the fast tier.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            arena: NodeArena::with_root(config.root_size, config.root_cost),
            ranker: PriorityRanker::new(),
            placement: PlacementManager::new(
                config.fast_capacity,
                config.slow_capacity,
                config.root_size,
            ),
            default_node_size: config.default_node_size,
            default_node_cost: config.default_node_cost,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Walk (and extend) the tree along `ids`, returning one `Hit` or
    /// `Promoted` event per identifier plus any `Evicted` events raised
    /// while making room.
    ///
    /// Identifiers are processed strictly in order with no rollback: if a
    /// promotion fails with [`CacheError`], state changes from earlier
    /// identifiers in the same call remain committed.
    pub fn access_sequence<S: AsRef<str>>(
        &mut self,
        ids: &[S],
    ) -> Result<Vec<AccessEvent>, CacheError> {
        let mut events = Vec::with_capacity(ids.len());
        let mut cursor = ROOT_ID;

        for id in ids {
            let id = id.as_ref();
            let node_id = self.arena.get_or_create_child(
                cursor,
                id,
                self.default_node_size,
                self.default_node_cost,
            );

            self.ranker.touch(self.arena.node_mut(node_id));
            let node = self.arena.node(node_id);

            if node.tier == Tier::Hot {
                self.hits += 1;
                debug!(id, priority = node.priority, "fast-tier hit");
                events.push(AccessEvent::Hit {
                    id: id.to_string(),
                    priority: node.priority,
                });
            } else {
                self.misses += 1;
                let from = node.tier;
                let priority = node.priority;
                debug!(id, %from, priority, "miss, promoting to fast tier");

                let evicted =
                    self.placement
                        .promote(&mut self.arena, &mut self.ranker, node_id)?;
                self.evictions += evicted.len() as u64;
                for eviction in evicted {
                    events.push(AccessEvent::Evicted {
                        id: eviction.id,
                        priority: eviction.priority,
                    });
                }
                events.push(AccessEvent::Promoted {
                    id: id.to_string(),
                    from,
                    priority,
                });
            }

            cursor = node_id;
        }

        Ok(events)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            fast_usage: self.placement.fast_usage(),
            fast_capacity: self.placement.fast_capacity(),
            slow_usage: self.placement.slow_usage(),
            slow_capacity: self.placement.slow_capacity(),
            node_count: self.arena.len(),
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }

    /// Current value of the GDSF aging clock.
    pub fn clock(&self) -> f64 {
        self.ranker.clock()
    }

    /// Borrow the node arena, for inspection by tests and tooling.
    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    /// Resolve a root-to-node path of identifiers to a node handle.
    pub fn lookup_path<S: AsRef<str>>(&self, ids: &[S]) -> Option<NodeId> {
        let mut cursor = ROOT_ID;
        for id in ids {
            cursor = *self.arena.node(cursor).children.get(id.as_ref())?;
        }
        Some(cursor)
    }
}

/// Thread-safe handle: one exclusive lock over the whole consistency domain
/// (tree, usage counters, clock), serializing `access_sequence` calls.
pub type SharedCache = Arc<Mutex<PrefixCache>>;

/// Create a new thread-safe cache handle.
pub fn new_shared_cache(config: &CacheConfig) -> SharedCache {
    Arc::new(Mutex::new(PrefixCache::new(config)))
}
