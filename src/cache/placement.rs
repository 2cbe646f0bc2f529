//! Tiered placement: capacity accounting, promotion, and eviction.
//!
//! The placement manager owns the fast/slow usage counters and keeps the
//! fast tier within its capacity. Promotion evicts lowest-priority Hot
//! leaves (per the ranker's order) until the incoming node fits, or fails
//! with [`PlacementError::OutOfCapacity`].

use thiserror::Error;
use tracing::debug;

use crate::cache::node::{NodeArena, NodeId, Tier, ROOT_ID};
use crate::cache::ranker::{PriorityRanker, VictimCandidate};

#[derive(Debug, Error)]
pub enum PlacementError {
    #[error(
        "out of fast-tier capacity: node '{id}' needs {needed} units but only {free} of {capacity} are reclaimable"
    )]
    OutOfCapacity {
        id: String,
        needed: u64,
        free: u64,
        capacity: u64,
    },
}

/// One completed eviction, reported up to the access sequencer.
#[derive(Debug, Clone)]
pub struct Eviction {
    pub node_id: NodeId,
    pub id: String,
    pub priority: f64,
}

/// Enforces per-tier capacity and drives promotion/eviction.
#[derive(Debug)]
pub struct PlacementManager {
    fast_capacity: u64,
    slow_capacity: u64,
    fast_usage: u64,
    slow_usage: u64,
}

impl PlacementManager {
    /// `root_size` is accounted against the fast tier from the start since
    /// the root is born Hot.
    pub fn new(fast_capacity: u64, slow_capacity: u64, root_size: u64) -> Self {
        Self {
            fast_capacity,
            slow_capacity,
            fast_usage: root_size,
            slow_usage: 0,
        }
    }

    pub fn fast_capacity(&self) -> u64 {
        self.fast_capacity
    }

    pub fn slow_capacity(&self) -> u64 {
        self.slow_capacity
    }

    pub fn fast_usage(&self) -> u64 {
        self.fast_usage
    }

    pub fn slow_usage(&self) -> u64 {
        self.slow_usage
    }

    /// Move a non-Hot node into the fast tier, evicting Hot leaves until it
    /// fits. Returns the evictions performed, in order.
    ///
    /// Fails without touching the node's tier if no further eviction can
    /// free enough space; evictions already performed stay in effect.
    pub fn promote(
        &mut self,
        arena: &mut NodeArena,
        ranker: &mut PriorityRanker,
        node_id: NodeId,
    ) -> Result<Vec<Eviction>, PlacementError> {
        let needed = arena.node(node_id).size;
        debug_assert_ne!(arena.node(node_id).tier, Tier::Hot);

        let mut evictions = Vec::new();
        while self.fast_capacity.saturating_sub(self.fast_usage) < needed {
            let victim = match self.select_victim(arena) {
                Some(v) => v,
                None => {
                    return Err(PlacementError::OutOfCapacity {
                        id: arena.node(node_id).id.clone(),
                        needed,
                        free: self.fast_capacity.saturating_sub(self.fast_usage),
                        capacity: self.fast_capacity,
                    });
                }
            };
            evictions.push(self.evict(arena, ranker, victim));
        }

        let node = arena.node_mut(node_id);
        if node.tier == Tier::Warm {
            self.slow_usage -= node.size;
        }
        node.tier = Tier::Hot;
        self.fast_usage += needed;

        debug!(
            id = %arena.node(node_id).id,
            fast_usage = self.fast_usage,
            fast_capacity = self.fast_capacity,
            "promoted node to fast tier"
        );
        debug_assert!(self.verify_accounting(arena));
        Ok(evictions)
    }

    /// Lowest-priority eviction candidate: a non-root Hot node with no Hot
    /// child. Evicting only leaves keeps every Hot node's ancestors Hot.
    pub fn select_victim(&self, arena: &NodeArena) -> Option<NodeId> {
        arena
            .ids()
            .filter(|&id| id != ROOT_ID)
            .filter(|&id| arena.node(id).tier == Tier::Hot)
            .filter(|&id| arena.is_hot_leaf(id))
            .map(|id| VictimCandidate::for_node(id, arena.node(id)))
            .min()
            .map(|c| c.node_id)
    }

    /// Demote a Hot node to the slow tier, advancing the aging clock to its
    /// priority. Never fails; the slow tier is accounted but not bounded.
    fn evict(
        &mut self,
        arena: &mut NodeArena,
        ranker: &mut PriorityRanker,
        victim: NodeId,
    ) -> Eviction {
        let node = arena.node_mut(victim);
        debug_assert_eq!(node.tier, Tier::Hot);

        ranker.advance_clock(node.priority);
        node.tier = Tier::Warm;
        self.fast_usage -= node.size;
        self.slow_usage += node.size;

        let eviction = Eviction {
            node_id: victim,
            id: node.id.clone(),
            priority: node.priority,
        };
        debug!(
            id = %eviction.id,
            priority = eviction.priority,
            clock = ranker.clock(),
            fast_usage = self.fast_usage,
            slow_usage = self.slow_usage,
            "evicted node to slow tier"
        );
        eviction
    }

    /// Recompute usage from the arena and compare with the counters. Used in
    /// debug assertions and tests; divergence is a programming error.
    pub fn verify_accounting(&self, arena: &NodeArena) -> bool {
        arena.tier_bytes(Tier::Hot) == self.fast_usage
            && arena.tier_bytes(Tier::Warm) == self.slow_usage
            && self.fast_usage <= self.fast_capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(fast: u64) -> (NodeArena, PriorityRanker, PlacementManager) {
        let arena = NodeArena::with_root(10, 1.0);
        let ranker = PriorityRanker::new();
        let placement = PlacementManager::new(fast, 1000, 10);
        (arena, ranker, placement)
    }

    #[test]
    fn test_promote_without_pressure() {
        let (mut arena, mut ranker, mut placement) = setup(500);
        let a = arena.get_or_create_child(ROOT_ID, "A", 100, 10.0);
        ranker.touch(arena.node_mut(a));

        let evictions = placement.promote(&mut arena, &mut ranker, a).unwrap();
        assert!(evictions.is_empty());
        assert_eq!(arena.node(a).tier, Tier::Hot);
        assert_eq!(placement.fast_usage(), 110);
        assert!(placement.verify_accounting(&arena));
    }

    #[test]
    fn test_promote_evicts_lowest_priority_leaf() {
        let (mut arena, mut ranker, mut placement) = setup(215);
        let a = arena.get_or_create_child(ROOT_ID, "A", 100, 10.0);
        let b = arena.get_or_create_child(ROOT_ID, "B", 100, 10.0);
        ranker.touch(arena.node_mut(a));
        ranker.touch(arena.node_mut(a)); // A accessed twice → higher priority
        ranker.touch(arena.node_mut(b));
        placement.promote(&mut arena, &mut ranker, a).unwrap();
        placement.promote(&mut arena, &mut ranker, b).unwrap();

        let c = arena.get_or_create_child(ROOT_ID, "C", 100, 10.0);
        ranker.touch(arena.node_mut(c));
        let evictions = placement.promote(&mut arena, &mut ranker, c).unwrap();

        assert_eq!(evictions.len(), 1);
        assert_eq!(evictions[0].node_id, b);
        assert_eq!(arena.node(b).tier, Tier::Warm);
        assert_eq!(arena.node(a).tier, Tier::Hot);
        assert_eq!(placement.slow_usage(), 100);
        assert!(placement.verify_accounting(&arena));
    }

    #[test]
    fn test_interior_hot_node_is_not_a_candidate() {
        let (mut arena, mut ranker, mut placement) = setup(500);
        let a = arena.get_or_create_child(ROOT_ID, "A", 100, 10.0);
        let b = arena.get_or_create_child(a, "B", 100, 10.0);
        ranker.touch(arena.node_mut(a));
        placement.promote(&mut arena, &mut ranker, a).unwrap();
        ranker.touch(arena.node_mut(b));
        placement.promote(&mut arena, &mut ranker, b).unwrap();

        // A's child B is Hot, so only B is eligible even though A scores lower.
        arena.node_mut(a).priority = 0.0;
        assert_eq!(placement.select_victim(&arena), Some(b));
    }

    #[test]
    fn test_promote_oversized_node_fails() {
        let (mut arena, mut ranker, mut placement) = setup(215);
        let big = arena.get_or_create_child(ROOT_ID, "BIG", 500, 10.0);
        ranker.touch(arena.node_mut(big));

        let err = placement.promote(&mut arena, &mut ranker, big).unwrap_err();
        assert!(matches!(err, PlacementError::OutOfCapacity { needed: 500, .. }));
        // The node stays out of the fast tier.
        assert_eq!(arena.node(big).tier, Tier::Cold);
        assert!(placement.verify_accounting(&arena));
    }

    #[test]
    fn test_promote_evicts_until_node_fits() {
        let (mut arena, mut ranker, mut placement) = setup(115);
        let a = arena.get_or_create_child(ROOT_ID, "A", 50, 10.0);
        let b = arena.get_or_create_child(ROOT_ID, "B", 50, 10.0);
        ranker.touch(arena.node_mut(a));
        placement.promote(&mut arena, &mut ranker, a).unwrap();
        ranker.touch(arena.node_mut(b));
        placement.promote(&mut arena, &mut ranker, b).unwrap();
        assert_eq!(placement.fast_usage(), 110);

        // A 100-unit node displaces both 50-unit leaves.
        let c = arena.get_or_create_child(ROOT_ID, "C", 100, 10.0);
        ranker.touch(arena.node_mut(c));
        let evictions = placement.promote(&mut arena, &mut ranker, c).unwrap();

        assert_eq!(evictions.len(), 2);
        assert_eq!(evictions[0].node_id, a);
        assert_eq!(evictions[1].node_id, b);
        assert_eq!(placement.fast_usage(), 110);
        assert_eq!(placement.slow_usage(), 100);
        assert!(placement.verify_accounting(&arena));
    }

    #[test]
    fn test_root_is_never_selected() {
        let (arena, _ranker, placement) = setup(215);
        assert_eq!(placement.select_victim(&arena), None);
    }

    #[test]
    fn test_eviction_advances_clock() {
        let (mut arena, mut ranker, mut placement) = setup(110);
        let a = arena.get_or_create_child(ROOT_ID, "A", 100, 10.0);
        ranker.touch(arena.node_mut(a));
        placement.promote(&mut arena, &mut ranker, a).unwrap();

        let b = arena.get_or_create_child(ROOT_ID, "B", 100, 10.0);
        ranker.touch(arena.node_mut(b));
        placement.promote(&mut arena, &mut ranker, b).unwrap();

        assert!((ranker.clock() - 0.1).abs() < 1e-12);
    }
}
