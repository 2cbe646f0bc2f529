//! GDSF priority scoring and the aging clock.
//!
//! Greedy-Dual-Size-Frequency assigns each node
//! `priority = L + frequency * (cost / size)`, where `L` is a logical clock
//! raised to the victim's priority on every eviction. Frequently reused,
//! expensive-to-recompute, small nodes score high; the clock ages out nodes
//! whose score was earned long ago.

use crate::cache::node::{Node, NodeId};

/// An eviction candidate with the fields that define the victim order.
#[derive(Debug, Clone, Copy)]
pub struct VictimCandidate {
    pub node_id: NodeId,
    pub priority: f64,
    pub frequency: u64,
}

// Lower = evicted first: priority, then frequency, then creation order
// (node ids are creation-ordered, so the order is total and deterministic).
impl PartialEq for VictimCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for VictimCandidate {}

impl PartialOrd for VictimCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VictimCandidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority
            .partial_cmp(&other.priority)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| self.frequency.cmp(&other.frequency))
            .then_with(|| self.node_id.cmp(&other.node_id))
    }
}

impl VictimCandidate {
    pub fn for_node(node_id: NodeId, node: &Node) -> Self {
        Self {
            node_id,
            priority: node.priority,
            frequency: node.frequency,
        }
    }
}

/// Maintains the aging clock `L` and refreshes per-node scores.
#[derive(Debug, Default)]
pub struct PriorityRanker {
    clock: f64,
}

impl PriorityRanker {
    pub fn new() -> Self {
        Self { clock: 0.0 }
    }

    /// Current value of the aging clock `L`. Monotonically non-decreasing.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Record one access: bump frequency and recompute the GDSF score using
    /// the current clock. Invoked on hits as well as misses, so a hit
    /// refreshes a node's score against the aged clock.
    pub fn touch(&self, node: &mut Node) {
        node.frequency += 1;
        node.priority = self.clock + node.frequency as f64 * (node.cost / node.size as f64);
    }

    /// GDSF aging step, applied when a victim is evicted: surviving nodes
    /// with scores below the victim's are no longer cheaper purely by
    /// staleness.
    pub fn advance_clock(&mut self, victim_priority: f64) {
        self.clock = self.clock.max(victim_priority);
    }
}
