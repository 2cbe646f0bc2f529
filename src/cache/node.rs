//! Prefix-tree nodes and the arena that owns them.
//!
//! A node represents one prefix position: the path from the root to a node
//! spells out an identifier sequence that has been accessed before. Nodes are
//! the unit of tier movement — they are promoted and evicted as whole units.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Identifies which storage tier a node's content currently resides in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Never materialized in any bounded tier.
    Cold,
    /// Resident in the slower, larger tier.
    Warm,
    /// Resident in the bounded fast tier.
    Hot,
}

impl Tier {
    /// Returns the numeric tier level (lower = faster).
    pub fn level(&self) -> u8 {
        match self {
            Tier::Hot => 0,
            Tier::Warm => 1,
            Tier::Cold => 2,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Hot => write!(f, "HOT"),
            Tier::Warm => write!(f, "WARM"),
            Tier::Cold => write!(f, "COLD"),
        }
    }
}

/// Stable handle to a node in the arena.
///
/// Handles are arena indices. Nodes are never removed, so a `NodeId` stays
/// valid for the lifetime of the cache and doubles as a creation sequence
/// number (lower id = created earlier).
pub type NodeId = usize;

/// The arena index of the distinguished root node.
pub const ROOT_ID: NodeId = 0;

/// A single prefix-tree node.
#[derive(Debug)]
pub struct Node {
    /// Identifier of the content block at this position.
    /// Unique among siblings, not globally.
    pub id: String,

    /// Owning parent; `None` only for the root.
    pub parent: Option<NodeId>,

    /// Child identifier → child handle.
    pub children: HashMap<String, NodeId>,

    /// Capacity units consumed while resident in a tier.
    pub size: u64,

    /// Relative cost of recomputing this node's content after eviction.
    pub cost: f64,

    /// Number of accesses observed at this node.
    pub frequency: u64,

    /// Current GDSF score; recomputed on every access.
    pub priority: f64,

    /// Current residency.
    pub tier: Tier,
}

impl Node {
    fn new(id: String, parent: Option<NodeId>, size: u64, cost: f64) -> Self {
        Self {
            id,
            parent,
            children: HashMap::new(),
            size,
            cost,
            frequency: 0,
            priority: 0.0,
            tier: Tier::Cold,
        }
    }
}

/// Owns every node in the tree behind stable handles.
///
/// Using an arena instead of owning references lets the eviction scan walk
/// the whole tree while the access sequencer holds a cursor into it.
#[derive(Debug)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    /// Create an arena holding only the root node, already marked Hot.
    pub fn with_root(root_size: u64, root_cost: f64) -> Self {
        let mut root = Node::new("ROOT".to_string(), None, root_size, root_cost);
        root.tier = Tier::Hot;
        Self { nodes: vec![root] }
    }

    /// Borrow a node. Panics on a stale handle, which cannot occur in correct
    /// use since nodes are never removed.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Mutably borrow a node. Same panic contract as [`Self::node`].
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    /// Return the existing child of `parent` named `id`, or insert a new Cold
    /// node with the given default size/cost and return its handle.
    ///
    /// No effect on priority or tier placement; those belong to the ranker
    /// and the placement manager.
    pub fn get_or_create_child(
        &mut self,
        parent: NodeId,
        id: &str,
        default_size: u64,
        default_cost: f64,
    ) -> NodeId {
        if let Some(&child) = self.nodes[parent].children.get(id) {
            return child;
        }
        let child = self.nodes.len();
        self.nodes
            .push(Node::new(id.to_string(), Some(parent), default_size, default_cost));
        self.nodes[parent].children.insert(id.to_string(), child);
        child
    }

    /// Whether the node has no child resident in the fast tier.
    ///
    /// Eviction candidates must satisfy this: evicting an interior Hot node
    /// would orphan its Hot descendants from the tier accounting.
    pub fn is_hot_leaf(&self, id: NodeId) -> bool {
        self.nodes[id]
            .children
            .values()
            .all(|&c| self.nodes[c].tier != Tier::Hot)
    }

    /// Handles of every node, in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        0..self.nodes.len()
    }

    /// Total number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// The arena always holds at least the root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Sum of `size` over all nodes currently in `tier`.
    pub fn tier_bytes(&self, tier: Tier) -> u64 {
        self.nodes
            .iter()
            .filter(|n| n.tier == tier)
            .map(|n| n.size)
            .sum()
    }

    /// Reconstruct the root-to-node identifier path.
    pub fn path_of(&self, id: NodeId) -> Vec<String> {
        let mut path = Vec::new();
        let mut cursor = Some(id);
        while let Some(n) = cursor {
            path.push(self.nodes[n].id.clone());
            cursor = self.nodes[n].parent;
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering() {
        assert_eq!(Tier::Hot.level(), 0);
        assert_eq!(Tier::Warm.level(), 1);
        assert_eq!(Tier::Cold.level(), 2);
    }

    #[test]
    fn test_root_starts_hot() {
        let arena = NodeArena::with_root(10, 1.0);
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.node(ROOT_ID).tier, Tier::Hot);
        assert!(arena.node(ROOT_ID).parent.is_none());
    }

    #[test]
    fn test_get_or_create_child_is_idempotent() {
        let mut arena = NodeArena::with_root(10, 1.0);
        let a = arena.get_or_create_child(ROOT_ID, "A", 100, 10.0);
        let a_again = arena.get_or_create_child(ROOT_ID, "A", 100, 10.0);
        assert_eq!(a, a_again);
        assert_eq!(arena.len(), 2);

        let node = arena.node(a);
        assert_eq!(node.tier, Tier::Cold);
        assert_eq!(node.frequency, 0);
        assert_eq!(node.size, 100);
        assert_eq!(node.parent, Some(ROOT_ID));
    }

    #[test]
    fn test_sibling_ids_are_scoped_to_parent() {
        let mut arena = NodeArena::with_root(10, 1.0);
        let a = arena.get_or_create_child(ROOT_ID, "A", 100, 10.0);
        let b_under_root = arena.get_or_create_child(ROOT_ID, "B", 100, 10.0);
        let b_under_a = arena.get_or_create_child(a, "B", 100, 10.0);
        assert_ne!(b_under_root, b_under_a);
        assert_eq!(arena.len(), 4);
    }

    #[test]
    fn test_hot_leaf_detection() {
        let mut arena = NodeArena::with_root(10, 1.0);
        let a = arena.get_or_create_child(ROOT_ID, "A", 100, 10.0);
        let b = arena.get_or_create_child(a, "B", 100, 10.0);
        arena.node_mut(a).tier = Tier::Hot;
        arena.node_mut(b).tier = Tier::Hot;

        // A has a Hot child, so only B is a Hot leaf.
        assert!(!arena.is_hot_leaf(a));
        assert!(arena.is_hot_leaf(b));

        arena.node_mut(b).tier = Tier::Warm;
        assert!(arena.is_hot_leaf(a));
    }

    #[test]
    fn test_path_reconstruction() {
        let mut arena = NodeArena::with_root(10, 1.0);
        let a = arena.get_or_create_child(ROOT_ID, "A", 100, 10.0);
        let b = arena.get_or_create_child(a, "B", 100, 10.0);
        assert_eq!(arena.path_of(b), vec!["ROOT", "A", "B"]);
        assert_eq!(arena.path_of(ROOT_ID), vec!["ROOT"]);
    }
}
