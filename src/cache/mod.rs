//! Tiered prefix-cache management.
//!
//! This module contains the core cache data structures and algorithms:
//! - [`node`]: Tier, Node, and the arena-backed prefix tree
//! - [`ranker`]: GDSF priority scoring and the aging clock
//! - [`placement`]: Per-tier capacity enforcement, promotion, eviction
//! - [`sequencer`]: The public `PrefixCache` entry point and event stream

pub mod node;
pub mod placement;
pub mod ranker;
pub mod sequencer;
