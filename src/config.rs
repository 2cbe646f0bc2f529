//! Runtime configuration for prefix-cache-tier.
//!
//! Configuration can be loaded from a JSON file or constructed
//! programmatically. All tier-related knobs (capacities, default node
//! size/cost) live here.

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

/// Command-line arguments for the trace-replay binary.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "prefix-cache-tier",
    about = "Tiered prefix cache replay tool (GDSF eviction)"
)]
pub struct Cli {
    /// Path to configuration file (JSON).
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Trace file: one whitespace-separated identifier sequence per line.
    /// Without one, a built-in demo scenario is replayed.
    #[arg(short, long)]
    pub trace: Option<PathBuf>,

    /// Override the fast-tier capacity from the config file.
    #[arg(long)]
    pub fast_capacity: Option<u64>,

    /// Override the slow-tier capacity from the config file.
    #[arg(long)]
    pub slow_capacity: Option<u64>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Fast-tier capacity in capacity units. Hard bound, enforced before
    /// any promotion completes.
    pub fast_capacity: u64,

    /// Slow-tier capacity in capacity units. Accounted and reported, but
    /// the slow tier is never evicted from.
    pub slow_capacity: u64,

    /// Size charged for the root node (always resident in the fast tier).
    pub root_size: u64,

    /// Recomputation cost assigned to the root node.
    pub root_cost: f64,

    /// Size charged for each newly created node.
    pub default_node_size: u64,

    /// Recomputation cost assigned to each newly created node.
    pub default_node_cost: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            fast_capacity: 4096,
            slow_capacity: 65536,
            root_size: 10,
            root_cost: 1.0,
            default_node_size: 100,
            default_node_cost: 10.0,
        }
    }
}

impl CacheConfig {
    /// Load configuration from a JSON file, falling back to defaults when
    /// the file does not exist.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if path.exists() {
            let data = std::fs::read_to_string(path)?;
            let config: CacheConfig = serde_json::from_str(&data)?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            Ok(CacheConfig::default())
        }
    }

    /// Reject configurations the cache cannot start from.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.fast_capacity >= self.root_size,
            "fast_capacity ({}) must cover the root node size ({})",
            self.fast_capacity,
            self.root_size
        );
        anyhow::ensure!(self.default_node_size > 0, "default_node_size must be > 0");
        anyhow::ensure!(self.root_size > 0, "root_size must be > 0");
        Ok(())
    }

    /// How many default-sized nodes fit in the fast tier next to the root.
    pub fn fast_tier_node_budget(&self) -> u64 {
        self.fast_capacity.saturating_sub(self.root_size) / self.default_node_size
    }
}
