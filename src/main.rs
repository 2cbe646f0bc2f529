//! prefix-cache-tier: trace replay for the tiered prefix cache.
//!
//! Replays identifier-sequence traces against a [`PrefixCache`] and reports
//! hit/miss/eviction behavior plus final tier usage. Useful for sizing the
//! fast tier and inspecting the GDSF policy on real access logs.
//!
//! Trace format: one access per line, identifiers separated by whitespace;
//! blank lines and lines starting with `#` are skipped.

use std::fs;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info, warn};

use prefix_cache_tier::config::{CacheConfig, Cli};
use prefix_cache_tier::{AccessEvent, PrefixCache};

/// The built-in demo: two sequences sharing the D1 prefix, one that forces
/// an eviction, and a re-access that pulls the evicted path back in.
const DEMO_TRACE: &[&[&str]] = &[
    &["D1", "D2"],
    &["D1", "D3"],
    &["D4", "D5"],
    &["D1", "D2"],
];

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "prefix_cache_tier=debug"
    } else {
        "prefix_cache_tier=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_target(true)
        .init();

    info!("prefix-cache-tier v{}", env!("CARGO_PKG_VERSION"));

    let mut config = CacheConfig::load(&cli.config)?;
    if let Some(fast) = cli.fast_capacity {
        config.fast_capacity = fast;
    }
    if let Some(slow) = cli.slow_capacity {
        config.slow_capacity = slow;
    }
    config.validate()?;

    info!(
        fast_capacity = config.fast_capacity,
        slow_capacity = config.slow_capacity,
        default_node_size = config.default_node_size,
        default_node_cost = config.default_node_cost,
        node_budget = config.fast_tier_node_budget(),
        "Configuration loaded"
    );

    let sequences: Vec<Vec<String>> = match &cli.trace {
        Some(path) => {
            let data = fs::read_to_string(path)
                .with_context(|| format!("failed to read trace file {}", path.display()))?;
            data.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .map(|l| l.split_whitespace().map(str::to_string).collect())
                .collect()
        }
        None => {
            info!("No trace file given, replaying the built-in demo scenario");
            DEMO_TRACE
                .iter()
                .map(|seq| seq.iter().map(|s| s.to_string()).collect())
                .collect()
        }
    };

    let mut cache = PrefixCache::new(&config);

    for (step, sequence) in sequences.iter().enumerate() {
        debug!(step, ?sequence, "replaying access");
        match cache.access_sequence(sequence) {
            Ok(events) => {
                for event in &events {
                    match event {
                        AccessEvent::Hit { id, priority } => {
                            info!(step, id = %id, priority = *priority, "hit")
                        }
                        AccessEvent::Promoted { id, from, priority } => {
                            info!(step, id = %id, from = %from, priority = *priority, "promoted")
                        }
                        AccessEvent::Evicted { id, priority } => {
                            info!(step, id = %id, priority = *priority, "evicted")
                        }
                    }
                }
            }
            Err(err) => {
                warn!(step, ?sequence, %err, "access aborted");
            }
        }
    }

    let stats = cache.stats();
    info!(
        fast_usage = stats.fast_usage,
        slow_usage = stats.slow_usage,
        node_count = stats.node_count,
        hits = stats.hits,
        misses = stats.misses,
        evictions = stats.evictions,
        clock = cache.clock(),
        "Replay complete"
    );

    println!("{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}
