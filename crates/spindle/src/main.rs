//! `spindle` — inspect consistent hashing rings from the command line.
//!
//! Builds a ring from a TOML config file and/or command-line flags, then
//! answers questions about it.
//!
//! # Usage
//!
//! ```text
//! spindle -c ring.toml resolve key1 key67890        # owning node per key
//! spindle --node a --node b owners key1 -n 2         # clockwise owners
//! spindle -c ring.toml diff --remove cache-b         # what moves if cache-b leaves
//! spindle -c ring.toml diff --add cache-d key1 key2  # per-key migrations
//! spindle -r 64 --node a --node b stats -s 100000    # load distribution
//! ```

mod config;
mod telemetry;

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use spindle_ring::Ring;
use tracing::{debug, info};

use config::CliConfig;

/// Default number of synthetic keys for `diff` and `stats`.
const DEFAULT_SAMPLE: usize = 10_000;

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "spindle",
    version,
    about = "Inspect consistent hashing ring placement"
)]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the number of virtual nodes per node.
    #[arg(short, long, global = true)]
    replicas: Option<u32>,

    /// Node to place on the ring. Can be specified multiple times; replaces
    /// the nodes listed in the config file.
    #[arg(long = "node", global = true)]
    nodes: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the node owning each key.
    Resolve {
        /// Keys to resolve.
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Print up to N distinct nodes for a key, walking clockwise.
    Owners {
        /// Key to look up.
        key: String,

        /// Number of distinct nodes to collect.
        #[arg(short = 'n', long, default_value = "3")]
        count: usize,
    },

    /// Show which keys move when nodes join or leave.
    Diff {
        /// Node joining the ring. Can be specified multiple times.
        #[arg(long)]
        add: Vec<String>,

        /// Node leaving the ring. Can be specified multiple times.
        #[arg(long)]
        remove: Vec<String>,

        /// Number of synthetic keys to sample when no keys are given.
        #[arg(short, long, default_value_t = DEFAULT_SAMPLE)]
        sample: usize,

        /// Explicit keys to check (printed individually).
        keys: Vec<String>,
    },

    /// Show how a sample of synthetic keys spreads across the nodes.
    Stats {
        /// Number of synthetic keys to sample.
        #[arg(short, long, default_value_t = DEFAULT_SAMPLE)]
        sample: usize,
    },
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;

    telemetry::init(&config.log.level);

    // CLI args override config file values.
    config.apply_overrides(cli.replicas, cli.nodes);

    let ring = config.ring.build().context("failed to build ring")?;
    info!(
        nodes = ring.node_count(),
        replicas = ring.replicas(),
        "ring built"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Resolve { keys } => cmd_resolve(&ring, &keys, &mut out),
        Commands::Owners { key, count } => cmd_owners(&ring, &key, count, &mut out),
        Commands::Diff {
            add,
            remove,
            sample,
            keys,
        } => cmd_diff(&ring, &add, &remove, sample, &keys, &mut out),
        Commands::Stats { sample } => cmd_stats(&ring, sample, &mut out),
    }
}

/// Synthetic keys `key-0 .. key-{n-1}` used for sampling.
fn sample_keys(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("key-{i}")).collect()
}

// -----------------------------------------------------------------------
// spindle resolve / owners
// -----------------------------------------------------------------------

fn cmd_resolve(ring: &Ring, keys: &[String], out: &mut impl Write) -> Result<()> {
    for key in keys {
        match ring.resolve(key) {
            Some(node) => writeln!(out, "{key}\t{node}")?,
            None => writeln!(out, "{key}\t<no node>")?,
        }
    }
    Ok(())
}

fn cmd_owners(ring: &Ring, key: &str, count: usize, out: &mut impl Write) -> Result<()> {
    let owners = ring.owners(key, count);
    if owners.is_empty() {
        writeln!(out, "{key}: <no node>")?;
        return Ok(());
    }

    writeln!(out, "{key}:")?;
    for (rank, node) in owners.iter().enumerate() {
        writeln!(out, "  {}. {node}", rank + 1)?;
    }
    Ok(())
}

// -----------------------------------------------------------------------
// spindle diff
// -----------------------------------------------------------------------

fn cmd_diff(
    ring: &Ring,
    add: &[String],
    remove: &[String],
    sample: usize,
    keys: &[String],
    out: &mut impl Write,
) -> Result<()> {
    let mut next = ring.clone();
    for name in remove {
        next.remove_node(name);
    }
    for name in add {
        next.add_node(name);
    }
    debug!(
        before = ring.node_count(),
        after = next.node_count(),
        "computed new ring"
    );

    let explicit = !keys.is_empty();
    let keys = if explicit {
        keys.to_vec()
    } else {
        sample_keys(sample)
    };

    let migrations = Ring::diff(ring, &next, &keys);

    if explicit {
        for m in &migrations {
            writeln!(out, "{}\t{} -> {}", m.key, m.from, m.to)?;
        }
    } else {
        let mut flows: BTreeMap<(&str, &str), usize> = BTreeMap::new();
        for m in &migrations {
            *flows.entry((m.from.as_str(), m.to.as_str())).or_insert(0) += 1;
        }
        for ((from, to), count) in &flows {
            writeln!(out, "{from} -> {to}: {count}")?;
        }
    }

    let total = keys.len();
    let moved = migrations.len();
    let pct = if total == 0 {
        0.0
    } else {
        moved as f64 * 100.0 / total as f64
    };
    writeln!(out, "moved {moved} of {total} keys ({pct:.1}%)")?;
    Ok(())
}

// -----------------------------------------------------------------------
// spindle stats
// -----------------------------------------------------------------------

fn cmd_stats(ring: &Ring, sample: usize, out: &mut impl Write) -> Result<()> {
    let keys = sample_keys(sample);
    let stats = ring.stats(&keys);

    writeln!(out, "Ring")?;
    writeln!(out, "  nodes:    {}", stats.node_count)?;
    writeln!(out, "  vnodes:   {}", stats.vnode_count)?;
    writeln!(out, "  replicas: {}", stats.replicas)?;
    writeln!(out, "  sampled:  {}", stats.sampled_keys)?;

    if stats.sampled_keys == 0 {
        writeln!(out, "  (ring is empty)")?;
        return Ok(());
    }

    writeln!(out)?;
    let total = stats.sampled_keys as f64;
    for (node, count) in ring.load(&keys) {
        writeln!(
            out,
            "  {node}: {count} ({:.1}%)",
            count as f64 * 100.0 / total
        )?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "  min share: {:.1}%  max share: {:.1}%",
        stats.min_fraction * 100.0,
        stats.max_fraction * 100.0
    )?;
    Ok(())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
