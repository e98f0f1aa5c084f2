//! Consistent hashing ring implementation.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::RingError;
use crate::hash::{key_position, replica_position};

/// A key whose owning node differs between two ring states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// The key that must move.
    pub key: String,
    /// The node that owns it in the old ring.
    pub from: String,
    /// The node that owns it in the new ring.
    pub to: String,
}

/// Summary of how a sample of keys spreads over the ring.
#[derive(Debug, Clone, PartialEq)]
pub struct RingStats {
    /// Number of physical nodes.
    pub node_count: usize,
    /// Number of occupied positions on the ring.
    pub vnode_count: usize,
    /// Positions inserted per node.
    pub replicas: u32,
    /// Number of keys in the sample.
    pub sampled_keys: usize,
    /// Smallest fraction of the sample owned by any single node.
    pub min_fraction: f64,
    /// Largest fraction of the sample owned by any single node.
    pub max_fraction: f64,
}

/// Consistent hashing ring mapping keys to named nodes.
///
/// Each node is mapped to `replicas` virtual nodes on a u64 ring. A key is
/// owned by the node at the smallest position greater than or equal to the
/// key's own position, wrapping around to the smallest position overall.
///
/// Two virtual nodes landing on the same position is not an error: the later
/// insertion takes the position over and a warning is logged.
#[derive(Debug, Clone)]
pub struct Ring {
    /// Virtual node positions: ring position -> node name.
    vnodes: BTreeMap<u64, Arc<str>>,
    /// Names of the nodes currently added.
    nodes: BTreeSet<Arc<str>>,
    /// Virtual nodes inserted per node.
    replicas: u32,
}

impl Ring {
    /// Create a new empty ring with `replicas` virtual nodes per node.
    ///
    /// Fails with [`RingError::InvalidConfig`] when `replicas` is zero.
    pub fn new(replicas: u32) -> Result<Self, RingError> {
        if replicas == 0 {
            return Err(RingError::InvalidConfig(
                "replica count must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            vnodes: BTreeMap::new(),
            nodes: BTreeSet::new(),
            replicas,
        })
    }

    /// Create a ring and add every node in `names`.
    pub fn with_nodes<I, S>(replicas: u32, names: I) -> Result<Self, RingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ring = Self::new(replicas)?;
        for name in names {
            ring.add_node(name.as_ref());
        }
        Ok(ring)
    }

    /// Add a node to the ring.
    ///
    /// Inserts `replicas` positions derived from the node name. Adding a node
    /// that is already present re-inserts the same positions and changes
    /// nothing.
    pub fn add_node(&mut self, name: &str) {
        let node = match self.nodes.get(name) {
            Some(existing) => Arc::clone(existing),
            None => Arc::from(name),
        };

        for i in 0..self.replicas {
            self.place(replica_position(name, i), Arc::clone(&node));
        }

        self.nodes.insert(node);
        debug!(node = name, replicas = self.replicas, "added node to ring");
    }

    /// Remove a node from the ring.
    ///
    /// Removing a node that was never added, or removing it twice, is a
    /// no-op. Positions that a colliding node has since taken over stay with
    /// that node.
    pub fn remove_node(&mut self, name: &str) {
        if !self.nodes.remove(name) {
            return;
        }

        for i in 0..self.replicas {
            let pos = replica_position(name, i);
            if self.vnodes.get(&pos).is_some_and(|owner| **owner == *name) {
                self.vnodes.remove(&pos);
            }
        }
        debug!(node = name, "removed node from ring");
    }

    /// Resolve a key to the node that owns it.
    ///
    /// Returns `None` only when the ring is empty.
    pub fn resolve(&self, key: &str) -> Option<&str> {
        let pos = key_position(key);

        // BTreeMap::range gives the clockwise successor; fall back to the
        // first position when the key hashes past the end of the ring.
        self.vnodes
            .range(pos..)
            .next()
            .or_else(|| self.vnodes.iter().next())
            .map(|(_, node)| node.as_ref())
    }

    /// Determine up to `count` distinct nodes for a key.
    ///
    /// Walks clockwise from the key's position on the ring, collecting
    /// distinct node names. The first entry is always [`Ring::resolve`]'s
    /// answer. If fewer distinct nodes exist than `count`, returns all of
    /// them.
    pub fn owners(&self, key: &str, count: usize) -> Vec<&str> {
        if self.vnodes.is_empty() || count == 0 {
            return Vec::new();
        }

        let pos = key_position(key);
        let max_distinct = count.min(self.nodes.len());
        let mut owners: Vec<&str> = Vec::with_capacity(max_distinct);

        let after = self.vnodes.range(pos..);
        let before = self.vnodes.range(..pos);

        for (_, node) in after.chain(before) {
            if !owners.contains(&node.as_ref()) {
                owners.push(node.as_ref());
                if owners.len() == max_distinct {
                    break;
                }
            }
        }

        owners
    }

    /// Compute which keys change owner between two ring states.
    ///
    /// Keys that do not resolve in one of the rings (because it is empty)
    /// produce no migration.
    pub fn diff<I, K>(old: &Ring, new: &Ring, keys: I) -> Vec<Migration>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut migrations = Vec::new();

        for key in keys {
            let key = key.as_ref();
            if let (Some(from), Some(to)) = (old.resolve(key), new.resolve(key)) {
                if from != to {
                    migrations.push(Migration {
                        key: key.to_string(),
                        from: from.to_string(),
                        to: to.to_string(),
                    });
                }
            }
        }

        migrations
    }

    /// Count how many of `keys` each node owns.
    ///
    /// Every present node appears in the result, including those that own
    /// none of the sampled keys.
    pub fn load<I, K>(&self, keys: I) -> BTreeMap<String, usize>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut counts: BTreeMap<String, usize> =
            self.nodes.iter().map(|n| (n.to_string(), 0)).collect();

        for key in keys {
            if let Some(node) = self.resolve(key.as_ref()) {
                *counts.entry(node.to_string()).or_insert(0) += 1;
            }
        }

        counts
    }

    /// Summarize how evenly a sample of keys spreads across the nodes.
    pub fn stats<I, K>(&self, keys: I) -> RingStats
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let counts = self.load(keys);
        let sampled_keys: usize = counts.values().sum();

        let (min_fraction, max_fraction) = if sampled_keys == 0 {
            (0.0, 0.0)
        } else {
            let total = sampled_keys as f64;
            let min = counts.values().copied().min().unwrap_or(0);
            let max = counts.values().copied().max().unwrap_or(0);
            (min as f64 / total, max as f64 / total)
        };

        RingStats {
            node_count: self.node_count(),
            vnode_count: self.vnode_count(),
            replicas: self.replicas,
            sampled_keys,
            min_fraction,
            max_fraction,
        }
    }

    /// Return the number of virtual nodes inserted per node.
    pub fn replicas(&self) -> u32 {
        self.replicas
    }

    /// Return the number of physical nodes in the ring.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Return the total number of occupied positions in the ring.
    pub fn vnode_count(&self) -> usize {
        self.vnodes.len()
    }

    /// Whether the ring has no positions at all.
    pub fn is_empty(&self) -> bool {
        self.vnodes.is_empty()
    }

    /// Whether a node with this name is currently present.
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains(name)
    }

    /// Return all node names in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.as_ref())
    }

    /// Return every `(position, node)` pair in ascending position order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &str)> {
        self.vnodes.iter().map(|(pos, node)| (*pos, node.as_ref()))
    }

    /// Return the positions currently held by `name`, ascending.
    pub fn positions_of(&self, name: &str) -> Vec<u64> {
        if !self.contains(name) {
            return Vec::new();
        }

        let mut positions: Vec<u64> = (0..self.replicas)
            .map(|i| replica_position(name, i))
            .filter(|pos| self.vnodes.get(pos).is_some_and(|owner| **owner == *name))
            .collect();
        positions.sort_unstable();
        positions.dedup();
        positions
    }

    /// Insert a single position, overwriting whatever occupied it.
    fn place(&mut self, pos: u64, node: Arc<str>) {
        if let Some(previous) = self.vnodes.insert(pos, Arc::clone(&node)) {
            if previous != node {
                warn!(
                    position = pos,
                    evicted = %previous,
                    node = %node,
                    "ring position collision, overwriting occupant"
                );
            }
        }
    }
}
