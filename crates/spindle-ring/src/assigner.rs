//! Shared, lock-guarded access to a [`Ring`].

use std::sync::RwLock;

use crate::error::RingError;
use crate::ring::{Ring, RingStats};

/// Thread-safe wrapper around a [`Ring`].
///
/// Lookups take a shared read lock and may run concurrently with each other.
/// `add_node` and `remove_node` take the write lock, so no reader ever sees a
/// node with only some of its virtual nodes in place. Every critical section
/// is pure in-memory work with no I/O.
#[derive(Debug)]
pub struct RingAssigner {
    ring: RwLock<Ring>,
}

impl RingAssigner {
    /// Create an empty assigner with `replicas` virtual nodes per node.
    pub fn new(replicas: u32) -> Result<Self, RingError> {
        Ok(Self::from(Ring::new(replicas)?))
    }

    /// Add a node to the ring.
    pub fn add_node(&self, name: &str) {
        self.ring.write().expect("ring lock poisoned").add_node(name);
    }

    /// Remove a node from the ring. Absent nodes are ignored.
    pub fn remove_node(&self, name: &str) {
        self.ring.write().expect("ring lock poisoned").remove_node(name);
    }

    /// Resolve a key to its owning node, or `None` if the ring is empty.
    pub fn resolve(&self, key: &str) -> Option<String> {
        self.ring
            .read()
            .expect("ring lock poisoned")
            .resolve(key)
            .map(str::to_string)
    }

    /// Up to `count` distinct nodes for a key, clockwise from its position.
    pub fn owners(&self, key: &str, count: usize) -> Vec<String> {
        self.ring
            .read()
            .expect("ring lock poisoned")
            .owners(key, count)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Distribution summary over a sample of keys.
    pub fn stats<I, K>(&self, keys: I) -> RingStats
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        self.ring.read().expect("ring lock poisoned").stats(keys)
    }

    /// Return a clone of the current ring.
    pub fn snapshot(&self) -> Ring {
        self.ring.read().expect("ring lock poisoned").clone()
    }

    /// Whether a node with this name is currently present.
    pub fn contains(&self, name: &str) -> bool {
        self.ring.read().expect("ring lock poisoned").contains(name)
    }

    /// Return the number of physical nodes in the ring.
    pub fn node_count(&self) -> usize {
        self.ring.read().expect("ring lock poisoned").node_count()
    }

    /// Whether the ring has no positions at all.
    pub fn is_empty(&self) -> bool {
        self.ring.read().expect("ring lock poisoned").is_empty()
    }
}

impl From<Ring> for RingAssigner {
    fn from(ring: Ring) -> Self {
        Self {
            ring: RwLock::new(ring),
        }
    }
}
