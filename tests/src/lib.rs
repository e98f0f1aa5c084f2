//! Shared helpers for spindle integration tests.
//!
//! Provides key samples and [`Snapshot`], a record of which node owned each
//! key at some point in time, so tests can compare assignments before and
//! after a membership change.

use spindle_ring::{Ring, RingAssigner};

/// Synthetic keys `key-0 .. key-{n-1}`.
pub fn sample_keys(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("key-{i}")).collect()
}

/// Node names `server1 .. server{n}`.
pub fn servers(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("server{i}")).collect()
}

/// Owner of every key in a fixed key set at one moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    entries: Vec<(String, Option<String>)>,
}

impl Snapshot {
    /// Record the owner of each key in `ring`.
    pub fn of(ring: &Ring, keys: &[String]) -> Self {
        let entries = keys
            .iter()
            .map(|k| (k.clone(), ring.resolve(k).map(str::to_string)))
            .collect();
        Self { entries }
    }

    /// Record the owner of each key through a shared assigner.
    pub fn of_assigner(assigner: &RingAssigner, keys: &[String]) -> Self {
        let entries = keys
            .iter()
            .map(|k| (k.clone(), assigner.resolve(k)))
            .collect();
        Self { entries }
    }

    /// Owner recorded for `key`, if the key is part of the snapshot.
    pub fn owner(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, owner)| owner.as_deref())
    }

    /// Iterate `(key, owner)` pairs in the order the keys were given.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(k, owner)| (k.as_str(), owner.as_deref()))
    }

    /// Keys whose owner differs between `self` and `later`, with both owners.
    ///
    /// Both snapshots must cover the same keys in the same order.
    pub fn changes<'a>(
        &'a self,
        later: &'a Snapshot,
    ) -> Vec<(&'a str, Option<&'a str>, Option<&'a str>)> {
        assert_eq!(self.entries.len(), later.entries.len(), "key sets differ");
        self.iter()
            .zip(later.iter())
            .filter(|((_, before), (_, after))| before != after)
            .map(|((key, before), (_, after))| (key, before, after))
            .collect()
    }

    /// Number of keys owned by `node`.
    pub fn count_for(&self, node: &str) -> usize {
        self.iter().filter(|(_, owner)| *owner == Some(node)).count()
    }
}
