//! Consistent hashing ring for assigning keys to named nodes.
//!
//! This crate implements a consistent hash ring that maps arbitrary string
//! keys onto a dynamic set of nodes (cache servers, shards, workers). Adding
//! or removing a node only remaps the keys that fall between that node's
//! positions and their clockwise neighbours; every other key stays put.
//!
//! The ring uses virtual nodes (replicas): each node gets `R` positions on a
//! `u64` ring, determined by `blake3(len(name) ++ name ++ replica_index)`.
//! A key is owned by the first position found walking clockwise from
//! `blake3(key)`, wrapping around past the largest position.
//!
//! This crate provides:
//! - [`Ring`] — the single-owner ring (`&mut self` mutation).
//! - [`RingAssigner`] — a `Ring` behind a reader/writer lock for shared use.
//! - [`RingConfig`] — serde-friendly construction parameters.
//! - [`key_position`] / [`replica_position`] — the hashing scheme.

mod assigner;
mod config;
mod error;
mod hash;
mod ring;

pub use assigner::RingAssigner;
pub use config::{DEFAULT_REPLICAS, RingConfig};
pub use error::RingError;
pub use hash::{key_position, replica_position};
pub use ring::{Migration, Ring, RingStats};
