//! Ring construction parameters.

use serde::{Deserialize, Serialize};

use crate::assigner::RingAssigner;
use crate::error::RingError;
use crate::ring::Ring;

/// Default number of virtual nodes per node.
pub const DEFAULT_REPLICAS: u32 = 128;

/// Parameters for building a ring, typically the `[ring]` section of a
/// TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// Virtual nodes per node. Must be at least 1.
    pub replicas: u32,
    /// Initial node names, added in order.
    pub nodes: Vec<String>,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            replicas: DEFAULT_REPLICAS,
            nodes: Vec::new(),
        }
    }
}

impl RingConfig {
    /// Build a ring holding every configured node.
    pub fn build(&self) -> Result<Ring, RingError> {
        Ring::with_nodes(self.replicas, &self.nodes)
    }

    /// Build a lock-guarded ring holding every configured node.
    pub fn build_assigner(&self) -> Result<RingAssigner, RingError> {
        self.build().map(RingAssigner::from)
    }
}
