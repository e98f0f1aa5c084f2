//! TOML configuration for the `spindle` CLI.
//!
//! ```toml
//! [ring]
//! replicas = 128
//! nodes = ["cache-a", "cache-b", "cache-c"]
//!
//! [log]
//! level = "info"
//! ```

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use spindle_ring::RingConfig;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Ring parameters and initial membership.
    pub ring: RingConfig,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl CliConfig {
    /// Load config from a TOML file, or use defaults if no path given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("failed to read {}", p.display()))?;
                let config: CliConfig = toml::from_str(&content)
                    .with_context(|| format!("failed to parse {}", p.display()))?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line overrides on top of the file contents.
    ///
    /// Nodes given on the command line replace the configured list rather
    /// than extending it.
    pub fn apply_overrides(&mut self, replicas: Option<u32>, nodes: Vec<String>) {
        if let Some(r) = replicas {
            self.ring.replicas = r;
        }
        if !nodes.is_empty() {
            self.ring.nodes = nodes;
        }
    }

    /// Parse config from a TOML string (used in tests).
    #[cfg(test)]
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }
}
