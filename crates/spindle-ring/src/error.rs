//! Error types for ring construction.

/// Errors produced when building a [`Ring`](crate::Ring).
///
/// Lookups and membership changes never fail: an empty ring resolves to
/// `None`, and duplicate adds or absent removes are no-ops.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RingError {
    /// The ring was configured with unusable parameters.
    #[error("invalid ring config: {0}")]
    InvalidConfig(String),
}
