//! Error types for cluster operations.

use castle_types::ConfigError;

/// Result type for cluster operations.
pub type ClusterResult<T> = Result<T, ClusterError>;

/// Errors that can occur when querying a cluster.
///
/// None of these are transient. They point at a defect upstream: the
/// engine calling into an empty cluster, or a misconfigured rule set.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
    /// Loss, enlargement, diversity and generalize need at least one record.
    #[error("{operation} called on a cluster with no records")]
    EmptyCluster { operation: &'static str },

    /// A sensitive attribute index is past the end of a stored record.
    #[error("sensitive attribute {attribute} is outside a record of arity {arity}")]
    AttributeOutOfRange { attribute: usize, arity: usize },

    /// The rule set failed validation.
    #[error("invalid rule set: {}", join(.0))]
    InvalidRules(Vec<ConfigError>),
}

fn join(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
