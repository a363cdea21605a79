//! Configuration errors for attribute rules.

use crate::rule::Family;

/// A defect in the rule set a cluster was configured with.
///
/// These never abort an evaluation on their own: the cluster treats the
/// affected attribute as zero-cost passthrough and reports the error.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The rule names a generalization kind nobody recognizes.
    #[error("attribute {attribute}: unrecognized generalization kind {name:?}")]
    UnrecognizedKind { attribute: usize, name: String },

    /// Aggregation needs the numeric domain to normalize against.
    #[error("attribute {attribute}: aggregation rule has no numeric domain")]
    MissingDomain { attribute: usize },

    /// Domain bounds are inverted or not finite.
    #[error("attribute {attribute}: invalid numeric domain [{lower}, {upper}]")]
    InvalidDomain {
        attribute: usize,
        lower: f64,
        upper: f64,
    },

    /// Non-numerical generalization needs a hierarchy.
    #[error("attribute {attribute}: non-numerical rule has no hierarchy")]
    MissingHierarchy { attribute: usize },

    /// Two hierarchy nodes share a label.
    #[error("hierarchy label {0:?} appears more than once")]
    DuplicateHierarchyLabel(String),

    /// A categorical value is missing from the attribute's hierarchy. It is
    /// still costed, covered by the root.
    #[error("attribute {attribute}: value {label:?} is not in the hierarchy, generalized to the root")]
    UnknownHierarchyValue { attribute: usize, label: String },

    /// A generalizer was asked about an attribute it holds no rule for.
    #[error("attribute {attribute} is not configured for {family} generalization")]
    NotConfigured { attribute: usize, family: Family },
}
