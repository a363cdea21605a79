//! # castle-generalize: Generalization capabilities for CASTLE clusters
//!
//! A cluster owns exactly one generalizer per [`Family`]. Every generalizer
//! exposes two strictly separated operations:
//!
//! - [`Generalizer::observe`]: folds an admitted record into the
//!   generalizer's incremental state (numeric bounds, hierarchy coverage).
//!   Only the cluster's add path calls this.
//! - [`Generalizer::evaluate`]: a pure evaluation over the incremental state
//!   combined with an explicit record set. It takes `&self`, so "what-if"
//!   queries cannot perturb the state.
//!
//! | Generalizer | Family | Output | Loss |
//! |-------------|--------|--------|------|
//! | [`AggregationGeneralizer`] | aggregation | `[min-max]` interval | range width / domain width |
//! | [`ReductionGeneralizer`] | reduction | common prefix + `*` | masked chars / longest value |
//! | [`HierarchyGeneralizer`] | hierarchy | lowest common ancestor | covered leaves / all leaves |
//!
//! ## Usage
//!
//! ```
//! use castle_generalize::{AggregationGeneralizer, Generalizer};
//! use castle_types::{AttributeRule, NumericDomain, Record, RuleSet, Value};
//!
//! let rules = RuleSet::new(vec![AttributeRule::aggregation(NumericDomain::new(0.0, 100.0))]);
//! let mut ages = AggregationGeneralizer::new(&rules);
//!
//! ages.observe(&Record::new(vec![Value::Int(30)]));
//! ages.observe(&Record::new(vec![Value::Int(40)]));
//!
//! let current = ages.evaluate(&[], 0).unwrap();
//! assert_eq!(current.value, Value::Interval { lower: 30.0, upper: 40.0 });
//! assert!((current.loss - 0.1).abs() < 1e-12);
//!
//! // What-if: admitting a 60 year old would triple the range
//! let candidate = Record::new(vec![Value::Int(60)]);
//! let what_if = ages.evaluate(&[&candidate], 0).unwrap();
//! assert!((what_if.loss - 0.3).abs() < 1e-12);
//! ```

use std::fmt::Debug;

use castle_types::{ConfigError, Family, Record, Value};

mod aggregation;
mod hierarchy;
mod reduction;

#[cfg(test)]
mod tests;

pub use aggregation::{AggregationGeneralizer, Bounds};
pub use hierarchy::HierarchyGeneralizer;
pub use reduction::ReductionGeneralizer;

/// Result of generalizing one attribute over a set of records.
#[derive(Debug, Clone, PartialEq)]
pub struct Generalization {
    /// The common representation replacing every record's value.
    pub value: Value,
    /// Normalized information loss, nominally in `[0, 1]`.
    pub loss: f64,
    /// Defects met while generalizing that did not prevent a result.
    pub warnings: Vec<ConfigError>,
}

impl Generalization {
    pub fn new(value: Value, loss: f64) -> Self {
        Self {
            value,
            loss,
            warnings: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = ConfigError>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    /// Nothing to generalize: no value, no loss.
    pub fn empty() -> Self {
        Self::new(Value::Null, 0.0)
    }
}

/// A generalization capability owned by a single cluster.
///
/// Implementations decide which attributes they are responsible for from
/// the rule set they were built with; asking about any other attribute is
/// a [`ConfigError::NotConfigured`].
pub trait Generalizer: Debug {
    fn family(&self) -> Family;

    /// Folds an admitted record into the incremental state.
    ///
    /// Never called on removal: state only ever grows.
    fn observe(&mut self, record: &Record);

    /// Generalizes `attribute` over the incremental state plus `records`.
    ///
    /// Pure. The same state and records always produce the same result.
    /// Defects that still allow a result come back in
    /// [`Generalization::warnings`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the attribute's rule lacks what this
    /// family needs (domain, hierarchy) or is not handled by this family.
    fn evaluate(&self, records: &[&Record], attribute: usize) -> Result<Generalization, ConfigError>;
}

/// Ratio of two counts as a loss value.
// Counts are far below 2^52, so the conversion is exact
#[allow(clippy::cast_precision_loss)]
pub(crate) fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 { 0.0 } else { part as f64 / whole as f64 }
}
