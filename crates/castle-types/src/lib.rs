//! # castle-types: Core types for the CASTLE anonymization cluster
//!
//! This crate contains the shared types used across the workspace:
//! - Attribute values and records ([`Value`], [`Record`])
//! - Per-attribute generalization rules ([`GeneralizationKind`], [`Family`],
//!   [`AttributeRule`], [`RuleSet`], [`NumericDomain`])
//! - Categorical generalization trees ([`Hierarchy`], [`HierarchyNode`])
//! - Configuration errors ([`ConfigError`])

use std::{
    fmt::{self, Display},
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

mod error;
mod hierarchy;
mod rule;

pub use error::ConfigError;
pub use hierarchy::{Hierarchy, HierarchyNode, NodeId};
pub use rule::{
    AttributeRule, Family, GeneralizationKind, NumericDomain, RuleSet, UnrecognizedName,
};

// ============================================================================
// Value - Clone (Text contains String)
// ============================================================================

/// A single typed attribute value.
///
/// `Interval` only appears in generalized output; raw records carry the
/// other variants. Floats compare and hash by bit pattern (with `-0.0`
/// folded onto `0.0`), which gives values total equality so they can key
/// hash maps when counting sensitive values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing value.
    #[default]
    Null,
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// UTF-8 text.
    Text(String),
    /// Closed numeric range produced by aggregation.
    Interval { lower: f64, upper: f64 },
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Returns the numeric value of `Int` and `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            // Precision loss above 2^53 is acceptable for cost estimates
            #[allow(clippy::cast_precision_loss)]
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

#[allow(clippy::float_cmp)]
fn float_bits(v: f64) -> u64 {
    // -0.0 == 0.0, so both map to the positive zero pattern
    if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => float_bits(*a) == float_bits(*b),
            (Value::Text(a), Value::Text(b)) => a == b,
            (
                Value::Interval { lower: l1, upper: u1 },
                Value::Interval { lower: l2, upper: u2 },
            ) => float_bits(*l1) == float_bits(*l2) && float_bits(*u1) == float_bits(*u2),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Int(v) => v.hash(state),
            Value::Float(v) => float_bits(*v).hash(state),
            Value::Text(s) => s.hash(state),
            Value::Interval { lower, upper } => {
                float_bits(*lower).hash(state);
                float_bits(*upper).hash(state);
            }
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Interval { lower, upper } => write!(f, "[{lower}-{upper}]"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

// ============================================================================
// Record - Clone (owned values, never mutated after construction)
// ============================================================================

/// An ordered, fixed-arity tuple of attribute values.
///
/// Fields are addressed by position. There are no mutating accessors;
/// generalization always produces a fresh record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Vec<Value>);

impl Record {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// Number of fields in this record.
    pub fn arity(&self) -> usize {
        self.0.len()
    }

    /// Returns the value at `position`, if the record is wide enough.
    pub fn get(&self, position: usize) -> Option<&Value> {
        self.0.get(position)
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, ")")
    }
}

impl From<Vec<Value>> for Record {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl From<Record> for Vec<Value> {
    fn from(record: Record) -> Self {
        record.0
    }
}

impl FromIterator<Value> for Record {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
