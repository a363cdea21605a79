//! Per-attribute generalization rules.
//!
//! A [`RuleSet`] holds one [`AttributeRule`] per attribute position. The
//! rule's [`GeneralizationKind`] decides which generalizer family costs the
//! attribute, and whether the generalized value replaces the original in
//! output records.

use std::fmt::{self, Display};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::hierarchy::Hierarchy;

// ============================================================================
// Generalization Families
// ============================================================================

/// The three generalizer families a cluster owns one instance of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Family {
    /// Numeric range generalization.
    Aggregation,
    /// Suppression of trailing characters.
    Reduction,
    /// Categorical generalization along a hierarchy.
    Hierarchy,
}

impl Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::Aggregation => write!(f, "aggregation"),
            Family::Reduction => write!(f, "reduction"),
            Family::Hierarchy => write!(f, "hierarchy"),
        }
    }
}

// ============================================================================
// Generalization Kind
// ============================================================================

/// How an attribute is costed and rendered.
///
/// The `*NoGeneralization` kinds are costed exactly like their base kind,
/// but the original value is passed through to output records.
///
/// Kinds are (de)serialized by name. Names nobody recognizes are kept as
/// [`GeneralizationKind::Unrecognized`] so the defect can be reported
/// instead of failing the whole rule set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GeneralizationKind {
    None,
    Reduction,
    ReductionNoGeneralization,
    Aggregation,
    AggregationNoGeneralization,
    NonNumerical,
    NonNumericalNoGeneralization,
    /// Only [`GeneralizationKind::parse`] builds this, so the name never
    /// collides with a recognized one.
    Unrecognized(UnrecognizedName),
}

/// A kind name [`GeneralizationKind::parse`] did not recognize.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnrecognizedName(String);

impl UnrecognizedName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UnrecognizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl GeneralizationKind {
    /// Parses a kind name.
    ///
    /// Accepts the canonical snake-case names (`aggregation_no_generalization`)
    /// and the upper-case rule names (`AGGREGATION_WITHOUT_GENERALIZATION`).
    pub fn parse(name: &str) -> Self {
        match name {
            "none" | "NONE" => Self::None,
            "reduction" | "REDUCTION" => Self::Reduction,
            "reduction_no_generalization" | "REDUCTION_WITHOUT_GENERALIZATION" => {
                Self::ReductionNoGeneralization
            }
            "aggregation" | "AGGREGATION" => Self::Aggregation,
            "aggregation_no_generalization" | "AGGREGATION_WITHOUT_GENERALIZATION" => {
                Self::AggregationNoGeneralization
            }
            "non_numerical" | "NONNUMERICAL" => Self::NonNumerical,
            "non_numerical_no_generalization" | "NONNUMERICAL_WITHOUT_GENERALIZATION" => {
                Self::NonNumericalNoGeneralization
            }
            _ => Self::Unrecognized(UnrecognizedName(name.to_string())),
        }
    }

    /// Canonical name of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "none",
            Self::Reduction => "reduction",
            Self::ReductionNoGeneralization => "reduction_no_generalization",
            Self::Aggregation => "aggregation",
            Self::AggregationNoGeneralization => "aggregation_no_generalization",
            Self::NonNumerical => "non_numerical",
            Self::NonNumericalNoGeneralization => "non_numerical_no_generalization",
            Self::Unrecognized(name) => name.as_str(),
        }
    }

    /// The family that costs this kind. `None` for `None` and unrecognized kinds.
    pub fn family(&self) -> Option<Family> {
        match self {
            Self::Reduction | Self::ReductionNoGeneralization => Some(Family::Reduction),
            Self::Aggregation | Self::AggregationNoGeneralization => Some(Family::Aggregation),
            Self::NonNumerical | Self::NonNumericalNoGeneralization => Some(Family::Hierarchy),
            Self::None | Self::Unrecognized(_) => None,
        }
    }

    /// Whether output records carry the generalized value at this position.
    pub fn applies_to_output(&self) -> bool {
        matches!(self, Self::Reduction | Self::Aggregation | Self::NonNumerical)
    }

    /// The passthrough flavour of this kind. Other kinds map to themselves.
    pub fn without_generalization(self) -> Self {
        match self {
            Self::Reduction => Self::ReductionNoGeneralization,
            Self::Aggregation => Self::AggregationNoGeneralization,
            Self::NonNumerical => Self::NonNumericalNoGeneralization,
            other => other,
        }
    }
}

impl Display for GeneralizationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for GeneralizationKind {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl From<String> for GeneralizationKind {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl From<GeneralizationKind> for String {
    fn from(kind: GeneralizationKind) -> Self {
        match kind {
            GeneralizationKind::Unrecognized(name) => name.0,
            other => other.as_str().to_string(),
        }
    }
}

// ============================================================================
// Numeric Domain - Copy
// ============================================================================

/// Full value range of a numeric attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericDomain {
    pub lower: f64,
    pub upper: f64,
}

impl NumericDomain {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn is_valid(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite() && self.lower <= self.upper
    }
}

// ============================================================================
// Attribute Rule
// ============================================================================

/// Static configuration for one attribute position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeRule {
    pub kind: GeneralizationKind,
    /// Normalization range for aggregation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<NumericDomain>,
    /// Generalization tree for non-numerical attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchy: Option<Arc<Hierarchy>>,
}

impl AttributeRule {
    pub fn new(kind: GeneralizationKind) -> Self {
        Self {
            kind,
            domain: None,
            hierarchy: None,
        }
    }

    /// An attribute that is neither costed nor generalized.
    pub fn none() -> Self {
        Self::new(GeneralizationKind::None)
    }

    pub fn reduction() -> Self {
        Self::new(GeneralizationKind::Reduction)
    }

    pub fn aggregation(domain: NumericDomain) -> Self {
        Self::new(GeneralizationKind::Aggregation).with_domain(domain)
    }

    pub fn non_numerical(hierarchy: impl Into<Arc<Hierarchy>>) -> Self {
        Self::new(GeneralizationKind::NonNumerical).with_hierarchy(hierarchy)
    }

    pub fn with_domain(mut self, domain: NumericDomain) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn with_hierarchy(mut self, hierarchy: impl Into<Arc<Hierarchy>>) -> Self {
        self.hierarchy = Some(hierarchy.into());
        self
    }

    /// Keeps the cost model but passes original values through to output.
    pub fn without_generalization(mut self) -> Self {
        self.kind = self.kind.without_generalization();
        self
    }

    /// Checks that the rule carries what its family needs.
    pub fn validate(&self, attribute: usize) -> Result<(), ConfigError> {
        if let GeneralizationKind::Unrecognized(name) = &self.kind {
            return Err(ConfigError::UnrecognizedKind {
                attribute,
                name: name.to_string(),
            });
        }
        match self.kind.family() {
            Some(Family::Aggregation) => match self.domain {
                None => Err(ConfigError::MissingDomain { attribute }),
                Some(d) if !d.is_valid() => Err(ConfigError::InvalidDomain {
                    attribute,
                    lower: d.lower,
                    upper: d.upper,
                }),
                Some(_) => Ok(()),
            },
            Some(Family::Hierarchy) if self.hierarchy.is_none() => {
                Err(ConfigError::MissingHierarchy { attribute })
            }
            _ => Ok(()),
        }
    }
}

// ============================================================================
// Rule Set
// ============================================================================

/// Ordered rules, one per attribute position considered by a cluster.
///
/// The length is fixed once a cluster is built from it and decides how
/// many positions take part in every loss and generalize computation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<AttributeRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<AttributeRule>) -> Self {
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, attribute: usize) -> Option<&AttributeRule> {
        self.rules.get(attribute)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeRule> {
        self.rules.iter()
    }

    /// Attribute positions whose rule belongs to `family`.
    pub fn attributes_of(&self, family: Family) -> impl Iterator<Item = (usize, &AttributeRule)> {
        self.rules
            .iter()
            .enumerate()
            .filter(move |(_, rule)| rule.kind.family() == Some(family))
    }

    /// Collects every configuration defect instead of stopping at the first.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let errors: Vec<ConfigError> = self
            .rules
            .iter()
            .enumerate()
            .filter_map(|(i, rule)| rule.validate(i).err())
            .collect();

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl FromIterator<AttributeRule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = AttributeRule>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl From<Vec<AttributeRule>> for RuleSet {
    fn from(rules: Vec<AttributeRule>) -> Self {
        Self::new(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source_and_canonical_names() {
        assert_eq!(
            GeneralizationKind::parse("AGGREGATION_WITHOUT_GENERALIZATION"),
            GeneralizationKind::AggregationNoGeneralization
        );
        assert_eq!(
            GeneralizationKind::parse("non_numerical_no_generalization"),
            GeneralizationKind::NonNumericalNoGeneralization
        );
        assert_eq!(GeneralizationKind::parse("NONNUMERICAL"), GeneralizationKind::NonNumerical);
        assert_eq!(GeneralizationKind::parse("NONE"), GeneralizationKind::None);

        let kind = GeneralizationKind::parse("BUCKETIZE");
        assert!(matches!(&kind, GeneralizationKind::Unrecognized(name) if name.as_str() == "BUCKETIZE"));
        assert_eq!(kind.family(), None);
    }

    #[test]
    fn test_parse_is_exact() {
        for name in ["Aggregation", "non-numerical", "reduction without generalization", "None"] {
            assert!(
                matches!(GeneralizationKind::parse(name), GeneralizationKind::Unrecognized(_)),
                "{name} should not be recognized"
            );
        }
    }

    #[test]
    fn test_unrecognized_name_survives_string_roundtrip() {
        let kind = GeneralizationKind::parse("Reduction");
        let name: String = kind.clone().into();
        assert_eq!(name, "Reduction");
        assert_eq!(GeneralizationKind::from(name), kind);
    }

    #[test]
    fn test_no_generalization_shares_family() {
        for kind in [
            GeneralizationKind::Reduction,
            GeneralizationKind::Aggregation,
            GeneralizationKind::NonNumerical,
        ] {
            let family = kind.family();
            let passthrough = kind.clone().without_generalization();
            assert!(kind.applies_to_output());
            assert!(!passthrough.applies_to_output());
            assert_eq!(passthrough.family(), family);
        }
        assert_eq!(GeneralizationKind::None.family(), None);
    }

    #[test]
    fn test_validate_reports_every_defect() {
        let rules = RuleSet::new(vec![
            AttributeRule::none(),
            AttributeRule::new(GeneralizationKind::Aggregation),
            AttributeRule::new(GeneralizationKind::NonNumericalNoGeneralization),
            AttributeRule::new("shuffle".into()),
            AttributeRule::reduction(),
        ]);

        let errors = rules.validate().unwrap_err();
        assert_eq!(
            errors,
            vec![
                ConfigError::MissingDomain { attribute: 1 },
                ConfigError::MissingHierarchy { attribute: 2 },
                ConfigError::UnrecognizedKind {
                    attribute: 3,
                    name: "shuffle".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_validate_rejects_inverted_domain() {
        let rule = AttributeRule::new(GeneralizationKind::Aggregation).with_domain(NumericDomain {
            lower: 10.0,
            upper: 1.0,
        });
        assert!(matches!(
            rule.validate(0),
            Err(ConfigError::InvalidDomain { attribute: 0, .. })
        ));
    }

    #[test]
    fn test_nan_domain_is_reported_not_rejected() {
        let domain = NumericDomain::new(f64::NAN, 1.0);
        assert!(!domain.is_valid());

        let rules = RuleSet::new(vec![AttributeRule::aggregation(domain)]);
        let errors = rules.validate().unwrap_err();
        assert!(matches!(
            errors.as_slice(),
            [ConfigError::InvalidDomain { attribute: 0, upper, .. }] if *upper == 1.0
        ));
    }
}
