//! Numeric range generalization.

use std::collections::BTreeMap;

use castle_types::{ConfigError, Family, NumericDomain, Record, RuleSet, Value};

use crate::{Generalization, Generalizer};

/// Closed range of observed numeric values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn point(v: f64) -> Self {
        Self { min: v, max: v }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    #[must_use]
    pub fn widen(self, v: f64) -> Self {
        Self {
            min: self.min.min(v),
            max: self.max.max(v),
        }
    }
}

fn widen(bounds: Option<Bounds>, v: f64) -> Option<Bounds> {
    Some(bounds.map_or_else(|| Bounds::point(v), |b| b.widen(v)))
}

fn numeric_at(record: &Record, attribute: usize) -> Option<f64> {
    record
        .get(attribute)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
}

#[derive(Debug, Clone, PartialEq)]
struct NumericAttribute {
    domain: Option<NumericDomain>,
    bounds: Option<Bounds>,
}

/// Generalizes numeric attributes to the range spanned by their values.
///
/// Bounds accumulate over every observed record and never shrink. Values
/// that are not numeric (or not finite) are ignored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregationGeneralizer {
    attributes: BTreeMap<usize, NumericAttribute>,
}

impl AggregationGeneralizer {
    /// Takes every aggregation-family attribute of `rules`.
    pub fn new(rules: &RuleSet) -> Self {
        let attributes = rules
            .attributes_of(Family::Aggregation)
            .map(|(i, rule)| {
                (
                    i,
                    NumericAttribute {
                        domain: rule.domain,
                        bounds: None,
                    },
                )
            })
            .collect();
        Self { attributes }
    }

    /// Accumulated bounds of `attribute`, if any value was observed.
    pub fn bounds(&self, attribute: usize) -> Option<Bounds> {
        self.attributes.get(&attribute).and_then(|a| a.bounds)
    }
}

impl Generalizer for AggregationGeneralizer {
    fn family(&self) -> Family {
        Family::Aggregation
    }

    fn observe(&mut self, record: &Record) {
        for (&i, attribute) in &mut self.attributes {
            if let Some(v) = numeric_at(record, i) {
                attribute.bounds = widen(attribute.bounds, v);
            }
        }
    }

    fn evaluate(&self, records: &[&Record], attribute: usize) -> Result<Generalization, ConfigError> {
        let state = self.attributes.get(&attribute).ok_or(ConfigError::NotConfigured {
            attribute,
            family: Family::Aggregation,
        })?;
        let domain = state.domain.ok_or(ConfigError::MissingDomain { attribute })?;
        if !domain.is_valid() {
            return Err(ConfigError::InvalidDomain {
                attribute,
                lower: domain.lower,
                upper: domain.upper,
            });
        }

        let bounds = records
            .iter()
            .filter_map(|r| numeric_at(r, attribute))
            .fold(state.bounds, widen);

        let Some(bounds) = bounds else {
            return Ok(Generalization::empty());
        };

        let loss = if domain.width() > 0.0 {
            bounds.width() / domain.width()
        } else {
            0.0
        };

        Ok(Generalization::new(
            Value::Interval {
                lower: bounds.min,
                upper: bounds.max,
            },
            loss,
        ))
    }
}

#[cfg(test)]
mod tests {
    use castle_types::AttributeRule;

    use super::*;

    fn record(values: &[i64]) -> Record {
        values.iter().map(|&v| Value::Int(v)).collect()
    }

    fn two_numeric_attributes() -> AggregationGeneralizer {
        AggregationGeneralizer::new(&RuleSet::new(vec![
            AttributeRule::aggregation(NumericDomain::new(0.0, 100.0)),
            AttributeRule::aggregation(NumericDomain::new(0.0, 10.0)).without_generalization(),
        ]))
    }

    #[test]
    fn test_bounds_track_each_attribute() {
        let mut agg = two_numeric_attributes();
        agg.observe(&record(&[20, 5]));
        agg.observe(&record(&[50, 2]));

        assert_eq!(agg.bounds(0), Some(Bounds { min: 20.0, max: 50.0 }));
        assert_eq!(agg.bounds(1), Some(Bounds { min: 2.0, max: 5.0 }));

        let g = agg.evaluate(&[], 1).unwrap();
        assert!((g.loss - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_does_not_widen_state() {
        let mut agg = two_numeric_attributes();
        agg.observe(&record(&[20, 5]));
        let before = agg.clone();

        let outlier = record(&[90, 9]);
        let g = agg.evaluate(&[&outlier], 0).unwrap();
        assert_eq!(g.value, Value::Interval { lower: 20.0, upper: 90.0 });
        assert_eq!(agg, before);
    }

    #[test]
    fn test_non_numeric_values_ignored() {
        let mut agg = two_numeric_attributes();
        agg.observe(&Record::new(vec![Value::text("n/a"), Value::Float(f64::NAN)]));
        assert_eq!(agg.bounds(0), None);
        assert_eq!(agg.evaluate(&[], 0).unwrap(), Generalization::empty());
    }

    #[test]
    fn test_missing_domain_is_config_error() {
        let agg = AggregationGeneralizer::new(&RuleSet::new(vec![AttributeRule::new(
            castle_types::GeneralizationKind::Aggregation,
        )]));
        assert_eq!(
            agg.evaluate(&[], 0),
            Err(ConfigError::MissingDomain { attribute: 0 })
        );
        assert_eq!(
            agg.evaluate(&[], 3),
            Err(ConfigError::NotConfigured {
                attribute: 3,
                family: Family::Aggregation
            })
        );
    }
}
