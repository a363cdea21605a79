//! Generalization dispatcher: materializes anonymized output records.

use castle_types::{AttributeRule, ConfigError, GeneralizationKind, Record, Value};

use crate::cluster::Cluster;
use crate::error::ClusterResult;

impl Cluster {
    /// Builds the generalized form of `record` from the current cluster state.
    ///
    /// The output has the same arity as `record`. Positions below
    /// `min(arity, rule count)` carry the generalized value when their kind
    /// applies to output, or the original value otherwise (`None`, the
    /// `*NoGeneralization` kinds, and misconfigured rules). Positions at or
    /// past the rule count are not generalized and come out as
    /// [`Value::Null`].
    ///
    /// # Errors
    ///
    /// [`ClusterError::EmptyCluster`](crate::ClusterError::EmptyCluster) if
    /// no record is stored.
    pub fn generalize(&self, record: &Record) -> ClusterResult<Record> {
        self.ensure_populated("generalize")?;
        let basis: Vec<&Record> = self.records.iter().collect();

        let output = record
            .values()
            .iter()
            .enumerate()
            .map(|(attribute, value)| match self.rules.get(attribute) {
                Some(rule) => self.generalized_value(attribute, rule, value, &basis),
                None => Value::Null,
            })
            .collect();
        Ok(output)
    }

    fn generalized_value(
        &self,
        attribute: usize,
        rule: &AttributeRule,
        original: &Value,
        basis: &[&Record],
    ) -> Value {
        if !rule.kind.applies_to_output() {
            if let GeneralizationKind::Unrecognized(name) = &rule.kind {
                self.report(ConfigError::UnrecognizedKind {
                    attribute,
                    name: name.to_string(),
                });
            }
            return original.clone();
        }

        let Some(family) = rule.kind.family() else {
            return original.clone();
        };
        match self.generalizer(family).evaluate(basis, attribute) {
            Ok(generalization) => {
                for warning in generalization.warnings {
                    self.report(warning);
                }
                generalization.value
            }
            Err(error) => {
                self.report(error);
                original.clone()
            }
        }
    }
}
