//! Categorical generalization along a value hierarchy.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use castle_types::{ConfigError, Family, Hierarchy, NodeId, Record, RuleSet, Value};

use crate::{Generalization, Generalizer, ratio};

#[derive(Debug, Clone, PartialEq)]
struct CategoricalAttribute {
    hierarchy: Option<Arc<Hierarchy>>,
    /// Lowest node covering every observed value.
    covering: Option<NodeId>,
}

impl CategoricalAttribute {
    /// Widens `covering` so it also covers the value at `attribute`.
    ///
    /// Values missing from the tree can only be covered by the root; their
    /// labels are collected into `unknown`.
    fn cover(
        &self,
        covering: Option<NodeId>,
        record: &Record,
        attribute: usize,
        unknown: &mut BTreeSet<String>,
    ) -> Option<NodeId> {
        let Some(hierarchy) = &self.hierarchy else {
            return covering;
        };
        let value = match record.get(attribute) {
            None | Some(Value::Null) => return covering,
            Some(value) => value,
        };
        let node = match value {
            Value::Text(label) => hierarchy.node(label),
            other => hierarchy.node(&other.to_string()),
        };
        let node = node.unwrap_or_else(|| {
            unknown.insert(value.to_string());
            hierarchy.root()
        });
        Some(covering.map_or(node, |c| hierarchy.lowest_common_ancestor(c, node)))
    }
}

/// Generalizes categorical values to their lowest common ancestor.
///
/// The covering node only moves up the tree as records are observed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HierarchyGeneralizer {
    attributes: BTreeMap<usize, CategoricalAttribute>,
}

impl HierarchyGeneralizer {
    /// Takes every hierarchy-family attribute of `rules`.
    pub fn new(rules: &RuleSet) -> Self {
        let attributes = rules
            .attributes_of(Family::Hierarchy)
            .map(|(i, rule)| {
                (
                    i,
                    CategoricalAttribute {
                        hierarchy: rule.hierarchy.clone(),
                        covering: None,
                    },
                )
            })
            .collect();
        Self { attributes }
    }

    /// Label of the node currently covering `attribute`.
    pub fn covering(&self, attribute: usize) -> Option<&str> {
        let state = self.attributes.get(&attribute)?;
        let hierarchy = state.hierarchy.as_ref()?;
        state.covering.map(|node| hierarchy.label(node))
    }
}

impl Generalizer for HierarchyGeneralizer {
    fn family(&self) -> Family {
        Family::Hierarchy
    }

    fn observe(&mut self, record: &Record) {
        for (&i, attribute) in &mut self.attributes {
            // Unknown values resurface as warnings when the record is evaluated
            attribute.covering =
                attribute.cover(attribute.covering, record, i, &mut BTreeSet::new());
        }
    }

    fn evaluate(&self, records: &[&Record], attribute: usize) -> Result<Generalization, ConfigError> {
        let state = self.attributes.get(&attribute).ok_or(ConfigError::NotConfigured {
            attribute,
            family: Family::Hierarchy,
        })?;
        let hierarchy = state
            .hierarchy
            .as_ref()
            .ok_or(ConfigError::MissingHierarchy { attribute })?;

        let mut unknown = BTreeSet::new();
        let covering = records
            .iter()
            .fold(state.covering, |c, r| state.cover(c, r, attribute, &mut unknown));

        let Some(node) = covering else {
            return Ok(Generalization::empty());
        };

        let loss = ratio(
            hierarchy.leaf_count(node) - 1,
            hierarchy.total_leaves().saturating_sub(1),
        );
        let warnings = unknown
            .into_iter()
            .map(|label| ConfigError::UnknownHierarchyValue { attribute, label });
        Ok(Generalization::new(Value::text(hierarchy.label(node)), loss).with_warnings(warnings))
    }
}
