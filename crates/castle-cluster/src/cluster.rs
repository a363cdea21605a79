//! Cluster state: stored records and the generalizers that cost them.
//!
//! A cluster is a plain single-owner value. Nothing here locks, blocks or
//! yields; an engine sharing a cluster across workers must serialize the
//! whole add/remove/query sequence itself.

use std::fmt;
use std::sync::Arc;

use castle_generalize::{
    AggregationGeneralizer, Generalizer, HierarchyGeneralizer, ReductionGeneralizer,
};
use castle_types::{ConfigError, Family, Record, RuleSet};

use crate::error::{ClusterError, ClusterResult};
use crate::observer::{ClusterEvent, ClusterObserver, TracingObserver};

/// Copy of a cluster's generalizer state, for before/after comparisons.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilitySnapshot {
    pub aggregation: AggregationGeneralizer,
    pub reduction: ReductionGeneralizer,
    pub hierarchy: HierarchyGeneralizer,
}

/// A growing set of records sharing one generalized representation.
///
/// Records are kept in insertion order; duplicates are allowed. The rule
/// set is fixed for the cluster's lifetime and its length decides how many
/// attribute positions take part in loss and generalize computations.
///
/// Removal affects membership only. The generalizers keep whatever state
/// removed records contributed (numeric bounds, hierarchy coverage).
#[derive(Clone)]
pub struct Cluster {
    pub(crate) rules: RuleSet,
    pub(crate) records: Vec<Record>,
    aggregation: AggregationGeneralizer,
    reduction: ReductionGeneralizer,
    hierarchy: HierarchyGeneralizer,
    observer: Arc<dyn ClusterObserver>,
}

impl Cluster {
    /// Creates an empty cluster that reports to `tracing`.
    pub fn new(rules: RuleSet) -> Self {
        Self::with_observer(rules, TracingObserver)
    }

    /// Creates an empty cluster that reports to `observer`.
    pub fn with_observer(rules: RuleSet, observer: impl ClusterObserver + 'static) -> Self {
        Self {
            aggregation: AggregationGeneralizer::new(&rules),
            reduction: ReductionGeneralizer::new(&rules),
            hierarchy: HierarchyGeneralizer::new(&rules),
            records: Vec::new(),
            rules,
            observer: Arc::new(observer),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Checks the rule set up front instead of waiting for evaluation to
    /// report each defect.
    pub fn validate(&self) -> ClusterResult<()> {
        self.rules.validate().map_err(ClusterError::InvalidRules)
    }

    // ------------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------------

    /// Admits a record and folds it into every generalizer.
    pub fn add(&mut self, record: Record) {
        self.observe(&record);
        self.records.push(record);
        self.emit(ClusterEvent::RecordAdded {
            size: self.records.len(),
        });
    }

    /// Admits every record of `records`.
    pub fn add_all(&mut self, records: impl IntoIterator<Item = Record>) {
        let before = self.records.len();
        for record in records {
            self.observe(&record);
            self.records.push(record);
        }
        self.emit(ClusterEvent::RecordsAdded {
            count: self.records.len() - before,
            size: self.records.len(),
        });
    }

    /// Removes one record equal to `record`. Returns whether one was found.
    ///
    /// Generalizer state is left untouched.
    pub fn remove(&mut self, record: &Record) -> bool {
        let found = match self.records.iter().position(|r| r == record) {
            Some(i) => {
                self.records.remove(i);
                true
            }
            None => false,
        };
        self.emit(ClusterEvent::RecordRemoved {
            found,
            size: self.records.len(),
        });
        found
    }

    /// Removes every stored record equal to any of `records`.
    ///
    /// Generalizer state is left untouched.
    pub fn remove_all(&mut self, records: &[Record]) {
        let before = self.records.len();
        self.records.retain(|r| !records.contains(r));
        self.emit(ClusterEvent::RecordsRemoved {
            removed: before - self.records.len(),
            size: self.records.len(),
        });
    }

    // ------------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------------

    pub fn contains(&self, record: &Record) -> bool {
        self.records.contains(record)
    }

    pub fn size(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All stored records, in insertion order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Clones the current generalizer state.
    pub fn capabilities(&self) -> CapabilitySnapshot {
        CapabilitySnapshot {
            aggregation: self.aggregation.clone(),
            reduction: self.reduction.clone(),
            hierarchy: self.hierarchy.clone(),
        }
    }

    // ------------------------------------------------------------------------
    // Internals shared by the loss model, dispatcher and diversity
    // ------------------------------------------------------------------------

    pub(crate) fn generalizer(&self, family: Family) -> &dyn Generalizer {
        match family {
            Family::Aggregation => &self.aggregation,
            Family::Reduction => &self.reduction,
            Family::Hierarchy => &self.hierarchy,
        }
    }

    fn observe(&mut self, record: &Record) {
        let generalizers: [&mut dyn Generalizer; 3] = [
            &mut self.aggregation,
            &mut self.reduction,
            &mut self.hierarchy,
        ];
        for generalizer in generalizers {
            generalizer.observe(record);
        }
    }

    pub(crate) fn emit(&self, event: ClusterEvent) {
        self.observer.on_event(&event);
    }

    pub(crate) fn report(&self, error: ConfigError) {
        self.emit(ClusterEvent::ConfigError(error));
    }

    /// Fails fast on an empty cluster.
    pub(crate) fn ensure_populated(&self, operation: &'static str) -> ClusterResult<()> {
        if self.records.is_empty() {
            self.emit(ClusterEvent::EmptyCluster { operation });
            return Err(ClusterError::EmptyCluster { operation });
        }
        Ok(())
    }
}

impl fmt::Debug for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cluster")
            .field("rules", &self.rules.len())
            .field("records", &self.records)
            .field("aggregation", &self.aggregation)
            .field("reduction", &self.reduction)
            .field("hierarchy", &self.hierarchy)
            .finish_non_exhaustive()
    }
}
