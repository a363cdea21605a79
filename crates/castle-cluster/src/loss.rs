//! Information-loss model.
//!
//! Each attribute contributes the loss reported by the generalizer its rule
//! selects; the cluster's loss is the mean over *all* configured
//! attributes, including those contributing nothing.
//!
//! "Current" and "what-if" losses go through the same dispatch. The only
//! difference is the record basis handed to the generalizers: the stored
//! records alone, or the stored records followed by the candidates.
//! Generalizers evaluate through `&self`, so neither path mutates state.

use castle_types::{AttributeRule, Record};

use crate::cluster::Cluster;
use crate::error::ClusterResult;
use crate::observer::ClusterEvent;

impl Cluster {
    /// Information loss of generalizing the stored records.
    ///
    /// # Errors
    ///
    /// [`ClusterError::EmptyCluster`](crate::ClusterError::EmptyCluster) if
    /// no record is stored.
    pub fn info_loss(&self) -> ClusterResult<f64> {
        self.ensure_populated("info_loss")?;
        let basis: Vec<&Record> = self.records.iter().collect();
        let contributions = self.contributions(&basis);
        let loss = self.mean(&contributions);

        self.emit(ClusterEvent::InfoLoss {
            contributions,
            loss,
        });
        Ok(loss)
    }

    /// Information loss the cluster would have if `candidates` were admitted.
    pub fn information_loss_with(&self, candidates: &[Record]) -> ClusterResult<f64> {
        self.ensure_populated("information_loss_with")?;
        let basis: Vec<&Record> = self.records.iter().chain(candidates).collect();
        let contributions = self.contributions(&basis);
        let loss = self.mean(&contributions);

        self.emit(ClusterEvent::InfoLossWith {
            candidates: candidates.len(),
            contributions,
            loss,
        });
        Ok(loss)
    }

    pub fn information_loss_with_record(&self, record: &Record) -> ClusterResult<f64> {
        self.information_loss_with(std::slice::from_ref(record))
    }

    /// Information loss of the merge of this cluster with `other`.
    pub fn information_loss_with_cluster(&self, other: &Cluster) -> ClusterResult<f64> {
        self.information_loss_with(other.records())
    }

    /// Marginal loss of admitting `record`: loss with it minus loss now.
    ///
    /// Not clamped; a non-monotonic generalizer could make it negative.
    pub fn enlargement_value_record(&self, record: &Record) -> ClusterResult<f64> {
        let value = self.information_loss_with_record(record)? - self.info_loss()?;
        self.emit(ClusterEvent::Enlargement { value });
        Ok(value)
    }

    /// Marginal loss of merging `other` into this cluster.
    pub fn enlargement_value_cluster(&self, other: &Cluster) -> ClusterResult<f64> {
        let value = self.information_loss_with_cluster(other)? - self.info_loss()?;
        self.emit(ClusterEvent::Enlargement { value });
        Ok(value)
    }

    fn contributions(&self, basis: &[&Record]) -> Vec<f64> {
        self.rules
            .iter()
            .enumerate()
            .map(|(attribute, rule)| self.contribution(attribute, rule, basis))
            .collect()
    }

    /// Loss of one attribute. Configuration errors count as zero; warnings
    /// are reported and the loss kept.
    fn contribution(&self, attribute: usize, rule: &AttributeRule, basis: &[&Record]) -> f64 {
        let Some(family) = rule.kind.family() else {
            // `None` costs nothing; an unrecognized kind is reported first
            if let Err(error) = rule.validate(attribute) {
                self.report(error);
            }
            return 0.0;
        };

        match self.generalizer(family).evaluate(basis, attribute) {
            Ok(generalization) => {
                for warning in generalization.warnings {
                    self.report(warning);
                }
                generalization.loss
            }
            Err(error) => {
                self.report(error);
                0.0
            }
        }
    }

    /// Sum over the rule count. A cluster with no rules loses nothing.
    // Rule counts are tiny, the conversion is exact
    #[allow(clippy::cast_precision_loss)]
    fn mean(&self, contributions: &[f64]) -> f64 {
        if self.rules.is_empty() {
            return 0.0;
        }
        contributions.iter().sum::<f64>() / self.rules.len() as f64
    }
}
