//! # castle-cluster: State and cost model of a CASTLE anonymization cluster
//!
//! A [`Cluster`] accumulates records and answers the three questions a
//! streaming k-anonymity engine asks when deciding which cluster to grow,
//! merge, or output:
//!
//! - How much information is lost generalizing the cluster?
//!   ([`Cluster::info_loss`])
//! - How much more would be lost admitting a record or merging a cluster?
//!   ([`Cluster::enlargement_value_record`], [`Cluster::enlargement_value_cluster`])
//! - How diverse are the cluster's sensitive values?
//!   ([`Cluster::diversity`])
//!
//! ## Key Principles
//!
//! - **What-if queries never mutate**: hypothetical losses evaluate the
//!   generalizers through `&self` against an explicit record basis.
//! - **Removal affects membership only**: generalizer state (bounds,
//!   hierarchy coverage) keeps whatever removed records contributed.
//! - **Deterministic**: same records and state always give the same loss
//!   and the same diversity, ties included.
//! - **Fail fast on empty clusters**: every query except `diversity(&[])`
//!   returns [`ClusterError::EmptyCluster`] when no record is stored.
//!
//! ## Architecture
//!
//! - [`cluster`]: record storage, mutators, generalizer ownership
//! - [`loss`]: information-loss model (current and what-if)
//! - [`generalize`]: materializes generalized output records
//! - [`diversity`]: l-diversity bound by greedy peeling
//! - [`observer`]: injected diagnostics sink
//!
//! ## Example
//!
//! ```
//! use castle_cluster::Cluster;
//! use castle_types::{AttributeRule, NumericDomain, Record, RuleSet, Value};
//!
//! let rules = RuleSet::new(vec![
//!     AttributeRule::aggregation(NumericDomain::new(0.0, 100.0)),
//!     AttributeRule::none(),
//! ]);
//! let mut cluster = Cluster::new(rules);
//! cluster.add(Record::new(vec![Value::Int(30), Value::text("flu")]));
//! cluster.add(Record::new(vec![Value::Int(40), Value::text("cold")]));
//!
//! // (40 - 30) / 100 on one of two attributes
//! assert!((cluster.info_loss().unwrap() - 0.05).abs() < 1e-12);
//!
//! let candidate = Record::new(vec![Value::Int(50), Value::text("flu")]);
//! assert!((cluster.enlargement_value_record(&candidate).unwrap() - 0.05).abs() < 1e-12);
//! assert_eq!(cluster.size(), 2);
//!
//! let out = cluster.generalize(&candidate).unwrap();
//! assert_eq!(out.get(0), Some(&Value::Interval { lower: 30.0, upper: 40.0 }));
//! assert_eq!(cluster.diversity(&[1]).unwrap(), 2);
//! ```

pub mod cluster;
pub mod diversity;
pub mod error;
pub mod generalize;
pub mod loss;
pub mod observer;


// Re-export commonly used items
pub use cluster::{CapabilitySnapshot, Cluster};
pub use diversity::diversity_bound;
pub use error::{ClusterError, ClusterResult};
pub use observer::{ClusterEvent, ClusterObserver, TracingObserver};
