//! Diagnostics emitted by a cluster.
//!
//! Every cluster holds an injected [`ClusterObserver`]. The default,
//! [`TracingObserver`], forwards events to `tracing`; tests can pass a
//! closure to capture events instead.

use castle_types::ConfigError;
use tracing::{debug, trace, warn};

/// Something observable happened inside a cluster.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterEvent {
    /// One record was admitted.
    RecordAdded { size: usize },
    /// A batch of records was admitted.
    RecordsAdded { count: usize, size: usize },
    /// A single removal was attempted.
    RecordRemoved { found: bool, size: usize },
    /// A batch removal completed.
    RecordsRemoved { removed: usize, size: usize },
    /// Current information loss was computed.
    InfoLoss { contributions: Vec<f64>, loss: f64 },
    /// Hypothetical information loss was computed.
    InfoLossWith {
        candidates: usize,
        contributions: Vec<f64>,
        loss: f64,
    },
    /// An enlargement value was computed.
    Enlargement { value: f64 },
    /// A rule defect was met. Errors leave the attribute as zero-cost
    /// passthrough; warnings such as unknown hierarchy values keep the result.
    ConfigError(ConfigError),
    /// A query that needs records hit an empty cluster.
    EmptyCluster { operation: &'static str },
}

/// Sink for [`ClusterEvent`]s.
pub trait ClusterObserver: Send + Sync {
    fn on_event(&self, event: &ClusterEvent);
}

impl<F> ClusterObserver for F
where
    F: Fn(&ClusterEvent) + Send + Sync,
{
    fn on_event(&self, event: &ClusterEvent) {
        self(event);
    }
}

/// Forwards cluster events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ClusterObserver for TracingObserver {
    fn on_event(&self, event: &ClusterEvent) {
        match event {
            ClusterEvent::RecordAdded { size } => debug!(size, "record added to cluster"),
            ClusterEvent::RecordsAdded { count, size } => {
                debug!(count, size, "records added to cluster");
            }
            ClusterEvent::RecordRemoved { found, size } => {
                debug!(found, size, "record removed from cluster");
            }
            ClusterEvent::RecordsRemoved { removed, size } => {
                debug!(removed, size, "records removed from cluster");
            }
            ClusterEvent::InfoLoss {
                contributions,
                loss,
            } => trace!(?contributions, loss, "information loss"),
            ClusterEvent::InfoLossWith {
                candidates,
                contributions,
                loss,
            } => trace!(candidates, ?contributions, loss, "information loss with candidates"),
            ClusterEvent::Enlargement { value } => trace!(value, "enlargement value"),
            ClusterEvent::ConfigError(error) => warn!(error = %error, "rule configuration error"),
            ClusterEvent::EmptyCluster { operation } => {
                warn!(operation, "operation called on empty cluster");
            }
        }
    }
}
