//! Data types produced by aggregation and matching.

use serde::Serialize;
use std::collections::BTreeMap;

/// A road name after normalization and alias substitution.
pub type CanonicalName = String;

/// Aggregated metrics for one canonical road name.
///
/// `average_speed` and `congestion_level` are `Some` exactly when the source
/// dataset carries those columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrafficMetrics {
    pub volume: f64,
    pub average_speed: Option<f64>,
    pub congestion_level: Option<f64>,
}

/// Aggregated metrics keyed by canonical road name.
pub type AggregatedMetrics = BTreeMap<CanonicalName, TrafficMetrics>;

/// Counts reported once a matching pass is complete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub total_edges: usize,
    pub edges_with_data: usize,
    pub exact: usize,
    pub fuzzy: usize,
    pub unmatched: usize,
}
