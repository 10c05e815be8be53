//! Reconciliation of free-text road names with graph edges.
//!
//! Dataset names and edge names both go through [`normalize`] and the
//! [`AliasTable`]; the dataset is grouped by the resulting canonical name and
//! the [`EdgeMatcher`] assigns each edge the metrics of its exact or closest
//! canonical name.

pub mod aggregate;
pub mod alias;
pub mod edge_matcher;
pub mod normalize;
pub mod observer;
pub mod similarity;
pub mod types;

pub use aggregate::{Aggregation, aggregate};
pub use alias::AliasTable;
pub use edge_matcher::{EdgeMatcher, FUZZY_CUTOFF};
pub use normalize::normalize;
pub use observer::{MatchObserver, RecordingObserver, TracingObserver};
pub use types::{AggregatedMetrics, CanonicalName, MatchSummary, TrafficMetrics};
