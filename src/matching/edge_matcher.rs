use tracing::debug;

use crate::config::FieldNames;
use crate::dataset::TrafficDataset;
use crate::error::PipelineResult;
use crate::graph::{EdgeTraffic, RoadGraph};
use crate::matching::aggregate::{Aggregation, aggregate};
use crate::matching::alias::AliasTable;
use crate::matching::observer::MatchObserver;
use crate::matching::similarity::closest_match;
use crate::matching::types::{AggregatedMetrics, MatchSummary, TrafficMetrics};

/// Minimum similarity for an approximate name match.
pub const FUZZY_CUTOFF: f64 = 0.85;

enum Resolution<'a> {
    Exact(&'a TrafficMetrics),
    Fuzzy(&'a TrafficMetrics),
    Unmatched,
}

/// Assigns aggregated traffic metrics to graph edges by road name.
#[derive(Debug, Clone)]
pub struct EdgeMatcher {
    aliases: AliasTable,
}

impl Default for EdgeMatcher {
    fn default() -> Self {
        Self::new(AliasTable::bangalore())
    }
}

impl EdgeMatcher {
    pub fn new(aliases: AliasTable) -> Self {
        Self { aliases }
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Aggregates `dataset` with this matcher's alias table.
    pub fn aggregate(
        &self,
        dataset: &TrafficDataset,
        fields: &FieldNames,
        agg: Aggregation,
    ) -> PipelineResult<AggregatedMetrics> {
        aggregate(dataset, fields, &self.aliases, agg)
    }

    /// Writes traffic onto every edge of `graph`.
    ///
    /// Each edge's candidate name is canonicalized and looked up exactly, then
    /// approximately against every key of `metrics`. Edges that match nothing,
    /// or have no usable name, get zeros. Existing values are overwritten, so
    /// re-running with the same inputs gives the same graph.
    pub fn match_edges(
        &self,
        graph: &mut RoadGraph,
        metrics: &AggregatedMetrics,
        observer: &mut dyn MatchObserver,
    ) -> MatchSummary {
        let mut summary = MatchSummary::default();

        for segment in graph.segments_mut() {
            let raw = segment.candidate_name();
            let canonical = self.aliases.canonicalize(raw);

            let resolution = if canonical.is_empty() {
                Resolution::Unmatched
            } else if let Some(m) = metrics.get(&canonical) {
                Resolution::Exact(m)
            } else if let Some((key, score)) =
                closest_match(&canonical, metrics.keys().map(String::as_str), FUZZY_CUTOFF)
            {
                observer.on_fuzzy_match(&canonical, key, score);
                Resolution::Fuzzy(&metrics[key])
            } else {
                Resolution::Unmatched
            };

            let traffic = match resolution {
                Resolution::Exact(m) => {
                    summary.exact += 1;
                    traffic_from(m)
                }
                Resolution::Fuzzy(m) => {
                    summary.fuzzy += 1;
                    traffic_from(m)
                }
                Resolution::Unmatched => {
                    summary.unmatched += 1;
                    if let Some(raw) = raw {
                        observer.on_unmatched(raw, &canonical);
                    }
                    EdgeTraffic::default()
                }
            };

            summary.total_edges += 1;
            if traffic.traffic_volume > 0.0 {
                summary.edges_with_data += 1;
            }
            segment.traffic = Some(traffic);
        }

        observer.on_complete(&summary);
        summary
    }

    /// Aggregates `dataset` and matches the result onto `graph`.
    #[tracing::instrument(skip_all, fields(rows = dataset.len(), edges = graph.edge_count()))]
    pub fn map_traffic(
        &self,
        graph: &mut RoadGraph,
        dataset: &TrafficDataset,
        fields: &FieldNames,
        agg: Aggregation,
        observer: &mut dyn MatchObserver,
    ) -> PipelineResult<MatchSummary> {
        let metrics = self.aggregate(dataset, fields, agg)?;
        let summary = self.match_edges(graph, &metrics, observer);
        debug!(?summary, "Matched traffic onto edges");
        Ok(summary)
    }
}

fn traffic_from(metrics: &TrafficMetrics) -> EdgeTraffic {
    EdgeTraffic {
        traffic_volume: metrics.volume,
        average_speed: metrics.average_speed.unwrap_or(0.0),
        congestion_level: metrics.congestion_level.unwrap_or(0.0),
    }
}
