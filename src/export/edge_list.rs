//! Edge-list CSV for downstream graph learning.

use csv::Writer;
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::error::PipelineResult;
use crate::graph::{NodeId, RoadGraph};

#[derive(Debug, Serialize)]
struct EdgeRow {
    u: NodeId,
    v: NodeId,
    traffic_volume: f64,
    average_speed: f64,
    congestion_level: f64,
}

/// Writes one row per edge: `u, v, traffic_volume, average_speed,
/// congestion_level`. Edges without assigned traffic get zeros.
pub fn export_edge_list(graph: &RoadGraph, path: &Path) -> PipelineResult<()> {
    let mut writer = Writer::from_path(path)?;
    for view in graph.segment_views() {
        let traffic = view.segment.traffic_or_default();
        writer.serialize(EdgeRow {
            u: view.u,
            v: view.v,
            traffic_volume: traffic.traffic_volume,
            average_speed: traffic.average_speed,
            congestion_level: traffic.congestion_level,
        })?;
    }
    writer.flush()?;

    info!(path = %path.display(), edges = graph.edge_count(), "Edge list exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeTraffic, Intersection, RoadSegment};

    #[test]
    fn test_export_edge_list() {
        let mut g = RoadGraph::new();
        for id in [10, 20, 30] {
            g.add_intersection(Intersection::new(id, 0.0, 0.0));
        }
        g.add_segment(
            10,
            20,
            RoadSegment {
                traffic: Some(EdgeTraffic {
                    traffic_volume: 120.0,
                    average_speed: 30.5,
                    congestion_level: 80.0,
                }),
                ..Default::default()
            },
        );
        g.add_segment(20, 30, RoadSegment::default());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edges.csv");
        export_edge_list(&g, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "u,v,traffic_volume,average_speed,congestion_level",
                "10,20,120.0,30.5,80.0",
                "20,30,0.0,0.0,0.0",
            ]
        );
    }
}
