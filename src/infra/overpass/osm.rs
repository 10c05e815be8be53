use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::{PipelineError, PipelineResult};
use crate::graph::{Intersection, NodeId, RoadGraph, RoadSegment, TagValue};
use crate::services::street_network::NetworkType;
use geo::{Coord, LineString};

/// Body of an Overpass `[out:json]` response.
#[derive(Debug, Deserialize)]
pub struct OsmResponse {
    pub elements: Vec<OsmElement>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OsmElement {
    Node {
        id: NodeId,
        lat: f64,
        lon: f64,
    },
    Way {
        id: i64,
        nodes: Vec<NodeId>,
        #[serde(default)]
        tags: HashMap<String, String>,
    },
    #[serde(other)]
    Other,
}

/// Builds a street graph from OSM nodes and ways.
///
/// Ways are split at every node they share with another way and at their own
/// endpoints, so graph nodes are intersections and each edge keeps the
/// intermediate points as its geometry. Self-loops are dropped and only the
/// largest connected component is returned.
pub fn build_road_graph(
    response: OsmResponse,
    network_type: NetworkType,
) -> PipelineResult<RoadGraph> {
    let mut coords: HashMap<NodeId, (f64, f64)> = HashMap::new();
    let mut ways = Vec::new();
    for element in response.elements {
        match element {
            OsmElement::Node { id, lat, lon } => {
                coords.insert(id, (lon, lat));
            }
            OsmElement::Way { id, nodes, tags } if network_type.admits(&tags) => {
                ways.push((id, nodes, tags));
            }
            _ => {}
        }
    }

    for (_, nodes, _) in &mut ways {
        nodes.retain(|n| coords.contains_key(n));
    }
    ways.retain(|(_, nodes, _)| nodes.len() >= 2);
    if ways.is_empty() {
        return Err(PipelineError::NoData(format!(
            "no {network_type} ways in the OSM data"
        )));
    }

    let mut uses: HashMap<NodeId, usize> = HashMap::new();
    for (_, nodes, _) in &ways {
        for n in nodes {
            *uses.entry(*n).or_default() += 1;
        }
    }
    let is_intersection = |nodes: &[NodeId], idx: usize| {
        idx == 0 || idx == nodes.len() - 1 || uses[&nodes[idx]] >= 2
    };

    let mut graph = RoadGraph::new();
    let mut self_loops = 0;
    for (way_id, nodes, tags) in &ways {
        let tag = |key: &str| tags.get(key).map(|v| TagValue::parse(v));

        let mut start = 0;
        for idx in 1..nodes.len() {
            if !is_intersection(nodes, idx) {
                continue;
            }
            let (u, v) = (nodes[start], nodes[idx]);
            if u == v {
                self_loops += 1;
                start = idx;
                continue;
            }
            for id in [u, v] {
                if graph.intersection(id).is_none() {
                    let (x, y) = coords[&id];
                    graph.add_intersection(Intersection::new(id, x, y));
                }
            }
            let geometry = LineString(
                nodes[start..=idx]
                    .iter()
                    .map(|n| {
                        let (x, y) = coords[n];
                        Coord { x, y }
                    })
                    .collect(),
            );
            graph.add_segment(
                u,
                v,
                RoadSegment {
                    name: tag("name"),
                    r#ref: tag("ref"),
                    highway: tag("highway"),
                    geometry: Some(geometry),
                    traffic: None,
                },
            );
            start = idx;
        }
        debug!(way_id, nodes = nodes.len(), "Split way");
    }

    let total_nodes = graph.node_count();
    let graph = graph.largest_component();
    info!(
        ways = ways.len(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        dropped_nodes = total_nodes - graph.node_count(),
        self_loops,
        "Built road graph"
    );
    Ok(graph)
}
