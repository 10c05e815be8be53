//! Undirected street graph: intersections joined by road segments.
//!
//! Nodes and edges carry a fixed set of typed attributes. The street-network
//! provider fills in coordinates, OSM tags and geometry; the matcher and the
//! centrality pass write traffic and centrality values back.

pub mod centrality;

use geo::{Coord, LineString};
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// OSM node id of an intersection.
pub type NodeId = i64;

/// An OSM tag value, which may hold several `;`-separated entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    One(String),
    Many(Vec<String>),
}

impl TagValue {
    /// Splits a raw OSM value on `;`.
    pub fn parse(raw: &str) -> Self {
        let parts: Vec<String> = raw
            .split(';')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        if parts.len() > 1 {
            TagValue::Many(parts)
        } else {
            TagValue::One(raw.trim().to_string())
        }
    }

    pub fn first(&self) -> Option<&str> {
        match self {
            TagValue::One(s) => Some(s.as_str()),
            TagValue::Many(values) => values.first().map(String::as_str),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            TagValue::One(s) => s.is_empty(),
            TagValue::Many(values) => values.is_empty(),
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::One(value.to_string())
    }
}

/// A graph node. `x` is longitude and `y` latitude (EPSG:4326).
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    pub osm_id: NodeId,
    pub x: f64,
    pub y: f64,
    pub betweenness: Option<f64>,
    pub degree_centrality: Option<f64>,
}

impl Intersection {
    pub fn new(osm_id: NodeId, x: f64, y: f64) -> Self {
        Self {
            osm_id,
            x,
            y,
            betweenness: None,
            degree_centrality: None,
        }
    }
}

/// Traffic metrics assigned to an edge by the matcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EdgeTraffic {
    pub traffic_volume: f64,
    pub average_speed: f64,
    pub congestion_level: f64,
}

/// A graph edge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoadSegment {
    pub name: Option<TagValue>,
    pub r#ref: Option<TagValue>,
    pub highway: Option<TagValue>,
    pub geometry: Option<LineString<f64>>,
    pub traffic: Option<EdgeTraffic>,
}

impl RoadSegment {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// The name used for matching: the first non-empty of `name`, `ref` and
    /// `highway`, taking the first entry of a multi-valued tag.
    pub fn candidate_name(&self) -> Option<&str> {
        [&self.name, &self.r#ref, &self.highway]
            .into_iter()
            .flatten()
            .find(|tag| !tag.is_empty())
            .and_then(TagValue::first)
    }

    /// Assigned traffic, or zeros if the matcher has not run.
    pub fn traffic_or_default(&self) -> EdgeTraffic {
        self.traffic.unwrap_or_default()
    }
}

/// A segment together with the OSM ids of its endpoints.
pub struct SegmentView<'a> {
    pub u: NodeId,
    pub v: NodeId,
    pub segment: &'a RoadSegment,
    /// The segment geometry, or a straight line between the endpoints.
    pub geometry: LineString<f64>,
}

/// Undirected simple graph of intersections and road segments.
#[derive(Debug, Clone, Default)]
pub struct RoadGraph {
    graph: UnGraph<Intersection, RoadSegment>,
    index: HashMap<NodeId, NodeIndex>,
}

impl RoadGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an intersection, replacing the attributes of an existing node with
    /// the same OSM id.
    pub fn add_intersection(&mut self, intersection: Intersection) -> NodeIndex {
        if let Some(&idx) = self.index.get(&intersection.osm_id) {
            self.graph[idx] = intersection;
            return idx;
        }
        let id = intersection.osm_id;
        let idx = self.graph.add_node(intersection);
        self.index.insert(id, idx);
        idx
    }

    /// Connects two known intersections. A segment between an already
    /// connected pair replaces the earlier one. Returns `None` if either
    /// endpoint is unknown.
    pub fn add_segment(&mut self, u: NodeId, v: NodeId, segment: RoadSegment) -> Option<EdgeIndex> {
        let a = *self.index.get(&u)?;
        let b = *self.index.get(&v)?;
        Some(self.graph.update_edge(a, b, segment))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn intersection(&self, id: NodeId) -> Option<&Intersection> {
        self.index.get(&id).map(|&idx| &self.graph[idx])
    }

    pub fn intersections(&self) -> impl Iterator<Item = &Intersection> {
        self.graph.node_weights()
    }

    pub fn segments(&self) -> impl Iterator<Item = &RoadSegment> {
        self.graph.edge_weights()
    }

    pub fn segments_mut(&mut self) -> impl Iterator<Item = &mut RoadSegment> {
        self.graph.edge_weights_mut()
    }

    /// The segment between two intersections, if any.
    pub fn segment(&self, u: NodeId, v: NodeId) -> Option<&RoadSegment> {
        let a = *self.index.get(&u)?;
        let b = *self.index.get(&v)?;
        self.graph.find_edge(a, b).map(|e| &self.graph[e])
    }

    /// Iterates over all segments with their endpoints and a resolved
    /// geometry, in insertion order.
    pub fn segment_views(&self) -> impl Iterator<Item = SegmentView<'_>> {
        self.graph.edge_references().map(move |e| {
            let from = &self.graph[e.source()];
            let to = &self.graph[e.target()];
            let segment = e.weight();
            let geometry = segment.geometry.clone().unwrap_or_else(|| {
                LineString(vec![
                    Coord { x: from.x, y: from.y },
                    Coord { x: to.x, y: to.y },
                ])
            });
            SegmentView {
                u: from.osm_id,
                v: to.osm_id,
                segment,
                geometry,
            }
        })
    }

    /// Keeps only the largest connected component.
    pub fn largest_component(self) -> Self {
        let components = petgraph::algo::kosaraju_scc(&self.graph);
        let Some(largest) = components.into_iter().max_by_key(|c| c.len()) else {
            return self;
        };
        if largest.len() == self.graph.node_count() {
            return self;
        }
        let keep: HashSet<NodeIndex> = largest.into_iter().collect();
        let graph = self.graph.filter_map(
            |idx, node| keep.contains(&idx).then(|| node.clone()),
            |_, edge| Some(edge.clone()),
        );
        Self::from_graph(graph)
    }

    fn from_graph(graph: UnGraph<Intersection, RoadSegment>) -> Self {
        let index = graph
            .node_indices()
            .map(|idx| (graph[idx].osm_id, idx))
            .collect();
        Self { graph, index }
    }

    pub(crate) fn inner(&self) -> &UnGraph<Intersection, RoadSegment> {
        &self.graph
    }

    pub(crate) fn inner_mut(&mut self) -> &mut UnGraph<Intersection, RoadSegment> {
        &mut self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_graph(ids: &[NodeId]) -> RoadGraph {
        let mut g = RoadGraph::new();
        for (i, id) in ids.iter().enumerate() {
            g.add_intersection(Intersection::new(*id, i as f64, 0.0));
        }
        for pair in ids.windows(2) {
            g.add_segment(pair[0], pair[1], RoadSegment::default());
        }
        g
    }

    #[test]
    fn test_tag_value_parse() {
        assert_eq!(TagValue::parse("NH44"), TagValue::One("NH44".to_string()));
        assert_eq!(
            TagValue::parse("NH44; NH48"),
            TagValue::Many(vec!["NH44".to_string(), "NH48".to_string()])
        );
        assert_eq!(TagValue::parse("NH44;NH48").first(), Some("NH44"));
    }

    #[test]
    fn test_candidate_name_fallbacks() {
        let mut seg = RoadSegment {
            name: Some("".into()),
            r#ref: Some(TagValue::Many(vec!["SH 35".into(), "SH 87".into()])),
            highway: Some("primary".into()),
            ..Default::default()
        };
        assert_eq!(seg.candidate_name(), Some("SH 35"));

        seg.r#ref = None;
        assert_eq!(seg.candidate_name(), Some("primary"));

        seg.highway = None;
        assert_eq!(seg.candidate_name(), None);
    }

    #[test]
    fn test_parallel_segments_collapse() {
        let mut g = line_graph(&[1, 2]);
        g.add_segment(2, 1, RoadSegment::named("Second"));
        assert_eq!(g.edge_count(), 1);
        assert_eq!(
            g.segment(1, 2).unwrap().candidate_name(),
            Some("Second")
        );
    }

    #[test]
    fn test_add_segment_unknown_node() {
        let mut g = line_graph(&[1, 2]);
        assert!(g.add_segment(1, 99, RoadSegment::default()).is_none());
    }

    #[test]
    fn test_largest_component() {
        let mut g = line_graph(&[1, 2, 3, 4]);
        g.add_intersection(Intersection::new(10, 0.0, 1.0));
        g.add_intersection(Intersection::new(11, 1.0, 1.0));
        g.add_segment(10, 11, RoadSegment::default());

        let g = g.largest_component();
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 3);
        assert!(g.intersection(10).is_none());
        assert!(g.segment(3, 4).is_some());
    }

    #[test]
    fn test_segment_views_fall_back_to_straight_line() {
        let g = line_graph(&[1, 2]);
        let views: Vec<_> = g.segment_views().collect();
        assert_eq!(views.len(), 1);
        assert_eq!((views[0].u, views[0].v), (1, 2));
        assert_eq!(views[0].geometry.0.len(), 2);
        assert_eq!(views[0].geometry.0[1].x, 1.0);
    }
}
