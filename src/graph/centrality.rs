//! Betweenness and degree centrality over a [`RoadGraph`].

use petgraph::graph::NodeIndex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{HashMap, VecDeque};
use tracing::info;

use crate::graph::{NodeId, RoadGraph};

/// Default upper bound on the number of sampled betweenness sources.
pub const DEFAULT_SAMPLE_SIZE: usize = 500;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CentralityOptions {
    /// Number of source nodes to sample for betweenness. Defaults to
    /// `min(500, node_count)`; values at or above the node count give the
    /// exact result.
    pub k: Option<usize>,
    /// Seed for source sampling. Unseeded runs draw from OS entropy.
    pub seed: Option<u64>,
}

/// Centrality values keyed by OSM node id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Centrality {
    pub betweenness: HashMap<NodeId, f64>,
    pub degree_centrality: HashMap<NodeId, f64>,
}

/// Computes betweenness and degree centrality, writes both onto the graph's
/// intersections and returns them.
#[tracing::instrument(skip_all, fields(nodes = graph.node_count(), k = ?options.k))]
pub fn compute_centralities(graph: &mut RoadGraph, options: &CentralityOptions) -> Centrality {
    let n = graph.node_count();
    let k = options.k.unwrap_or(DEFAULT_SAMPLE_SIZE.min(n));

    let sources: Option<Vec<NodeIndex>> = (k < n).then(|| {
        let nodes: Vec<NodeIndex> = graph.inner().node_indices().collect();
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        nodes.choose_multiple(&mut rng, k).copied().collect()
    });

    let betweenness = betweenness_centrality(graph, sources.as_deref());
    let degree = degree_centrality(graph);

    let inner = graph.inner_mut();
    let mut result = Centrality::default();
    for idx in inner.node_indices() {
        let node = &mut inner[idx];
        node.betweenness = Some(betweenness[idx.index()]);
        node.degree_centrality = Some(degree[idx.index()]);
        result
            .betweenness
            .insert(node.osm_id, betweenness[idx.index()]);
        result
            .degree_centrality
            .insert(node.osm_id, degree[idx.index()]);
    }

    info!(
        nodes = n,
        sampled = sources.as_ref().map(Vec::len),
        "Centralities computed"
    );
    result
}

/// Brandes' algorithm on the unweighted graph, indexed by node index.
///
/// With `sources` set only those nodes start shortest-path searches and the
/// result is scaled by `n / k`. Values are normalized by `1 / ((n-1)(n-2))`.
fn betweenness_centrality(graph: &RoadGraph, sources: Option<&[NodeIndex]>) -> Vec<f64> {
    let g = graph.inner();
    let n = g.node_count();
    let mut centrality = vec![0.0; n];

    let all: Vec<NodeIndex>;
    let sources = match sources {
        Some(s) => s,
        None => {
            all = g.node_indices().collect();
            &all
        }
    };

    for &s in sources {
        let mut stack = Vec::with_capacity(n);
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0f64; n];
        let mut dist = vec![-1i64; n];
        sigma[s.index()] = 1.0;
        dist[s.index()] = 0;

        let mut queue = VecDeque::from([s]);
        while let Some(v) = queue.pop_front() {
            stack.push(v.index());
            for w in g.neighbors(v) {
                if dist[w.index()] < 0 {
                    dist[w.index()] = dist[v.index()] + 1;
                    queue.push_back(w);
                }
                if dist[w.index()] == dist[v.index()] + 1 {
                    sigma[w.index()] += sigma[v.index()];
                    preds[w.index()].push(v.index());
                }
            }
        }

        let mut delta = vec![0.0f64; n];
        while let Some(w) = stack.pop() {
            for &v in &preds[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != s.index() {
                centrality[w] += delta[w];
            }
        }
    }

    if n > 2 {
        let mut scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        if sources.len() < n && !sources.is_empty() {
            scale *= n as f64 / sources.len() as f64;
        }
        for c in &mut centrality {
            *c *= scale;
        }
    }
    centrality
}

fn degree_centrality(graph: &RoadGraph) -> Vec<f64> {
    let g = graph.inner();
    let n = g.node_count();
    if n <= 1 {
        return vec![1.0; n];
    }
    let scale = 1.0 / (n - 1) as f64;
    g.node_indices()
        .map(|idx| g.neighbors(idx).count() as f64 * scale)
        .collect()
}
