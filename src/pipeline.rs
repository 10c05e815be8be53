//! The end-to-end run: match traffic, compute centralities, export.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{FieldNames, MapView};
use crate::dataset::TrafficDataset;
use crate::error::PipelineResult;
use crate::export::{
    export_edge_list, export_heatmap, export_kepler_map, export_web_map,
    export_web_map_with_time_layers,
};
use crate::graph::RoadGraph;
use crate::graph::centrality::{CentralityOptions, compute_centralities};
use crate::matching::{Aggregation, EdgeMatcher, MatchObserver, MatchSummary, TracingObserver};

/// Settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub output_dir: PathBuf,
    /// Prepended to every output file name.
    pub prefix: String,
    /// Dataset label shown in the kepler.gl map.
    pub title: String,
    pub fields: FieldNames,
    pub aggregation: Aggregation,
    pub centrality: CentralityOptions,
    /// Map viewport; `None` centres on the graph.
    pub view: Option<MapView>,
    /// Log unmatched and fuzzy-matched road names.
    pub verbose: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("outputs"),
            prefix: "bangalore".to_string(),
            title: "Bangalore Traffic".to_string(),
            fields: FieldNames::default(),
            aggregation: Aggregation::Mean,
            centrality: CentralityOptions::default(),
            view: None,
            verbose: false,
        }
    }
}

/// Paths of the files written by [`run_pipeline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutputs {
    pub web_map: PathBuf,
    pub time_layer_map: PathBuf,
    pub kepler_map: PathBuf,
    pub heatmap: PathBuf,
    pub edge_list: PathBuf,
}

impl PipelineOutputs {
    pub fn new(dir: &Path, prefix: &str) -> Self {
        let file = |name: &str| dir.join(format!("{prefix}_{name}"));
        Self {
            web_map: file("basic_map.html"),
            time_layer_map: file("time_filtered_map.html"),
            kepler_map: file("traffic_kepler.html"),
            heatmap: file("heatmap.png"),
            edge_list: file("graph_edges.csv"),
        }
    }

    pub fn all(&self) -> [&Path; 5] {
        [
            &self.web_map,
            &self.time_layer_map,
            &self.kepler_map,
            &self.heatmap,
            &self.edge_list,
        ]
    }
}

/// Result of a successful run.
#[derive(Debug)]
pub struct RunReport {
    pub graph: RoadGraph,
    pub summary: MatchSummary,
    pub outputs: PipelineOutputs,
}

/// Enriches `graph` with `dataset` and writes every export.
///
/// Stops at the first error; files written before it are left in place.
#[tracing::instrument(skip_all, fields(output_dir = %config.output_dir.display()))]
pub fn run_pipeline(
    mut graph: RoadGraph,
    dataset: &TrafficDataset,
    matcher: &EdgeMatcher,
    config: &PipelineConfig,
) -> PipelineResult<RunReport> {
    std::fs::create_dir_all(&config.output_dir)?;
    let outputs = PipelineOutputs::new(&config.output_dir, &config.prefix);

    info!(rows = dataset.len(), edges = graph.edge_count(), "Mapping traffic data");
    let mut observer: Box<dyn MatchObserver> = if config.verbose {
        Box::new(TracingObserver::default())
    } else {
        Box::new(())
    };
    let summary = matcher.map_traffic(
        &mut graph,
        dataset,
        &config.fields,
        config.aggregation,
        observer.as_mut(),
    )?;

    info!("Computing centralities");
    compute_centralities(&mut graph, &config.centrality);

    let view = config
        .view
        .or_else(|| MapView::centered_on(&graph, MapView::default().zoom))
        .unwrap_or_default();

    info!("Exporting single-layer web map");
    export_web_map(&graph, &view, &outputs.web_map)?;

    info!("Exporting multi-layer web map");
    export_web_map_with_time_layers(
        &graph,
        dataset,
        &config.fields,
        matcher,
        config.aggregation,
        &view,
        &outputs.time_layer_map,
    )?;

    info!("Exporting kepler.gl map");
    export_kepler_map(&graph, &config.title, &view, &outputs.kepler_map)?;

    info!("Exporting static heatmap");
    export_heatmap(&graph, &outputs.heatmap)?;

    info!("Exporting edge list");
    export_edge_list(&graph, &outputs.edge_list)?;

    info!(
        edges_with_data = summary.edges_with_data,
        total_edges = summary.total_edges,
        "Pipeline complete"
    );
    Ok(RunReport {
        graph,
        summary,
        outputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_names() {
        let outputs = PipelineOutputs::new(Path::new("out"), "bangalore");
        assert_eq!(outputs.web_map, Path::new("out/bangalore_basic_map.html"));
        assert_eq!(outputs.edge_list, Path::new("out/bangalore_graph_edges.csv"));
        assert_eq!(outputs.all().len(), 5);
    }
}
