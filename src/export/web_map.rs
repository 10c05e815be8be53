//! Interactive Leaflet maps.

use geojson::FeatureCollection;
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::config::{FieldNames, MapView};
use crate::dataset::TrafficDataset;
use crate::error::PipelineResult;
use crate::export::features::edge_features;
use crate::graph::RoadGraph;
use crate::matching::{Aggregation, EdgeMatcher};

const TEMPLATE: &str = include_str!("templates/leaflet.html");

#[derive(Serialize)]
struct MapLayer {
    name: String,
    /// Fixed stroke colour; `None` uses each feature's volume colour.
    color: Option<String>,
    data: FeatureCollection,
}

/// Writes all edges as a single layer coloured by traffic volume.
pub fn export_web_map(graph: &RoadGraph, view: &MapView, path: &Path) -> PipelineResult<()> {
    let layers = vec![MapLayer {
        name: "Traffic".to_string(),
        color: None,
        data: edge_features(graph),
    }];
    write_map(&layers, view, "Traffic volume", path)?;
    info!(path = %path.display(), edges = graph.edge_count(), "Web map exported");
    Ok(())
}

/// Writes separate weekday and weekend layers.
///
/// The dataset is split on its date column and each half is matched onto a
/// fresh copy of `graph`, so `graph` itself is left untouched.
///
/// # Errors
///
/// Returns [`MissingField`](crate::PipelineError::MissingField) if the date,
/// name or volume column is absent.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn export_web_map_with_time_layers(
    graph: &RoadGraph,
    dataset: &TrafficDataset,
    fields: &FieldNames,
    matcher: &EdgeMatcher,
    agg: Aggregation,
    view: &MapView,
    path: &Path,
) -> PipelineResult<()> {
    let (weekday, weekend) = dataset.split_by_day_type(&fields.date)?;

    let mut layers = Vec::new();
    for (subset, name, color) in [
        (&weekday, "Weekday Traffic", "red"),
        (&weekend, "Weekend Traffic", "blue"),
    ] {
        let mut layer_graph = graph.clone();
        let summary = matcher.map_traffic(&mut layer_graph, subset, fields, agg, &mut ())?;
        info!(
            layer = name,
            rows = subset.len(),
            edges_with_data = summary.edges_with_data,
            "Time layer matched"
        );
        layers.push(MapLayer {
            name: name.to_string(),
            color: Some(color.to_string()),
            data: edge_features(&layer_graph),
        });
    }

    write_map(&layers, view, "Traffic by day type", path)?;
    info!("Multi-layer web map exported");
    Ok(())
}

fn write_map(layers: &[MapLayer], view: &MapView, title: &str, path: &Path) -> PipelineResult<()> {
    // A literal "</" would end the inline script early.
    let layers = serde_json::to_string(layers)?.replace("</", "<\\/");
    let html = TEMPLATE
        .replace("{{TITLE}}", title)
        .replace("{{CENTER_LAT}}", &view.lat.to_string())
        .replace("{{CENTER_LON}}", &view.lon.to_string())
        .replace("{{ZOOM}}", &view.zoom.to_string())
        .replace("{{LAYERS}}", &layers);
    std::fs::write(path, html)?;
    Ok(())
}
