//! kepler.gl map of the enriched edges.

use std::path::Path;
use tracing::info;

use crate::config::{MapView, mapbox_token};
use crate::error::PipelineResult;
use crate::export::features::edge_features;
use crate::graph::RoadGraph;

const TEMPLATE: &str = include_str!("templates/kepler.html");

/// Restyles a page so its content fills the viewport: the body loses its
/// margins and scrollbars and everything inside is wrapped in a fixed,
/// full-size container.
pub fn patch_full_viewport(html: &str) -> String {
    html.replace(
        "<body>",
        "<body style='margin:0;padding:0;overflow:hidden;'>\
         <div style='position:fixed;top:0;left:0;width:100%;height:100%;'>",
    )
    .replace("</body>", "</div></body>")
}

/// Writes the edges, with geometry and traffic metrics, as a kepler.gl
/// dataset. The `MAPBOX_TOKEN` environment variable is passed through for the
/// base map.
pub fn export_kepler_map(
    graph: &RoadGraph,
    title: &str,
    view: &MapView,
    path: &Path,
) -> PipelineResult<()> {
    let html = render(graph, title, view, &mapbox_token())?;
    std::fs::write(path, html)?;

    info!(path = %path.display(), edges = graph.edge_count(), "Kepler map exported");
    Ok(())
}

/// JSON literal safe to inline in a `<script>` block.
fn script_literal<T: serde::Serialize + ?Sized>(value: &T) -> PipelineResult<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

fn render(graph: &RoadGraph, title: &str, view: &MapView, token: &str) -> PipelineResult<String> {
    let dataset = script_literal(&edge_features(graph))?;
    let title = title.replace(['"', '<', '>'], "");

    let html = TEMPLATE
        .replace("{{TITLE}}", &title)
        .replace("{{MAPBOX_TOKEN}}", &script_literal(token)?)
        .replace("{{CENTER_LAT}}", &view.lat.to_string())
        .replace("{{CENTER_LON}}", &view.lon.to_string())
        .replace("{{ZOOM}}", &view.zoom.to_string())
        .replace("{{DATASET}}", &dataset);
    Ok(patch_full_viewport(&html))
}
