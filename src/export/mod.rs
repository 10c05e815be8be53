//! Writers for the enriched graph.
//!
//! Every exporter only reads the graph; the time-layer map clones it before
//! re-running the matcher per subset.

pub mod color;
pub mod edge_list;
pub mod features;
pub mod heatmap;
pub mod kepler;
pub mod web_map;

pub use edge_list::export_edge_list;
pub use heatmap::export_heatmap;
pub use kepler::export_kepler_map;
pub use web_map::{export_web_map, export_web_map_with_time_layers};
