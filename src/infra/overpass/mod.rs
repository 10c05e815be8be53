//! OpenStreetMap street networks via Nominatim and the Overpass API.
//!
//! [`OverpassClient`] geocodes a place name, downloads its ways and builds a
//! [`RoadGraph`](crate::graph::RoadGraph). [`OsmFileProvider`] builds the same
//! graph from a saved Overpass JSON response.

mod client;
mod osm;

pub use client::{OsmFileProvider, OverpassClient};
pub use osm::{OsmElement, OsmResponse, build_road_graph};
