//! Column names and map defaults shared across the pipeline.

use geo::{Centroid, MultiPoint, Point};

use crate::graph::RoadGraph;

/// Names of the dataset columns the pipeline reads, after header
/// normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    pub name: String,
    pub volume: String,
    pub speed: String,
    pub congestion: String,
    pub date: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            name: "road_intersection_name".to_string(),
            volume: "traffic_volume".to_string(),
            speed: "average_speed".to_string(),
            congestion: "congestion_level".to_string(),
            date: "date".to_string(),
        }
    }
}

/// Initial viewport of the interactive maps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub lat: f64,
    pub lon: f64,
    pub zoom: u8,
}

impl Default for MapView {
    /// Central Bangalore.
    fn default() -> Self {
        Self {
            lat: 12.9716,
            lon: 77.5946,
            zoom: 12,
        }
    }
}

impl MapView {
    /// Centres on the centroid of the graph's intersections.
    pub fn centered_on(graph: &RoadGraph, zoom: u8) -> Option<Self> {
        let points: MultiPoint<f64> = graph
            .intersections()
            .map(|i| Point::new(i.x, i.y))
            .collect::<Vec<_>>()
            .into();
        let centroid = points.centroid()?;
        Some(Self {
            lat: centroid.y(),
            lon: centroid.x(),
            zoom,
        })
    }
}

pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Overpass endpoint, overridable through `OVERPASS_URL`.
pub fn overpass_url() -> String {
    std::env::var("OVERPASS_URL").unwrap_or_else(|_| DEFAULT_OVERPASS_URL.to_string())
}

/// Nominatim search endpoint, overridable through `NOMINATIM_URL`.
pub fn nominatim_url() -> String {
    std::env::var("NOMINATIM_URL").unwrap_or_else(|_| DEFAULT_NOMINATIM_URL.to_string())
}

/// Mapbox access token for the kepler.gl base map, from `MAPBOX_TOKEN`.
/// Empty when unset.
pub fn mapbox_token() -> String {
    std::env::var("MAPBOX_TOKEN").unwrap_or_default()
}
