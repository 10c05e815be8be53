//! GeoJSON view of the graph's edges, shared by the web exporters.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;

use crate::export::color::{VolumeScale, reds, to_hex};
use crate::graph::RoadGraph;

/// One LineString feature per edge with its endpoints, name, traffic metrics
/// and a volume colour.
pub fn edge_features(graph: &RoadGraph) -> FeatureCollection {
    let scale = VolumeScale::new(
        graph
            .segments()
            .map(|s| s.traffic_or_default().traffic_volume),
    );

    let features = graph
        .segment_views()
        .map(|view| {
            let traffic = view.segment.traffic_or_default();
            let mut properties = JsonObject::new();
            properties.insert("u".to_string(), json!(view.u));
            properties.insert("v".to_string(), json!(view.v));
            properties.insert("name".to_string(), json!(view.segment.candidate_name()));
            properties.insert("traffic_volume".to_string(), json!(traffic.traffic_volume));
            properties.insert("average_speed".to_string(), json!(traffic.average_speed));
            properties.insert("congestion_level".to_string(), json!(traffic.congestion_level));
            properties.insert(
                "color".to_string(),
                json!(to_hex(reds(scale.unit(traffic.traffic_volume)))),
            );

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::from(&view.geometry))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
