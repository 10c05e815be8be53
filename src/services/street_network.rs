//! Trait and types for obtaining a street graph for a place.

use anyhow::Result;
use clap::ValueEnum;
use std::collections::HashMap;
use std::fmt;

use crate::graph::RoadGraph;

/// Which ways make up the street network, following the usual osmnx presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum NetworkType {
    #[default]
    Drive,
    Walk,
    Bike,
    All,
}

struct WayFilter {
    excluded_highways: &'static [&'static str],
    /// Tag keys whose listed values exclude the way.
    excluded_tags: &'static [(&'static str, &'static [&'static str])],
}

const DRIVE: WayFilter = WayFilter {
    excluded_highways: &[
        "abandoned", "bridleway", "bus_guideway", "construction", "corridor", "cycleway",
        "elevator", "escalator", "footway", "no", "path", "pedestrian", "planned", "platform",
        "proposed", "raceway", "razed", "service", "steps", "track",
    ],
    excluded_tags: &[
        ("area", &["yes"]),
        ("motor_vehicle", &["no"]),
        ("motorcar", &["no"]),
        (
            "service",
            &["alley", "driveway", "emergency_access", "parking", "parking_aisle", "private"],
        ),
    ],
};

const WALK: WayFilter = WayFilter {
    excluded_highways: &[
        "abandoned", "bus_guideway", "construction", "cycleway", "motor", "no", "planned",
        "platform", "proposed", "raceway", "razed", "motorway", "motorway_link",
    ],
    excluded_tags: &[("area", &["yes"]), ("foot", &["no"]), ("service", &["private"])],
};

const BIKE: WayFilter = WayFilter {
    excluded_highways: &[
        "abandoned", "bus_guideway", "construction", "corridor", "elevator", "escalator",
        "footway", "motor", "no", "planned", "platform", "proposed", "raceway", "razed", "steps",
        "motorway", "motorway_link",
    ],
    excluded_tags: &[("area", &["yes"]), ("bicycle", &["no"]), ("service", &["private"])],
};

const ALL: WayFilter = WayFilter {
    excluded_highways: &[
        "abandoned", "construction", "no", "planned", "platform", "proposed", "raceway", "razed",
    ],
    excluded_tags: &[("area", &["yes"])],
};

impl NetworkType {
    fn filter(self) -> &'static WayFilter {
        match self {
            NetworkType::Drive => &DRIVE,
            NetworkType::Walk => &WALK,
            NetworkType::Bike => &BIKE,
            NetworkType::All => &ALL,
        }
    }

    /// Whether a way with these OSM tags belongs to the network.
    pub fn admits(self, tags: &HashMap<String, String>) -> bool {
        let filter = self.filter();
        let Some(highway) = tags.get("highway") else {
            return false;
        };
        if filter.excluded_highways.contains(&highway.as_str()) {
            return false;
        }
        !filter.excluded_tags.iter().any(|(key, values)| {
            tags.get(*key)
                .is_some_and(|v| values.contains(&v.as_str()))
        })
    }

    /// The same filter as an Overpass QL tag selector.
    pub fn overpass_selector(self) -> String {
        let filter = self.filter();
        let mut selector = format!(
            "[\"highway\"][\"highway\"!~\"^({})$\"]",
            filter.excluded_highways.join("|")
        );
        for (key, values) in filter.excluded_tags {
            selector.push_str(&format!("[\"{}\"!~\"^({})$\"]", key, values.join("|")));
        }
        selector
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NetworkType::Drive => "drive",
            NetworkType::Walk => "walk",
            NetworkType::Bike => "bike",
            NetworkType::All => "all",
        };
        f.write_str(name)
    }
}

/// Abstraction over a street-network source (e.g., OpenStreetMap via Overpass).
///
/// Implementations return the largest connected component of the network.
#[async_trait::async_trait]
pub trait StreetNetworkProvider: Send + Sync {
    async fn fetch_road_graph(&self, place: &str, network_type: NetworkType) -> Result<RoadGraph>;
}
