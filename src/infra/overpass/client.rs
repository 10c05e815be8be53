use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::info;

use super::osm::{OsmResponse, build_road_graph};
use crate::config::{nominatim_url, overpass_url};
use crate::fetch::{HttpClient, fetch_json};
use crate::graph::RoadGraph;
use crate::services::street_network::{NetworkType, StreetNetworkProvider};

/// Overpass derives area ids from the OSM id of the enclosing relation or way.
const RELATION_AREA_OFFSET: i64 = 3_600_000_000;
const WAY_AREA_OFFSET: i64 = 2_400_000_000;

#[derive(Deserialize)]
struct NominatimPlace {
    osm_type: String,
    osm_id: i64,
    #[serde(default)]
    display_name: String,
}

/// Fetches street networks from OpenStreetMap.
pub struct OverpassClient<C> {
    http: C,
    overpass_url: String,
    nominatim_url: String,
}

impl<C: HttpClient> OverpassClient<C> {
    /// Uses the endpoints from `OVERPASS_URL` / `NOMINATIM_URL`, falling back
    /// to the public instances.
    pub fn new(http: C) -> Self {
        Self {
            http,
            overpass_url: overpass_url(),
            nominatim_url: nominatim_url(),
        }
    }

    /// Resolves a place name to an Overpass area id.
    #[tracing::instrument(skip(self))]
    async fn area_id(&self, place: &str) -> Result<i64> {
        let url = reqwest::Url::parse_with_params(
            &self.nominatim_url,
            &[("q", place), ("format", "json"), ("limit", "1")],
        )?;
        let places: Vec<NominatimPlace> = fetch_json(&self.http, url.as_str()).await?;
        let found = places
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Nominatim found no match for '{place}'"))?;

        info!(place, resolved = %found.display_name, osm_type = %found.osm_type, osm_id = found.osm_id, "Geocoded place");
        match found.osm_type.as_str() {
            "relation" => Ok(RELATION_AREA_OFFSET + found.osm_id),
            "way" => Ok(WAY_AREA_OFFSET + found.osm_id),
            other => Err(anyhow!(
                "'{place}' resolved to a {other}, which has no area to query"
            )),
        }
    }
}

/// The Overpass QL query for every way of `network_type` inside an area,
/// together with the nodes it references.
pub fn overpass_query(area_id: i64, network_type: NetworkType) -> String {
    format!(
        "[out:json][timeout:180];area(id:{area_id})->.searchArea;\
         (way{}(area.searchArea););(._;>;);out body;",
        network_type.overpass_selector()
    )
}

#[async_trait]
impl<C: HttpClient> StreetNetworkProvider for OverpassClient<C> {
    #[tracing::instrument(skip(self), fields(network_type = %network_type))]
    async fn fetch_road_graph(&self, place: &str, network_type: NetworkType) -> Result<RoadGraph> {
        let area_id = self.area_id(place).await?;
        let query = overpass_query(area_id, network_type);
        let url = reqwest::Url::parse_with_params(&self.overpass_url, &[("data", query)])?;

        info!(area_id, "Downloading street network from Overpass");
        let response: OsmResponse = fetch_json(&self.http, url.as_str())
            .await
            .with_context(|| format!("Overpass query failed for '{place}'"))?;
        info!(elements = response.elements.len(), "Overpass response received");

        Ok(build_road_graph(response, network_type)?)
    }
}

/// Reads a saved Overpass JSON response instead of querying the network.
/// The place name is ignored.
pub struct OsmFileProvider {
    path: PathBuf,
}

impl OsmFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StreetNetworkProvider for OsmFileProvider {
    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch_road_graph(&self, _place: &str, network_type: NetworkType) -> Result<RoadGraph> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let response: OsmResponse = serde_json::from_slice(&bytes)?;
        Ok(build_road_graph(response, network_type)?)
    }
}
