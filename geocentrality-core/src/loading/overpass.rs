//! Drivable street networks from the Overpass API

use std::collections::HashMap as StdHashMap;

use geo::Rect;
use hashbrown::HashMap;
use log::info;
use serde::Deserialize;

use super::builder::{OsmNode, OsmWay, build_street_graph};
use super::config::ProviderConfig;
use super::http::HttpFetcher;
use super::nominatim::NominatimProvider;
use super::speeds::SpeedTable;
use crate::Error;
use crate::model::StreetGraph;
use crate::providers::{BoundaryProvider, RoadNetworkProvider};

/// Ways open to private cars, the osmnx "drive" network
const DRIVE_FILTER: &str = concat!(
    r#"["highway"]["area"!~"yes"]"#,
    r#"["highway"!~"abandoned|bridleway|bus_guideway|construction|corridor|cycleway|elevator|"#,
    r#"escalator|footway|no|path|pedestrian|planned|platform|proposed|raceway|razed|service|"#,
    r#"steps|track"]"#,
    r#"["motor_vehicle"!~"no"]["motorcar"!~"no"]"#,
    r#"["service"!~"alley|driveway|emergency_access|parking|parking_aisle|private"]"#,
    r#"["access"!~"private"]"#,
);

/// Downloads the drive network inside a city's boundary. The boundary comes
/// from `B`, Nominatim by default.
#[derive(Debug, Clone)]
pub struct OverpassProvider<B = NominatimProvider> {
    fetcher: HttpFetcher,
    url: String,
    timeout_secs: u64,
    boundaries: B,
}

impl OverpassProvider<NominatimProvider> {
    /// # Errors
    ///
    /// Returns [`Error::NetworkError`] if the HTTP client cannot be built.
    pub fn new(config: &ProviderConfig) -> Result<Self, Error> {
        Self::with_boundaries(config, NominatimProvider::new(config)?)
    }
}

impl<B: BoundaryProvider> OverpassProvider<B> {
    /// # Errors
    ///
    /// Returns [`Error::NetworkError`] if the HTTP client cannot be built.
    pub fn with_boundaries(config: &ProviderConfig, boundaries: B) -> Result<Self, Error> {
        Ok(Self {
            fetcher: HttpFetcher::new(config)?,
            url: config.overpass_url.clone(),
            timeout_secs: config.timeout_secs,
            boundaries,
        })
    }
}

impl<B: BoundaryProvider> RoadNetworkProvider for OverpassProvider<B> {
    fn fetch_graph(&self, city: &str, speeds: &SpeedTable) -> Result<StreetGraph, Error> {
        let area = self.boundaries.fetch_boundary(city)?;
        let query = drive_query(area.bbox(), self.timeout_secs);
        let request = self
            .fetcher
            .client()
            .post(&self.url)
            .form(&[("data", query.as_str())]);
        let body = self.fetcher.fetch("overpass", city, request)?;

        let (nodes, ways) = parse_response(&body)?;
        info!(
            "Overpass returned {} nodes and {} ways for '{city}'",
            nodes.len(),
            ways.len()
        );
        build_street_graph(&area, &nodes, &ways, speeds)
    }
}

/// Overpass QL for drivable ways and their nodes inside `bbox`
pub fn drive_query(bbox: Rect<f64>, timeout_secs: u64) -> String {
    let (min, max) = (bbox.min(), bbox.max());
    format!(
        "[out:json][timeout:{timeout_secs}];(way{DRIVE_FILTER}({},{},{},{});>;);out;",
        min.y, min.x, max.y, max.x
    )
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Element {
    Node {
        id: i64,
        lat: f64,
        lon: f64,
    },
    Way {
        id: i64,
        #[serde(default)]
        nodes: Vec<i64>,
        #[serde(default)]
        tags: StdHashMap<String, String>,
    },
    #[serde(other)]
    Other,
}

/// # Errors
///
/// Returns [`Error::InvalidData`] for bodies that are not Overpass JSON.
pub fn parse_response(body: &str) -> Result<(Vec<OsmNode>, Vec<OsmWay>), Error> {
    let response: OverpassResponse = serde_json::from_str(body)?;
    let mut nodes = Vec::new();
    let mut ways = Vec::new();
    for element in response.elements {
        match element {
            Element::Node { id, lat, lon } => nodes.push(OsmNode { id, lon, lat }),
            Element::Way { id, nodes, tags } => ways.push(OsmWay {
                id,
                nodes,
                tags: tags.into_iter().collect::<HashMap<_, _>>(),
            }),
            Element::Other => {}
        }
    }
    Ok((nodes, ways))
}
