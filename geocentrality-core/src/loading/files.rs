//! Boundaries and street networks stored as local GeoJSON files

use std::fs;
use std::path::{Path, PathBuf};

use geo::{LineString, MultiPolygon, Point};
use geojson::{Feature, GeoJson, JsonObject, JsonValue};
use log::info;
use serde::Deserialize;

use super::speeds::{SpeedTable, travel_time};
use crate::Error;
use crate::model::streets::StreetGraphBuilder;
use crate::model::{NewEdge, RawOsmId, StreetGraph, StudyArea};
use crate::providers::{BoundaryProvider, RoadNetworkProvider};

/// Reads the study area from a GeoJSON file instead of geocoding the city
#[derive(Debug, Clone)]
pub struct GeoJsonBoundaryFile {
    path: PathBuf,
}

impl GeoJsonBoundaryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BoundaryProvider for GeoJsonBoundaryFile {
    fn fetch_boundary(&self, city: &str) -> Result<StudyArea, Error> {
        let content = read_file(&self.path)?;
        boundary_from_geojson(city, &content)
    }
}

/// Reads a street network from a GeoJSON edge file.
///
/// Every feature is one directed edge with a LineString geometry running
/// from `u` to `v` and the properties `u`, `v`, `key`, `osmid` (a number or
/// a list of numbers), `length` in metres, `highway` and optionally
/// `travel_time` in seconds and `maxspeed`. Missing travel times are derived
/// from the speed table.
#[derive(Debug, Clone)]
pub struct GeoJsonNetworkFile {
    path: PathBuf,
}

impl GeoJsonNetworkFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RoadNetworkProvider for GeoJsonNetworkFile {
    fn fetch_graph(&self, city: &str, speeds: &SpeedTable) -> Result<StreetGraph, Error> {
        info!("Loading street network of '{city}' from {}", self.path.display());
        let content = read_file(&self.path)?;
        network_from_geojson(&content, speeds)
    }
}

fn read_file(path: &Path) -> Result<String, Error> {
    fs::read_to_string(path).map_err(|e| {
        std::io::Error::new(e.kind(), format!("cannot read {}: {e}", path.display())).into()
    })
}

fn parse_geojson(content: &str) -> Result<GeoJson, Error> {
    content
        .parse::<GeoJson>()
        .map_err(|e| Error::InvalidData(format!("invalid GeoJSON: {e}")))
}

/// Boundary from the first Polygon or MultiPolygon in a GeoJSON document.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the document holds no polygon.
pub fn boundary_from_geojson(name: &str, content: &str) -> Result<StudyArea, Error> {
    let geometries: Vec<geojson::Geometry> = match parse_geojson(content)? {
        GeoJson::Geometry(geometry) => vec![geometry],
        GeoJson::Feature(feature) => feature.geometry.into_iter().collect(),
        GeoJson::FeatureCollection(collection) => collection
            .features
            .into_iter()
            .filter_map(|feature| feature.geometry)
            .collect(),
    };

    let boundary = geometries
        .into_iter()
        .find_map(|geometry| match geo::Geometry::<f64>::try_from(geometry) {
            Ok(geo::Geometry::Polygon(polygon)) => Some(MultiPolygon::new(vec![polygon])),
            Ok(geo::Geometry::MultiPolygon(multi)) => Some(multi),
            _ => None,
        })
        .ok_or_else(|| Error::NotFound(format!("no boundary polygon for '{name}'")))?;

    StudyArea::new(name, boundary)
}

#[derive(Debug, Deserialize)]
struct EdgeProperties {
    u: i64,
    v: i64,
    key: Option<u32>,
    osmid: RawOsmId,
    length: f64,
    #[serde(default)]
    highway: Option<JsonValue>,
    #[serde(default)]
    travel_time: Option<f64>,
    #[serde(default)]
    maxspeed: Option<JsonValue>,
}

/// First text of a property that may be a string, a number or a list
fn first_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(text) => Some(text.clone()),
        JsonValue::Number(number) => Some(number.to_string()),
        JsonValue::Array(items) => items.first().and_then(first_text),
        _ => None,
    }
}

/// # Errors
///
/// Returns [`Error::InvalidData`] for features without a LineString
/// geometry or with missing properties, and [`Error::NoData`] for files
/// without edges.
pub fn network_from_geojson(content: &str, speeds: &SpeedTable) -> Result<StreetGraph, Error> {
    let features: Vec<Feature> = match parse_geojson(content)? {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            return Err(Error::InvalidData(
                "street network file must contain features".to_string(),
            ));
        }
    };

    let mut builder = StreetGraph::builder();
    for (position, feature) in features.into_iter().enumerate() {
        let properties = feature.properties.unwrap_or_else(JsonObject::new);
        let properties: EdgeProperties = serde_json::from_value(JsonValue::Object(properties))
            .map_err(|e| Error::InvalidData(format!("feature {position}: {e}")))?;
        let geometry = match feature.geometry.map(geo::Geometry::<f64>::try_from) {
            Some(Ok(geo::Geometry::LineString(line))) if line.0.len() >= 2 => line,
            _ => {
                return Err(Error::InvalidData(format!(
                    "feature {position} is not a LineString"
                )));
            }
        };

        let highway = properties.highway.as_ref().and_then(first_text);
        let seconds = properties.travel_time.unwrap_or_else(|| {
            let maxspeed = properties.maxspeed.as_ref().and_then(first_text);
            let kph = speeds.speed_for(highway.as_deref(), maxspeed.as_deref());
            travel_time(properties.length, kph)
        });

        add_endpoint(&mut builder, properties.u, &geometry, true);
        add_endpoint(&mut builder, properties.v, &geometry, false);
        builder.add_edge(
            properties.u,
            properties.v,
            NewEdge {
                geometry: Some(geometry),
                highway,
                key: properties.key,
                ..NewEdge::new(properties.osmid, properties.length, seconds)
            },
        )?;
    }

    let graph = builder.build().retain_largest_component();
    if graph.edge_count() == 0 {
        return Err(Error::NoData("street network file has no edges".to_string()));
    }
    info!(
        "Loaded street graph with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Adds the node at one end of an edge line unless it is known already
fn add_endpoint(builder: &mut StreetGraphBuilder, id: i64, line: &LineString<f64>, first: bool) {
    let coord = if first {
        line.0[0]
    } else {
        line.0[line.0.len() - 1]
    };
    builder.add_node(id, Point::from(coord));
}
