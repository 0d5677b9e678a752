//! Street network components - nodes and edges

use geo::{LineString, Point};

use crate::WeightMethod;
use crate::model::{EdgeId, RawOsmId};

/// Street graph node
#[derive(Debug, Clone)]
pub struct StreetNode {
    /// OSM ID of the node
    pub id: i64,
    /// Node coordinates (lon, lat)
    pub geometry: Point<f64>,
}

/// Street graph edge (directed street segment)
#[derive(Debug, Clone)]
pub struct StreetEdge {
    /// Distinguishes parallel edges between the same node pair
    pub key: u32,
    /// Length in metres
    pub length: f64,
    /// Driving time in seconds
    pub travel_time: f64,
    /// Segment geometry from source to target
    pub geometry: LineString<f64>,
    /// Identifier as it came from the source data
    pub osmid: RawOsmId,
    /// Normalized identifier used for aggregation
    pub edge_id: EdgeId,
    pub highway: Option<String>,
}

impl StreetEdge {
    pub fn weight(&self, method: WeightMethod) -> f64 {
        match method {
            WeightMethod::Length => self.length,
            WeightMethod::TravelTime => self.travel_time,
        }
    }
}
