//! Edge centrality: empirical from sampled routes, exact from the full graph

pub mod empirical;
pub mod exact;

use geo::MultiLineString;

use crate::model::EdgeId;

pub use empirical::EmpiricalCentrality;
pub use exact::ExactCentrality;

/// Which computation produced a set of records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Traversal frequency over sampled routes
    Empirical,
    /// Edge betweenness over all node pairs
    Exact,
}

/// Directed edge a record was computed for, by OSM node ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeEndpoints {
    pub u: i64,
    pub v: i64,
    pub key: u32,
}

/// Centrality score of one street geometry
#[derive(Debug, Clone, PartialEq)]
pub struct CentralityRecord {
    pub edge_id: EdgeId,
    pub endpoints: Option<EdgeEndpoints>,
    pub geometry: MultiLineString<f64>,
    pub centrality: f64,
}

/// Common output contract of both centrality computations
pub trait CentralityStrategy {
    fn strategy(&self) -> Strategy;

    fn produce(&self) -> Vec<CentralityRecord>;
}
