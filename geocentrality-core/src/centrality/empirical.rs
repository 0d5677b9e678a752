//! Centrality from sampled routes.
//!
//! An edge identifier scores `routes using it / routes sampled`. The
//! denominator is the route count, not the segment count, so an identifier
//! used by every route scores 1.0 however long the routes are, and scores of
//! different identifiers need not add up to 1.

use geo::MultiLineString;
use hashbrown::{HashMap, HashSet};
use log::info;
use petgraph::graph::EdgeIndex;
use petgraph::visit::EdgeRef;

use super::{CentralityRecord, CentralityStrategy, Strategy};
use crate::model::{EdgeId, StreetGraph};
use crate::routing::{Route, RouteSegment, SampledRoutes};
use crate::Error;

#[derive(Debug, Clone)]
pub struct EmpiricalCentrality {
    route_count: usize,
    scores: HashMap<EdgeId, f64>,
    /// Distinct traversed segments in first-seen order
    segments: Vec<RouteSegment>,
}

impl EmpiricalCentrality {
    /// Scores the sampler's running traversal counters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyInput`] when no route was sampled.
    pub fn from_sampled_routes(sampled: &SampledRoutes) -> Result<Self, Error> {
        Self::from_counts(
            sampled.segments(),
            &sampled.traversals,
            sampled.route_count(),
        )
    }

    /// Counts traversals directly from a list of routes. The result does not
    /// depend on the order of `routes`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyInput`] when `routes` is empty.
    pub fn from_routes(routes: &[Route]) -> Result<Self, Error> {
        let mut traversals: HashMap<EdgeId, usize> = HashMap::new();
        for route in routes {
            for edge_id in route.distinct_edge_ids() {
                *traversals.entry(edge_id).or_insert(0) += 1;
            }
        }
        let segments = routes.iter().flat_map(|route| route.segments.iter());
        Self::from_counts(segments, &traversals, routes.len())
    }

    fn from_counts<'a>(
        segments: impl IntoIterator<Item = &'a RouteSegment>,
        traversals: &HashMap<EdgeId, usize>,
        route_count: usize,
    ) -> Result<Self, Error> {
        if route_count == 0 {
            return Err(Error::EmptyInput(
                "no sampled routes to compute centrality from".to_string(),
            ));
        }
        info!("Computing betweenness centrality from {route_count} sampled routes");

        #[allow(clippy::cast_precision_loss)]
        let scores = traversals
            .iter()
            .map(|(edge_id, count)| (*edge_id, *count as f64 / route_count as f64))
            .collect();

        let mut seen: HashSet<EdgeIndex> = HashSet::new();
        let segments = segments
            .into_iter()
            .filter(|segment| seen.insert(segment.edge))
            .cloned()
            .collect();

        Ok(Self {
            route_count,
            scores,
            segments,
        })
    }

    pub fn route_count(&self) -> usize {
        self.route_count
    }

    /// Score of an edge identifier; 0.0 for identifiers no route used
    pub fn score_of(&self, edge_id: EdgeId) -> f64 {
        self.scores.get(&edge_id).copied().unwrap_or(0.0)
    }

    pub fn scores(&self) -> &HashMap<EdgeId, f64> {
        &self.scores
    }

    /// Adds every graph edge that no route traversed, scored 0.0, after the
    /// traversed ones.
    pub fn include_untraversed(&mut self, graph: &StreetGraph) {
        let traversed: HashSet<EdgeIndex> = self.segments.iter().map(|s| s.edge).collect();
        let untraversed = graph
            .graph
            .edge_references()
            .filter(|edge| !traversed.contains(&edge.id()))
            .map(|edge| RouteSegment {
                edge: edge.id(),
                edge_id: edge.weight().edge_id,
                geometry: edge.weight().geometry.clone(),
            });
        self.segments.extend(untraversed);
    }
}

impl CentralityStrategy for EmpiricalCentrality {
    fn strategy(&self) -> Strategy {
        Strategy::Empirical
    }

    fn produce(&self) -> Vec<CentralityRecord> {
        self.segments
            .iter()
            .map(|segment| CentralityRecord {
                edge_id: segment.edge_id,
                endpoints: None,
                geometry: MultiLineString::new(vec![segment.geometry.clone()]),
                centrality: self.score_of(segment.edge_id),
            })
            .collect()
    }
}
