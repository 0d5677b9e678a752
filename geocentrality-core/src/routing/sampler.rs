//! Random origin-destination routes between sampled points.
//!
//! Each route draws two distinct points, snaps both to their nearest street
//! nodes and takes the shortest path between them. Pairs snapping to the same
//! node or without a connecting path are redrawn, at most `max_attempts`
//! times in a row before sampling fails.

use geo::Point;
use hashbrown::HashMap;
use log::{debug, info, trace};
use petgraph::graph::NodeIndex;
use rand::Rng;
use rand::seq::index;

use super::dijkstra::shortest_path;
use super::route::{Route, RouteSegment};
use crate::model::{EdgeId, PointSet, StreetGraph};
use crate::{Error, WeightMethod};

pub const DEFAULT_MAX_ATTEMPTS: usize = 1_000;

/// Snaps a location to a graph node
pub trait NodeLocator {
    fn locate(&self, point: &Point<f64>) -> Option<NodeIndex>;
}

/// Finds a shortest route between two graph nodes
pub trait PathFinder {
    fn find_route(&self, source: NodeIndex, target: NodeIndex, weight: WeightMethod)
    -> Option<Route>;
}

impl NodeLocator for StreetGraph {
    fn locate(&self, point: &Point<f64>) -> Option<NodeIndex> {
        self.nearest_node(point).map(|(node, _)| node)
    }
}

impl PathFinder for StreetGraph {
    fn find_route(
        &self,
        source: NodeIndex,
        target: NodeIndex,
        weight: WeightMethod,
    ) -> Option<Route> {
        let (_, nodes) = shortest_path(self, source, target, weight)?;
        Route::from_nodes(self, nodes, weight).ok()
    }
}

/// Accepted routes and how many of them traversed each edge identifier
#[derive(Debug, Clone, Default)]
pub struct SampledRoutes {
    pub routes: Vec<Route>,
    /// Number of routes that use an edge identifier at least once
    pub traversals: HashMap<EdgeId, usize>,
    /// Point pairs that were drawn and discarded
    pub rejected: usize,
}

impl SampledRoutes {
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// All traversed segments of all routes, in sampling order
    pub fn segments(&self) -> impl Iterator<Item = &RouteSegment> {
        self.routes.iter().flat_map(|route| route.segments.iter())
    }

    fn record(&mut self, route: Route) {
        for edge_id in route.distinct_edge_ids() {
            *self.traversals.entry(edge_id).or_insert(0) += 1;
        }
        self.routes.push(route);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RouteSampler {
    /// Consecutive rejected point pairs tolerated for a single route
    pub max_attempts: usize,
}

impl Default for RouteSampler {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl RouteSampler {
    pub fn new(max_attempts: usize) -> Self {
        Self { max_attempts }
    }

    /// Samples `route_count` routes between random pairs of `points`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] for fewer than two points, a zero route count
    /// or a network without nodes; [`Error::RouteSamplingExhausted`] when
    /// `max_attempts` pairs in a row are rejected.
    pub fn sample_routes<G, R>(
        &self,
        network: &G,
        points: &PointSet,
        route_count: usize,
        weight: WeightMethod,
        rng: &mut R,
    ) -> Result<SampledRoutes, Error>
    where
        G: NodeLocator + PathFinder + ?Sized,
        R: Rng + ?Sized,
    {
        if points.len() < 2 {
            return Err(Error::InvalidInput(format!(
                "route sampling needs at least two points, got {}",
                points.len()
            )));
        }
        if route_count == 0 {
            return Err(Error::InvalidInput(
                "number of routes must be positive".to_string(),
            ));
        }

        info!("Generating {route_count} random routes weighted by {weight}");
        let progress_step = (route_count / 10).max(1);
        let mut sampled = SampledRoutes::default();

        for done in 1..=route_count {
            let route = self.sample_one(network, points, weight, rng, &mut sampled.rejected)?;
            debug!(
                "Route {done}: {} nodes, {} segments",
                route.nodes.len(),
                route.segments.len()
            );
            sampled.record(route);

            if done % progress_step == 0 || done == route_count {
                info!("Done: {done} from {route_count} requested routes generated");
            }
        }

        if sampled.rejected > 0 {
            debug!("Rejected {} degenerate point pairs", sampled.rejected);
        }
        Ok(sampled)
    }

    fn sample_one<G, R>(
        &self,
        network: &G,
        points: &PointSet,
        weight: WeightMethod,
        rng: &mut R,
        rejected: &mut usize,
    ) -> Result<Route, Error>
    where
        G: NodeLocator + PathFinder + ?Sized,
        R: Rng + ?Sized,
    {
        for _ in 0..self.max_attempts {
            let pair = index::sample(rng, points.len(), 2);
            let origin = &points.as_slice()[pair.index(0)].geometry;
            let destination = &points.as_slice()[pair.index(1)].geometry;

            let (Some(source), Some(target)) = (network.locate(origin), network.locate(destination))
            else {
                return Err(Error::InvalidInput(
                    "street network has no nodes to snap to".to_string(),
                ));
            };

            if source == target {
                trace!("Both points snapped to node {}, redrawing", source.index());
                *rejected += 1;
                continue;
            }
            match network.find_route(source, target, weight) {
                Some(route) => return Ok(route),
                None => {
                    trace!(
                        "No path from node {} to node {}, redrawing",
                        source.index(),
                        target.index()
                    );
                    *rejected += 1;
                }
            }
        }

        Err(Error::RouteSamplingExhausted {
            attempts: self.max_attempts,
        })
    }
}
