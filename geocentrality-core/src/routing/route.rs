use geo::LineString;
use hashbrown::HashSet;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::model::{EdgeId, StreetGraph};
use crate::{Error, WeightMethod};

/// One traversed street segment of a route
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSegment {
    pub edge: EdgeIndex,
    pub edge_id: EdgeId,
    pub geometry: LineString<f64>,
}

/// Path through the street graph; consecutive nodes are joined by `segments`
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub nodes: Vec<NodeIndex>,
    pub segments: Vec<RouteSegment>,
}

impl Route {
    /// Expands a node sequence into the edges it traverses. Between nodes
    /// joined by parallel edges the cheapest one under `weight` is taken.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for sequences shorter than two nodes
    /// or with a consecutive pair that is not connected.
    pub fn from_nodes(
        graph: &StreetGraph,
        nodes: Vec<NodeIndex>,
        weight: WeightMethod,
    ) -> Result<Self, Error> {
        if nodes.len() < 2 {
            return Err(Error::InvalidInput(format!(
                "a route needs at least two nodes, got {}",
                nodes.len()
            )));
        }

        let segments = nodes
            .windows(2)
            .map(|pair| {
                let edge = graph.cheapest_edge(pair[0], pair[1], weight).ok_or_else(|| {
                    Error::InvalidInput(format!(
                        "nodes {} and {} are not adjacent",
                        pair[0].index(),
                        pair[1].index()
                    ))
                })?;
                Ok(RouteSegment {
                    edge: edge.id(),
                    edge_id: edge.weight().edge_id,
                    geometry: edge.weight().geometry.clone(),
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(Self { nodes, segments })
    }

    pub fn origin(&self) -> NodeIndex {
        self.nodes[0]
    }

    pub fn destination(&self) -> NodeIndex {
        self.nodes[self.nodes.len() - 1]
    }

    /// Edge identifiers on this route, each listed once
    pub fn distinct_edge_ids(&self) -> HashSet<EdgeId> {
        self.segments.iter().map(|segment| segment.edge_id).collect()
    }
}
