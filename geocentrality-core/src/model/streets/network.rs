//! Street graph with a spatial index over its nodes

use geo::{LineString, Point};
use hashbrown::HashMap;
use log::{debug, info};
use petgraph::{
    algo::connected_components,
    graph::{DiGraph, EdgeIndex, EdgeReference, Edges, NodeIndex},
    unionfind::UnionFind,
    visit::EdgeRef,
    Directed,
};
use rstar::{RTree, primitives::GeomWithData};

use super::components::{StreetEdge, StreetNode};
use crate::model::RawOsmId;
use crate::{Error, WeightMethod};

pub type IndexedPoint = GeomWithData<Point<f64>, NodeIndex>;

/// Directed street multigraph. Read-only once built.
#[derive(Debug, Clone)]
pub struct StreetGraph {
    pub graph: DiGraph<StreetNode, StreetEdge>,
    rtree: RTree<IndexedPoint>,
}

impl StreetGraph {
    pub fn new(graph: DiGraph<StreetNode, StreetEdge>) -> Self {
        let points = graph
            .node_indices()
            .map(|idx| IndexedPoint::new(graph[idx].geometry, idx))
            .collect();
        let rtree = RTree::bulk_load(points);

        Self { graph, rtree }
    }

    pub fn builder() -> StreetGraphBuilder {
        StreetGraphBuilder::default()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn edges(&self, node: NodeIndex) -> Edges<'_, StreetEdge, Directed> {
        self.graph.edges(node)
    }

    pub fn node(&self, node: NodeIndex) -> Option<&StreetNode> {
        self.graph.node_weight(node)
    }

    /// Nearest graph node to `point` by straight-line distance in the
    /// point's coordinate space, together with that distance.
    pub fn nearest_node(&self, point: &Point<f64>) -> Option<(NodeIndex, f64)> {
        self.rtree.nearest_neighbor(point).map(|nearest| {
            let geom = nearest.geom();
            let distance = (geom.x() - point.x()).hypot(geom.y() - point.y());
            (nearest.data, distance)
        })
    }

    /// Cheapest of the (possibly parallel) edges leading from `source` to `target`.
    pub fn cheapest_edge(
        &self,
        source: NodeIndex,
        target: NodeIndex,
        weight: WeightMethod,
    ) -> Option<EdgeReference<'_, StreetEdge>> {
        self.graph
            .edges_connecting(source, target)
            .min_by(|a, b| a.weight().weight(weight).total_cmp(&b.weight().weight(weight)))
    }

    /// Number of weakly connected components
    pub fn component_count(&self) -> usize {
        connected_components(&self.graph)
    }

    /// Keeps only the largest weakly connected component. Ties go to the
    /// component holding the lowest node index.
    pub fn retain_largest_component(self) -> Self {
        let node_count = self.graph.node_count();
        let mut sets = UnionFind::<usize>::new(node_count);
        for edge in self.graph.edge_references() {
            sets.union(edge.source().index(), edge.target().index());
        }
        let labels = sets.into_labeling();

        let mut sizes: HashMap<usize, usize> = HashMap::new();
        for label in &labels {
            *sizes.entry(*label).or_insert(0) += 1;
        }
        let mut largest = None;
        let mut largest_size = 0;
        for label in &labels {
            let size = sizes[label];
            if size > largest_size {
                largest = Some(*label);
                largest_size = size;
            }
        }
        let Some(largest) = largest else {
            return self;
        };
        if largest_size == node_count {
            debug!("Street graph is weakly connected");
            return self;
        }

        let graph = self.graph.filter_map(
            |idx, node| (labels[idx.index()] == largest).then(|| node.clone()),
            |_, edge| Some(edge.clone()),
        );
        info!(
            "Dropped {} nodes outside the largest weakly connected component ({} of {} kept)",
            node_count - largest_size,
            largest_size,
            node_count
        );
        Self::new(graph)
    }
}

/// Edge attributes supplied when building a graph
#[derive(Debug, Clone)]
pub struct NewEdge {
    pub osmid: RawOsmId,
    pub length: f64,
    pub travel_time: f64,
    /// Straight line between the end nodes when `None`
    pub geometry: Option<LineString<f64>>,
    pub highway: Option<String>,
    /// Parallel-edge key; assigned in insertion order when `None`
    pub key: Option<u32>,
}

impl NewEdge {
    pub fn new(osmid: impl Into<RawOsmId>, length: f64, travel_time: f64) -> Self {
        Self {
            osmid: osmid.into(),
            length,
            travel_time,
            geometry: None,
            highway: None,
            key: None,
        }
    }
}

/// Incremental construction of a [`StreetGraph`] keyed by OSM node ids
#[derive(Debug, Default)]
pub struct StreetGraphBuilder {
    graph: DiGraph<StreetNode, StreetEdge>,
    node_lookup: HashMap<i64, NodeIndex>,
    next_key: HashMap<(NodeIndex, NodeIndex), u32>,
}

impl StreetGraphBuilder {
    /// Adds a node unless one with the same OSM id exists already.
    pub fn add_node(&mut self, id: i64, geometry: Point<f64>) -> NodeIndex {
        *self
            .node_lookup
            .entry(id)
            .or_insert_with(|| self.graph.add_node(StreetNode { id, geometry }))
    }

    pub fn node_index(&self, id: i64) -> Option<NodeIndex> {
        self.node_lookup.get(&id).copied()
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] for unknown end nodes, negative or
    /// non-finite weights and identifiers that cannot be normalized.
    pub fn add_edge(&mut self, source: i64, target: i64, edge: NewEdge) -> Result<EdgeIndex, Error> {
        let (Some(u), Some(v)) = (self.node_index(source), self.node_index(target)) else {
            return Err(Error::InvalidData(format!(
                "edge {source} -> {target} references an unknown node"
            )));
        };
        for (name, value) in [("length", edge.length), ("travel_time", edge.travel_time)] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidData(format!(
                    "edge {source} -> {target} has invalid {name} {value}"
                )));
            }
        }
        let edge_id = edge.osmid.normalize()?;

        let next_key = self.next_key.entry((u, v)).or_insert(0);
        let key = edge.key.unwrap_or(*next_key);
        let following = key.checked_add(1).ok_or_else(|| {
            Error::InvalidData(format!("edge {source} -> {target} has out of range key {key}"))
        })?;
        *next_key = (*next_key).max(following);

        let geometry = edge.geometry.unwrap_or_else(|| {
            LineString::from(vec![self.graph[u].geometry, self.graph[v].geometry])
        });

        Ok(self.graph.add_edge(
            u,
            v,
            StreetEdge {
                key,
                length: edge.length,
                travel_time: edge.travel_time,
                geometry,
                osmid: edge.osmid,
                edge_id,
                highway: edge.highway,
            },
        ))
    }

    pub fn build(self) -> StreetGraph {
        debug!(
            "Building street graph with {} nodes and {} edges",
            self.graph.node_count(),
            self.graph.edge_count()
        );
        StreetGraph::new(self.graph)
    }
}
