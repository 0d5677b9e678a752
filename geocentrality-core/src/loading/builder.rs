//! Street graph construction from raw OSM nodes and ways

use geo::{Coord, Distance, Haversine, LineString, Point};
use hashbrown::HashMap;
use log::{debug, info};

use super::speeds::{SpeedTable, travel_time};
use crate::Error;
use crate::model::{NewEdge, StreetGraph, StudyArea};

/// OSM node as returned by the map service
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OsmNode {
    pub id: i64,
    pub lon: f64,
    pub lat: f64,
}

/// OSM way with the tags relevant for routing
#[derive(Debug, Clone, Default)]
pub struct OsmWay {
    pub id: i64,
    pub nodes: Vec<i64>,
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Both,
    Forward,
    Backward,
}

impl OsmWay {
    fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// First value of the `highway` tag
    pub fn highway(&self) -> Option<&str> {
        self.tag("highway")
            .and_then(|value| value.split(';').next())
            .map(str::trim)
    }

    fn direction(&self) -> Direction {
        match self.tag("oneway") {
            Some("yes" | "true" | "1") => Direction::Forward,
            Some("-1" | "reverse") => Direction::Backward,
            Some("no" | "false" | "0") => Direction::Both,
            _ if self.tag("junction") == Some("roundabout") => Direction::Forward,
            _ => Direction::Both,
        }
    }
}

/// Builds the drivable street graph inside `area`.
///
/// Nodes outside the boundary are dropped and ways are cut where they leave
/// it. Ways are split into edges at intersections and at their end nodes;
/// two-way streets get one edge per direction.
///
/// # Errors
///
/// Returns [`Error::NoData`] if no edge remains inside the boundary.
pub fn build_street_graph(
    area: &StudyArea,
    nodes: &[OsmNode],
    ways: &[OsmWay],
    speeds: &SpeedTable,
) -> Result<StreetGraph, Error> {
    let inside: HashMap<i64, Point<f64>> = nodes
        .iter()
        .map(|node| (node.id, Point::new(node.lon, node.lat)))
        .filter(|(_, point)| area.contains(point))
        .collect();
    debug!(
        "{} of {} OSM nodes lie inside '{}'",
        inside.len(),
        nodes.len(),
        area.name
    );

    // Nodes shared by several ways, or repeated within one, are intersections
    let mut usage: HashMap<i64, usize> = HashMap::new();
    for way in ways {
        for id in &way.nodes {
            *usage.entry(*id).or_insert(0) += 1;
        }
    }

    let mut builder = StreetGraph::builder();
    let mut segment_count = 0;
    for way in ways {
        let direction = way.direction();
        let highway = way.highway();
        let kph = speeds.speed_for(highway, way.tag("maxspeed"));

        for run in inside_runs(&way.nodes, &inside) {
            for segment in split_run(&run, &usage) {
                let coords: Vec<Coord<f64>> = segment.iter().map(|id| inside[id].0).collect();
                let geometry = LineString::new(coords);
                let length = haversine_length(&geometry);
                let (first, last) = (segment[0], segment[segment.len() - 1]);
                builder.add_node(first, inside[&first]);
                builder.add_node(last, inside[&last]);

                let edge = NewEdge {
                    highway: highway.map(str::to_string),
                    ..NewEdge::new(way.id, length, travel_time(length, kph))
                };
                if direction != Direction::Backward {
                    builder.add_edge(
                        first,
                        last,
                        NewEdge {
                            geometry: Some(geometry.clone()),
                            ..edge.clone()
                        },
                    )?;
                }
                if direction != Direction::Forward {
                    let mut reversed = geometry;
                    reversed.0.reverse();
                    builder.add_edge(
                        last,
                        first,
                        NewEdge {
                            geometry: Some(reversed),
                            ..edge
                        },
                    )?;
                }
                segment_count += 1;
            }
        }
    }

    let graph = builder.build().retain_largest_component();
    if graph.edge_count() == 0 {
        return Err(Error::NoData(format!(
            "no drivable streets inside '{}'",
            area.name
        )));
    }
    info!(
        "Street graph for '{}': {} nodes, {} edges from {segment_count} segments",
        area.name,
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Maximal runs of consecutive way nodes lying inside the boundary
fn inside_runs(way_nodes: &[i64], inside: &HashMap<i64, Point<f64>>) -> Vec<Vec<i64>> {
    way_nodes
        .split(|id| !inside.contains_key(id))
        .filter(|run| run.len() >= 2)
        .map(<[i64]>::to_vec)
        .collect()
}

/// Splits a run of nodes at intersections
fn split_run(run: &[i64], usage: &HashMap<i64, usize>) -> Vec<Vec<i64>> {
    let mut segments = Vec::new();
    let mut current = vec![run[0]];
    for (position, id) in run.iter().enumerate().skip(1) {
        current.push(*id);
        let is_last = position == run.len() - 1;
        if is_last || usage.get(id).copied().unwrap_or(0) > 1 {
            segments.push(std::mem::replace(&mut current, vec![*id]));
        }
    }
    segments
}

/// Length in metres of a lon/lat line
pub fn haversine_length(line: &LineString<f64>) -> f64 {
    line.points()
        .zip(line.points().skip(1))
        .map(|(a, b)| Haversine.distance(a, b))
        .sum()
}
