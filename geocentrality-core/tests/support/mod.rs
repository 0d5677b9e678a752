#![allow(dead_code)]

use std::path::Path;

use geo::{LineString, Point, Polygon};
use geocentrality_core::model::NewEdge;
use geocentrality_core::prelude::*;

pub const ORIGIN: (f64, f64) = (8.68, 49.40);
pub const SPACING: f64 = 0.001;

/// Square study area padded half a cell around a `size` x `size` grid
pub fn grid_area(name: &str, size: usize) -> StudyArea {
    let pad = SPACING / 2.0;
    let (x0, y0) = (ORIGIN.0 - pad, ORIGIN.1 - pad);
    let extent = SPACING * (size - 1) as f64 + 2.0 * pad;
    let exterior = LineString::from(vec![
        (x0, y0),
        (x0 + extent, y0),
        (x0 + extent, y0 + extent),
        (x0, y0 + extent),
        (x0, y0),
    ]);
    StudyArea::from_polygon(name, Polygon::new(exterior, vec![])).unwrap()
}

/// Two-way street grid. Every street segment carries its own way id, the
/// same in both directions. Horizontal streets are faster than vertical ones.
pub fn grid_graph(size: usize) -> StreetGraph {
    let mut builder = StreetGraph::builder();
    let id = |row: usize, col: usize| (row * size + col) as i64 + 1;
    for row in 0..size {
        for col in 0..size {
            builder.add_node(
                id(row, col),
                Point::new(
                    ORIGIN.0 + col as f64 * SPACING,
                    ORIGIN.1 + row as f64 * SPACING,
                ),
            );
        }
    }

    let mut way = 1000;
    for row in 0..size {
        for col in 0..size {
            let mut link = |other: i64, seconds: f64| {
                way += 1;
                for (u, v) in [(id(row, col), other), (other, id(row, col))] {
                    builder.add_edge(u, v, NewEdge::new(way, 100.0, seconds)).unwrap();
                }
            };
            if col + 1 < size {
                link(id(row, col + 1), 6.0);
            }
            if row + 1 < size {
                link(id(row + 1, col), 12.0);
            }
        }
    }
    builder.build()
}

pub const AB: EdgeId = EdgeId(1);
pub const BC: EdgeId = EdgeId(2);
pub const AC: EdgeId = EdgeId(3);
pub const CD: EdgeId = EdgeId(4);

/// Four crossings: A-B and B-C are short, A-C is a long detour and D hangs
/// off C. Node ids 1 to 4 are A to D, every street runs both ways.
///
/// ```text
///   A --1-- B --1-- C --1-- D
///    \_______5______/
/// ```
pub fn shortcut_graph() -> StreetGraph {
    let mut builder = StreetGraph::builder();
    builder.add_node(1, Point::new(0.0, 0.0));
    builder.add_node(2, Point::new(1.0, 0.0));
    builder.add_node(3, Point::new(2.0, 0.0));
    builder.add_node(4, Point::new(3.0, 0.0));
    let streets = [
        (1, 2, AB.0, 1.0),
        (2, 3, BC.0, 1.0),
        (1, 3, AC.0, 5.0),
        (3, 4, CD.0, 1.0),
    ];
    for (u, v, way, length) in streets {
        builder.add_edge(u, v, NewEdge::new(way, length, length)).unwrap();
        builder.add_edge(v, u, NewEdge::new(way, length, length)).unwrap();
    }
    builder.build()
}

pub fn points(coords: &[(f64, f64)]) -> PointSet {
    coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

/// Boundary lookup answering for a single city
pub struct FixedBoundary {
    pub area: StudyArea,
}

impl BoundaryProvider for FixedBoundary {
    fn fetch_boundary(&self, city: &str) -> Result<StudyArea, Error> {
        if city == self.area.name {
            Ok(self.area.clone())
        } else {
            Err(Error::NotFound(format!("no boundary for '{city}'")))
        }
    }
}

/// Road network lookup answering for a single city
pub struct FixedNetwork {
    pub city: String,
    pub graph: StreetGraph,
}

impl RoadNetworkProvider for FixedNetwork {
    fn fetch_graph(&self, city: &str, _speeds: &SpeedTable) -> Result<StreetGraph, Error> {
        if city == self.city {
            Ok(self.graph.clone())
        } else {
            Err(Error::NotFound(format!("no network for '{city}'")))
        }
    }
}

/// Serves one in-memory raster for every path
pub struct FixedRaster {
    pub raster: GridRaster,
}

impl RasterProvider for FixedRaster {
    type Raster = GridRaster;

    fn open_raster(&self, _path: &Path) -> Result<GridRaster, Error> {
        Ok(self.raster.clone())
    }
}

/// Population raster over the grid area: the western half is empty, the
/// eastern half populated.
pub fn half_populated_raster(size: usize) -> GridRaster {
    let pad = SPACING / 2.0;
    let cells = size * 2;
    let pixel = (SPACING * (size - 1) as f64 + 2.0 * pad) / cells as f64;
    let origin = (ORIGIN.0 - pad, ORIGIN.1 - pad + pixel * cells as f64);
    let values = (0..cells * cells)
        .map(|i| if i % cells < cells / 2 { 0.0 } else { 250.0 })
        .collect();
    GridRaster::new(origin, (pixel, pixel), cells, cells, values, Some(-1.0)).unwrap()
}
