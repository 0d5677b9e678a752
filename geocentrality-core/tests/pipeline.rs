mod support;

use std::path::PathBuf;

use geocentrality_core::prelude::*;
use support::{FixedBoundary, FixedNetwork, FixedRaster, grid_area, grid_graph, half_populated_raster};

const CITY: &str = "Gridtown";
const SIZE: usize = 6;

struct Fixture {
    boundaries: FixedBoundary,
    network: FixedNetwork,
    rasters: FixedRaster,
}

impl Fixture {
    fn new() -> Self {
        Self {
            boundaries: FixedBoundary {
                area: grid_area(CITY, SIZE),
            },
            network: FixedNetwork {
                city: CITY.to_string(),
                graph: grid_graph(SIZE),
            },
            rasters: FixedRaster {
                raster: half_populated_raster(SIZE),
            },
        }
    }

    fn analysis(&self, options: AnalysisOptions) -> Analysis<'_, FixedRaster> {
        Analysis {
            boundaries: &self.boundaries,
            network: &self.network,
            rasters: &self.rasters,
            options,
        }
    }
}

fn seeded(seed: u64) -> AnalysisOptions {
    let mut options = AnalysisOptions::default();
    options.sampling.seed = Some(seed);
    options.population = PopulationOptions {
        raster: Some(PathBuf::from("population.tif")),
        ..PopulationOptions::default()
    };
    options
}

fn request(method: Method, weight: WeightMethod, routes: usize) -> AnalysisRequest {
    AnalysisRequest::new(CITY, method, weight, routes).unwrap()
}

fn assert_scores_in_range(collection: &ScoredGeometryCollection) {
    for record in collection {
        assert!(
            (0.0..=1.0).contains(&record.centrality),
            "edge {} scored {}",
            record.edge_id,
            record.centrality
        );
    }
}

#[test]
fn geographical_scores_traversed_streets() {
    let fixture = Fixture::new();
    let result = fixture
        .analysis(seeded(1))
        .run(&request(Method::Geographical, WeightMethod::Length, 20))
        .unwrap();

    assert_eq!(result.strategy, Strategy::Empirical);
    assert!(!result.is_empty());
    assert_scores_in_range(&result);
    assert!(result.max_centrality() > 0.0);
    assert!(result.iter().all(|record| record.centrality > 0.0));

    // one row per distinct score, ascending
    let scores: Vec<f64> = result.iter().map(|record| record.centrality).collect();
    assert!(scores.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn same_seed_gives_same_result() {
    let fixture = Fixture::new();
    let request = request(Method::Geographical, WeightMethod::TravelTime, 15);
    let first = fixture.analysis(seeded(9)).run(&request).unwrap();
    let second = fixture.analysis(seeded(9)).run(&request).unwrap();
    assert_eq!(first, second);
}

#[test]
fn untraversed_streets_can_be_kept() {
    let fixture = Fixture::new();
    let mut options = seeded(2);
    options.include_untraversed = true;
    options.dissolve = DissolveMode::ByEdge;
    let result = fixture
        .analysis(options)
        .run(&request(Method::Geographical, WeightMethod::Length, 3))
        .unwrap();

    // 2 * 6 * 5 two-way streets, one row per way id
    assert_eq!(result.len(), 60);
    assert!(result.iter().any(|record| record.centrality == 0.0));
    assert_scores_in_range(&result);
}

#[test]
fn population_weighting_keeps_routes_in_populated_half() {
    let fixture = Fixture::new();
    let mut options = seeded(4);
    options.dissolve = DissolveMode::ByEdge;
    let result = fixture
        .analysis(options)
        .run(&request(Method::GeographicalPop, WeightMethod::Length, 10))
        .unwrap();

    assert_eq!(result.strategy, Strategy::Empirical);
    assert!(!result.is_empty());
    assert_scores_in_range(&result);

    // Origins and destinations snap to the three eastern columns, so no
    // route needs the westernmost street column.
    let west_edge = support::ORIGIN.0 + support::SPACING / 2.0;
    for record in &result {
        let touches_west = record
            .geometry
            .0
            .iter()
            .all(|line| line.0.iter().all(|c| c.x < west_edge));
        assert!(!touches_west, "edge {} lies in the empty half", record.edge_id);
    }
}

#[test]
fn population_method_needs_a_raster() {
    let fixture = Fixture::new();
    let mut options = seeded(5);
    options.population.raster = None;
    let result = fixture
        .analysis(options)
        .run(&request(Method::GeographicalPop, WeightMethod::Length, 5));
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn oversized_oversampling_is_invalid() {
    let fixture = Fixture::new();
    let mut options = seeded(8);
    options.population.oversampling = usize::MAX;
    let result = fixture
        .analysis(options)
        .run(&request(Method::GeographicalPop, WeightMethod::Length, 5));
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[test]
fn empty_raster_is_no_data() {
    let mut fixture = Fixture::new();
    let raster = &fixture.rasters.raster;
    fixture.rasters.raster = GridRaster::new(
        (raster.origin_x, raster.origin_y),
        (raster.pixel_width, raster.pixel_height),
        raster.width,
        raster.height,
        vec![0.0; raster.width * raster.height],
        raster.nodata,
    )
    .unwrap();

    let result = fixture
        .analysis(seeded(6))
        .run(&request(Method::GeographicalPop, WeightMethod::Length, 5));
    assert!(matches!(result, Err(Error::NoData(_))));
}

#[test]
fn networkx_scores_every_directed_edge() {
    let fixture = Fixture::new();
    let result = fixture
        .analysis(AnalysisOptions::default())
        .run(&request(Method::Networkx, WeightMethod::TravelTime, 1))
        .unwrap();

    assert_eq!(result.strategy, Strategy::Exact);
    assert_eq!(result.len(), fixture.network.graph.edge_count());
    assert_scores_in_range(&result);
    assert!(result.max_centrality() > 0.0);
}

#[test]
fn unknown_city_is_not_found() {
    let fixture = Fixture::new();
    let request = AnalysisRequest::new("Atlantis", Method::Geographical, WeightMethod::Length, 5)
        .unwrap();
    assert!(matches!(
        fixture.analysis(seeded(7)).run(&request),
        Err(Error::NotFound(_))
    ));
}
