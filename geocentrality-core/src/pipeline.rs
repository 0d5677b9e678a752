//! End-to-end centrality analysis of one city
//!
//! `geographical`: sample `2 * routes` points in the boundary, route between
//! random pairs and score streets by traversal frequency.
//! `geographicalPop`: as above, but draw `oversampling` times as many points,
//! weight them by the population raster and resample back to `2 * routes`.
//! `networkx`: exact edge betweenness over the whole street graph.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::assembly::{DissolveMode, ResultAssembler, ScoredGeometryCollection};
use crate::centrality::{EmpiricalCentrality, ExactCentrality};
use crate::loading::{SamplingConfig, SpeedTable};
use crate::model::{PointSet, StreetGraph, StudyArea};
use crate::providers::{BoundaryProvider, RasterProvider, RoadNetworkProvider};
use crate::routing::RouteSampler;
use crate::sampling::{PolygonSampler, PopulationWeighter};
use crate::{Error, WeightMethod};

pub const DEFAULT_OVERSAMPLING: usize = 4;

/// Centrality method selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Geographical,
    GeographicalPop,
    Networkx,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Geographical => "geographical",
            Method::GeographicalPop => "geographicalPop",
            Method::Networkx => "networkx",
        }
    }

    /// Name used in plot titles
    pub fn label(self) -> &'static str {
        match self {
            Method::Geographical => "Geographical",
            Method::GeographicalPop => "GeographicalPop",
            Method::Networkx => "NetworkX",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "geographical" => Ok(Method::Geographical),
            "geographicalPop" => Ok(Method::GeographicalPop),
            "networkx" => Ok(Method::Networkx),
            other => Err(Error::InvalidInput(format!(
                "unknown method '{other}', expected geographical, geographicalPop or networkx"
            ))),
        }
    }
}

/// What to analyse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub city: String,
    pub method: Method,
    pub weight: WeightMethod,
    pub routes: usize,
}

impl AnalysisRequest {
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an empty city name and for route
    /// counts that are zero or too large to draw points for.
    pub fn new(
        city: impl Into<String>,
        method: Method,
        weight: WeightMethod,
        routes: usize,
    ) -> Result<Self, Error> {
        let city = city.into();
        if city.trim().is_empty() {
            return Err(Error::InvalidInput("city name is empty".to_string()));
        }
        if routes == 0 {
            return Err(Error::InvalidInput(
                "number of routes must be positive".to_string(),
            ));
        }
        let request = Self {
            city,
            method,
            weight,
            routes,
        };
        request.point_count()?;
        Ok(request)
    }

    /// `<city>_<method>_<metric>_<routes>`, the stem of every output file
    pub fn run_name(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.city, self.method, self.weight, self.routes
        )
    }

    pub fn title(&self) -> String {
        format!("{}, route type: {}", self.method.label(), self.weight)
    }

    /// Number of origin and destination points to draw
    pub fn point_count(&self) -> Result<usize, Error> {
        self.routes.checked_mul(2).ok_or_else(|| {
            Error::InvalidInput(format!("{} routes are too many to sample", self.routes))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationOptions {
    /// GeoTIFF with population counts per cell
    pub raster: Option<PathBuf>,
    /// Candidate points drawn per resampled point
    pub oversampling: usize,
    /// Crop the raster to the boundary before sampling
    pub clip: bool,
}

impl Default for PopulationOptions {
    fn default() -> Self {
        Self {
            raster: None,
            oversampling: DEFAULT_OVERSAMPLING,
            clip: false,
        }
    }
}

/// How to analyse
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    pub sampling: SamplingConfig,
    pub speeds: SpeedTable,
    pub population: PopulationOptions,
    pub dissolve: DissolveMode,
    /// Keep streets no sampled route used, scored 0
    pub include_untraversed: bool,
}

/// Collaborators an analysis pulls its inputs from
pub struct Analysis<'a, P: RasterProvider> {
    pub boundaries: &'a dyn BoundaryProvider,
    pub network: &'a dyn RoadNetworkProvider,
    pub rasters: &'a P,
    pub options: AnalysisOptions,
}

impl<P: RasterProvider> Analysis<'_, P> {
    /// Runs the selected method and returns the validated scored geometries.
    /// Nothing is written; persisting the result is up to the caller.
    ///
    /// # Errors
    ///
    /// Propagates collaborator failures unchanged and fails with the typed
    /// sampling errors once a retry ceiling is hit.
    pub fn run(&self, request: &AnalysisRequest) -> Result<ScoredGeometryCollection, Error> {
        info!(
            "Starting {} analysis of '{}' weighted by {} with {} routes",
            request.method, request.city, request.weight, request.routes
        );
        let assembler = ResultAssembler::new(self.options.dissolve);

        let collection = match request.method {
            Method::Networkx => {
                let graph = self.network.fetch_graph(&request.city, &self.options.speeds)?;
                let centrality = ExactCentrality::from_full_graph(&graph, request.weight)?;
                assembler.assemble(&centrality)?
            }
            Method::Geographical | Method::GeographicalPop => {
                let mut rng = match self.options.sampling.seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_os_rng(),
                };
                let area = self.boundaries.fetch_boundary(&request.city)?;
                let graph = self.network.fetch_graph(&request.city, &self.options.speeds)?;
                let points = match request.method {
                    Method::GeographicalPop => self.population_points(&area, request, &mut rng)?,
                    _ => {
                        self.polygon_sampler()
                            .sample(&area, request.point_count()?, &mut rng)?
                    }
                };
                self.empirical(&graph, &points, request, &mut rng, &assembler)?
            }
        };

        info!(
            "Analysis of '{}' finished with {} scored rows",
            request.city,
            collection.len()
        );
        Ok(collection)
    }

    fn polygon_sampler(&self) -> PolygonSampler {
        PolygonSampler::new(self.options.sampling.max_point_attempts)
    }

    fn population_points<R: Rng + ?Sized>(
        &self,
        area: &StudyArea,
        request: &AnalysisRequest,
        rng: &mut R,
    ) -> Result<PointSet, Error> {
        let population = &self.options.population;
        let Some(path) = &population.raster else {
            return Err(Error::InvalidInput(format!(
                "method {} needs a population raster",
                request.method
            )));
        };
        if population.oversampling == 0 {
            return Err(Error::InvalidInput(
                "population oversampling must be positive".to_string(),
            ));
        }
        let point_count = request.point_count()?;
        let candidate_count = point_count
            .checked_mul(population.oversampling)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "population oversampling {} is too large for {point_count} points",
                    population.oversampling
                ))
            })?;

        let raster = if population.clip {
            self.rasters.open_raster_within(path, area)?
        } else {
            self.rasters.open_raster(path)?
        };
        let candidates = self.polygon_sampler().sample(area, candidate_count, rng)?;
        let weighter = PopulationWeighter::new(self.options.sampling.resample_seed);
        let valued = weighter.sample_raster(&candidates, &raster)?;
        weighter.weighted_resample(&valued, point_count)
    }

    fn empirical<R: Rng + ?Sized>(
        &self,
        graph: &StreetGraph,
        points: &PointSet,
        request: &AnalysisRequest,
        rng: &mut R,
        assembler: &ResultAssembler,
    ) -> Result<ScoredGeometryCollection, Error> {
        let sampler = RouteSampler::new(self.options.sampling.max_route_attempts);
        let sampled = sampler.sample_routes(graph, points, request.routes, request.weight, rng)?;

        let mut centrality = EmpiricalCentrality::from_sampled_routes(&sampled)?;
        if self.options.include_untraversed {
            centrality.include_untraversed(graph);
        }
        assembler.assemble(&centrality)
    }
}
