// Re-export key components
pub use crate::assembly::{DissolveMode, ResultAssembler, ScoredGeometryCollection};
pub use crate::centrality::{
    CentralityRecord, CentralityStrategy, EmpiricalCentrality, ExactCentrality, Strategy,
};
pub use crate::export::{FileResultWriter, ImageOptions};
pub use crate::loading::{
    GeoJsonBoundaryFile, GeoJsonNetworkFile, NominatimProvider, OverpassProvider,
    ProviderConfig, SamplingConfig, SpeedTable,
};
pub use crate::pipeline::{Analysis, AnalysisOptions, AnalysisRequest, Method, PopulationOptions};
pub use crate::providers::{BoundaryProvider, RasterProvider, ResultWriter, RoadNetworkProvider};
pub use crate::raster::{GeoTiffProvider, GridRaster, RasterSource};
pub use crate::routing::{Route, RouteSampler};
pub use crate::sampling::{PolygonSampler, PopulationWeighter};

// Core types for the street network
pub use crate::model::{EdgeId, PointSet, StreetGraph, StudyArea};
pub use crate::{Error, WeightMethod};
