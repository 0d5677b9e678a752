//! Collaborator interfaces consumed by the analysis pipeline.
//!
//! Implementations live in [`crate::loading`] (boundaries, road networks),
//! [`crate::raster`] (population rasters) and [`crate::export`] (result files).

use std::path::Path;

use crate::Error;
use crate::assembly::ScoredGeometryCollection;
use crate::loading::SpeedTable;
use crate::model::{StreetGraph, StudyArea};
use crate::raster::RasterSource;

/// Resolves a city name to its administrative boundary
pub trait BoundaryProvider {
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the name resolves to nothing.
    fn fetch_boundary(&self, city: &str) -> Result<StudyArea, Error>;
}

/// Loads the drivable street network of a city
pub trait RoadNetworkProvider {
    /// `speeds` supplies the travel speed of edges without a usable
    /// `maxspeed`, from which travel times are derived.
    fn fetch_graph(&self, city: &str, speeds: &SpeedTable) -> Result<StreetGraph, Error>;
}

/// Opens population rasters
pub trait RasterProvider {
    type Raster: RasterSource;

    fn open_raster(&self, path: &Path) -> Result<Self::Raster, Error>;

    /// Opens the raster cropped to `area`. Providers that cannot crop return
    /// the whole raster.
    fn open_raster_within(&self, path: &Path, area: &StudyArea) -> Result<Self::Raster, Error> {
        let _ = area;
        self.open_raster(path)
    }
}

/// Persists the scored geometries of an analysis
pub trait ResultWriter {
    fn write_image(
        &self,
        records: &ScoredGeometryCollection,
        title: &str,
        path: &Path,
    ) -> Result<(), Error>;

    fn write_vector_file(&self, records: &ScoredGeometryCollection, path: &Path)
    -> Result<(), Error>;
}
