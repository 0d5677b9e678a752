//! Result files: GeoJSON vector data and PNG maps

mod map;
mod vector;

use std::path::Path;

pub use map::{Canvas, ColorRamp, ImageOptions, render, write_png};
pub use vector::write_geojson;
use crate::Error;
use crate::assembly::ScoredGeometryCollection;
use crate::providers::ResultWriter;

/// Writes results to the local file system
#[derive(Debug, Clone, Default)]
pub struct FileResultWriter {
    pub image: ImageOptions,
}

impl FileResultWriter {
    pub fn new(image: ImageOptions) -> Self {
        Self { image }
    }
}

impl ResultWriter for FileResultWriter {
    fn write_image(
        &self,
        records: &ScoredGeometryCollection,
        title: &str,
        path: &Path,
    ) -> Result<(), Error> {
        write_png(records, title, path, &self.image)
    }

    fn write_vector_file(&self, records: &ScoredGeometryCollection, path: &Path) -> Result<(), Error> {
        write_geojson(records, path)
    }
}
