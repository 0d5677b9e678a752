//! Population rasters

mod geotiff;

use geo::{Contains, Point};
use log::debug;

use crate::model::StudyArea;
use crate::Error;

pub use geotiff::{GeoTiffProvider, read_geotiff};

/// Anything that can report a value at a location
pub trait RasterSource {
    /// Cell value at `point`; `None` outside the raster or on nodata cells.
    fn value_at(&self, point: &Point<f64>) -> Option<f64>;
}

/// Single-band, north-up raster held in memory (row-major, top row first)
#[derive(Debug, Clone)]
pub struct GridRaster {
    /// X of the upper left corner
    pub origin_x: f64,
    /// Y of the upper left corner
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub width: usize,
    pub height: usize,
    pub nodata: Option<f64>,
    values: Vec<f64>,
}

impl GridRaster {
    /// # Errors
    ///
    /// Returns [`Error::RasterError`] when the value count does not match
    /// the dimensions or the pixel size is not positive.
    pub fn new(
        origin: (f64, f64),
        pixel_size: (f64, f64),
        width: usize,
        height: usize,
        values: Vec<f64>,
        nodata: Option<f64>,
    ) -> Result<Self, Error> {
        if values.len() != width * height {
            return Err(Error::RasterError(format!(
                "expected {} cell values for a {width}x{height} raster, got {}",
                width * height,
                values.len()
            )));
        }
        if pixel_size.0 <= 0.0 || pixel_size.1 <= 0.0 {
            return Err(Error::RasterError(format!(
                "pixel size must be positive, got {pixel_size:?}"
            )));
        }

        Ok(Self {
            origin_x: origin.0,
            origin_y: origin.1,
            pixel_width: pixel_size.0,
            pixel_height: pixel_size.1,
            width,
            height,
            nodata,
            values,
        })
    }

    fn cell_of(&self, point: &Point<f64>) -> Option<(usize, usize)> {
        let col = ((point.x() - self.origin_x) / self.pixel_width).floor();
        let row = ((self.origin_y - point.y()) / self.pixel_height).floor();
        if col < 0.0 || row < 0.0 || !col.is_finite() || !row.is_finite() {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (col, row) = (col as usize, row as usize);
        (col < self.width && row < self.height).then_some((col, row))
    }

    fn cell_center(&self, col: usize, row: usize) -> Point<f64> {
        #[allow(clippy::cast_precision_loss)]
        Point::new(
            self.origin_x + (col as f64 + 0.5) * self.pixel_width,
            self.origin_y - (row as f64 + 0.5) * self.pixel_height,
        )
    }

    fn is_nodata(&self, value: f64) -> bool {
        value.is_nan() || self.nodata.is_some_and(|nodata| value == nodata)
    }

    /// Crops to the window covering `area` and masks cells whose centre lies
    /// outside the boundary.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoData`] when the area does not overlap the raster.
    pub fn clip_to_polygon(&self, area: &StudyArea) -> Result<Self, Error> {
        let bbox = area.bbox();
        let no_overlap = || Error::NoData(format!("'{}' does not overlap the raster", area.name));

        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let (col_min, col_max, row_min, row_max) = (
            (((bbox.min().x - self.origin_x) / self.pixel_width).floor() as i64).max(0),
            (((bbox.max().x - self.origin_x) / self.pixel_width).ceil() as i64 - 1)
                .min(self.width as i64 - 1),
            (((self.origin_y - bbox.max().y) / self.pixel_height).floor() as i64).max(0),
            (((self.origin_y - bbox.min().y) / self.pixel_height).ceil() as i64 - 1)
                .min(self.height as i64 - 1),
        );
        if col_max < col_min || row_max < row_min {
            return Err(no_overlap());
        }
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let (col_min, col_max, row_min, row_max) = (
            col_min as usize,
            col_max as usize,
            row_min as usize,
            row_max as usize,
        );

        let width = col_max - col_min + 1;
        let height = row_max - row_min + 1;
        let mut values = Vec::with_capacity(width * height);
        for row in row_min..=row_max {
            for col in col_min..=col_max {
                let value = self.values[row * self.width + col];
                if area.boundary().contains(&self.cell_center(col, row)) {
                    values.push(value);
                } else {
                    values.push(f64::NAN);
                }
            }
        }
        debug!("Clipped raster to {width}x{height} cells around '{}'", area.name);

        #[allow(clippy::cast_precision_loss)]
        Self::new(
            (
                self.origin_x + col_min as f64 * self.pixel_width,
                self.origin_y - row_min as f64 * self.pixel_height,
            ),
            (self.pixel_width, self.pixel_height),
            width,
            height,
            values,
            self.nodata,
        )
    }
}

impl RasterSource for GridRaster {
    fn value_at(&self, point: &Point<f64>) -> Option<f64> {
        let (col, row) = self.cell_of(point)?;
        let value = self.values[row * self.width + col];
        (!self.is_nodata(value)).then_some(value)
    }
}
