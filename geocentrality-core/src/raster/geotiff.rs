//! GeoTIFF loading (single band, north-up, pixel-is-area)

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::info;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use super::GridRaster;
use crate::Error;
use crate::model::StudyArea;
use crate::providers::RasterProvider;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const GDAL_NODATA: u16 = 42113;

/// Opens population rasters stored as GeoTIFF files
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoTiffProvider;

impl RasterProvider for GeoTiffProvider {
    type Raster = GridRaster;

    fn open_raster(&self, path: &Path) -> Result<GridRaster, Error> {
        read_geotiff(path)
    }

    fn open_raster_within(&self, path: &Path, area: &StudyArea) -> Result<GridRaster, Error> {
        read_geotiff(path)?.clip_to_polygon(area)
    }
}

/// Reads the first band of a GeoTIFF into memory.
///
/// # Errors
///
/// Returns [`Error::IoError`] if the file cannot be opened and
/// [`Error::RasterError`] if it is not a georeferenced TIFF.
pub fn read_geotiff(path: &Path) -> Result<GridRaster, Error> {
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open raster '{}': {}", path.display(), e),
        )
    })?;
    let mut decoder = Decoder::new(BufReader::new(file)).map_err(tiff_error)?;

    let (width, height) = decoder.dimensions().map_err(tiff_error)?;
    let scale = decoder
        .get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_PIXEL_SCALE))
        .map_err(tiff_error)?;
    let tiepoint = decoder
        .get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_TIEPOINT))
        .map_err(tiff_error)?;
    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err(Error::RasterError(format!(
            "'{}' lacks a usable pixel scale / tiepoint",
            path.display()
        )));
    }
    let nodata = decoder
        .find_tag(Tag::from_u16_exhaustive(GDAL_NODATA))
        .map_err(tiff_error)?
        .and_then(|value| value.into_string().ok())
        .and_then(|text| text.trim_end_matches('\0').trim().parse::<f64>().ok());

    let (width, height) = (width as usize, height as usize);
    let samples = to_f64(decoder.read_image().map_err(tiff_error)?)?;
    let band_count = samples.len() / (width * height).max(1);
    let values: Vec<f64> = if band_count > 1 {
        samples.into_iter().step_by(band_count).collect()
    } else {
        samples
    };

    let (pixel_width, pixel_height) = (scale[0], scale[1]);
    let origin_x = tiepoint[3] - tiepoint[0] * pixel_width;
    let origin_y = tiepoint[4] + tiepoint[1] * pixel_height;

    info!(
        "Loaded raster {} ({width}x{height}, pixel {pixel_width}x{pixel_height})",
        path.display()
    );

    GridRaster::new(
        (origin_x, origin_y),
        (pixel_width, pixel_height),
        width,
        height,
        values,
        nodata,
    )
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(result: DecodingResult) -> Result<Vec<f64>, Error> {
    let values = match result {
        DecodingResult::U8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::F32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::F64(v) => v,
        #[allow(unreachable_patterns)]
        _ => {
            return Err(Error::RasterError(
                "unsupported raster sample format".to_string(),
            ));
        }
    };
    Ok(values)
}

fn tiff_error(err: tiff::TiffError) -> Error {
    Error::RasterError(err.to_string())
}
