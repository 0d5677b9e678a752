//! Static map of scored streets rendered to PNG
//!
//! Streets are drawn on a white canvas in ascending centrality, so the most
//! central ones end up on top, and coloured with a reversed magma ramp (pale
//! for low, dark for high scores). A colour bar on the right shows the range.
//! The title goes into the PNG `Title` text chunk.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use geo::{BoundingRect, Coord, Rect};
use log::info;
use palette::{LinSrgb, Mix, Srgb};
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::assembly::ScoredGeometryCollection;

/// Reversed magma stops, from lowest to highest score
const MAGMA_R: [(u8, u8, u8); 5] = [
    (252, 253, 191),
    (252, 137, 97),
    (183, 55, 121),
    (81, 18, 124),
    (0, 0, 4),
];

const BACKGROUND: [u8; 3] = [255, 255, 255];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageOptions {
    pub width: u32,
    pub height: u32,
    /// Stroke width of street lines in pixels
    pub line_width: u32,
    /// Canvas border left free around the map, in pixels
    pub margin: u32,
    pub colorbar: bool,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            width: 1500,
            height: 1000,
            line_width: 2,
            margin: 40,
            colorbar: true,
        }
    }
}

/// Piecewise linear colour ramp interpolated in linear RGB
#[derive(Debug, Clone)]
pub struct ColorRamp {
    stops: Vec<LinSrgb<f32>>,
}

impl Default for ColorRamp {
    fn default() -> Self {
        Self::new(&MAGMA_R)
    }
}

impl ColorRamp {
    pub fn new(stops: &[(u8, u8, u8)]) -> Self {
        let stops = stops
            .iter()
            .map(|&(r, g, b)| Srgb::new(r, g, b).into_linear())
            .collect();
        Self { stops }
    }

    /// Colour at `t` in `[0, 1]`; values outside are clamped
    pub fn color_at(&self, t: f64) -> [u8; 3] {
        let Some(last) = self.stops.len().checked_sub(1) else {
            return [0, 0, 0];
        };
        #[allow(clippy::cast_possible_truncation)]
        let position = (t.clamp(0.0, 1.0) as f32) * last as f32;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let lower = (position.floor() as usize).min(last.saturating_sub(1));
        let upper = (lower + 1).min(last);
        let color = self.stops[lower].mix(self.stops[upper], position - lower as f32);

        let rgb: Srgb<u8> = Srgb::from_linear(color);
        [rgb.red, rgb.green, rgb.blue]
    }
}

/// RGB raster the map is drawn onto
#[derive(Debug, Clone)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        let pixels = BACKGROUND
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 3;
        Some([
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
        ])
    }

    fn put(&mut self, x: i64, y: i64, color: [u8; 3]) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let offset = (y as usize * self.width as usize + x as usize) * 3;
        self.pixels[offset..offset + 3].copy_from_slice(&color);
    }

    fn stamp(&mut self, x: i64, y: i64, size: u32, color: [u8; 3]) {
        let size = i64::from(size.max(1));
        let start = -(size - 1) / 2;
        for dy in start..start + size {
            for dx in start..start + size {
                self.put(x + dx, y + dy, color);
            }
        }
    }

    /// Straight segment between two pixel positions
    fn line(&mut self, from: (f64, f64), to: (f64, f64), width: u32, color: [u8; 3]) {
        let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs()).ceil().max(1.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = steps as u64;
        for step in 0..=count {
            #[allow(clippy::cast_precision_loss)]
            let t = step as f64 / steps;
            let x = from.0 + (to.0 - from.0) * t;
            let y = from.1 + (to.1 - from.1) * t;
            #[allow(clippy::cast_possible_truncation)]
            self.stamp(x.round() as i64, y.round() as i64, width, color);
        }
    }
}

/// Maps map coordinates into the drawable part of the canvas, keeping the
/// aspect ratio. Longitudes are shrunk by the cosine of the mean latitude
/// when the extent looks geographic.
#[derive(Debug, Clone, Copy)]
struct Projection {
    origin: Coord<f64>,
    x_factor: f64,
    scale: f64,
    offset: (f64, f64),
    map_height: f64,
}

impl Projection {
    fn fit(extent: Rect<f64>, width: f64, height: f64) -> Self {
        let geographic = extent.min().y >= -90.0 && extent.max().y <= 90.0;
        let x_factor = if geographic {
            ((extent.min().y + extent.max().y) / 2.0).to_radians().cos()
        } else {
            1.0
        };
        let span_x = (extent.width() * x_factor).max(f64::EPSILON);
        let span_y = extent.height().max(f64::EPSILON);
        let scale = (width / span_x).min(height / span_y);
        let offset = ((width - span_x * scale) / 2.0, (height - span_y * scale) / 2.0);

        Self {
            origin: extent.min(),
            x_factor,
            scale,
            offset,
            map_height: span_y * scale,
        }
    }

    fn project(&self, coord: Coord<f64>, margin: f64) -> (f64, f64) {
        let x = (coord.x - self.origin.x) * self.x_factor * self.scale;
        let y = (coord.y - self.origin.y) * self.scale;
        (
            margin + self.offset.0 + x,
            margin + self.offset.1 + self.map_height - y,
        )
    }
}

/// Draws `records` onto a new canvas.
pub fn render(records: &ScoredGeometryCollection, options: &ImageOptions) -> Canvas {
    let mut canvas = Canvas::new(options.width, options.height);
    let ramp = ColorRamp::default();
    let margin = f64::from(options.margin);
    let colorbar_space = if options.colorbar { 80.0 } else { 0.0 };
    let map_width = (f64::from(options.width) - 2.0 * margin - colorbar_space).max(1.0);
    let map_height = (f64::from(options.height) - 2.0 * margin).max(1.0);

    let extent = records
        .iter()
        .filter_map(|record| record.geometry.bounding_rect())
        .reduce(|a, b| {
            Rect::new(
                Coord {
                    x: a.min().x.min(b.min().x),
                    y: a.min().y.min(b.min().y),
                },
                Coord {
                    x: a.max().x.max(b.max().x),
                    y: a.max().y.max(b.max().y),
                },
            )
        });

    let (low, high) = records.iter().fold((f64::INFINITY, 0.0_f64), |(lo, hi), r| {
        (lo.min(r.centrality), hi.max(r.centrality))
    });
    let normalize = |value: f64| {
        if high > low {
            (value - low) / (high - low)
        } else {
            1.0
        }
    };

    if let Some(extent) = extent {
        let projection = Projection::fit(extent, map_width, map_height);
        for record in records.by_ascending_centrality() {
            let color = ramp.color_at(normalize(record.centrality));
            for line in &record.geometry {
                for segment in line.lines() {
                    canvas.line(
                        projection.project(segment.start, margin),
                        projection.project(segment.end, margin),
                        options.line_width,
                        color,
                    );
                }
            }
        }
    }

    if options.colorbar {
        draw_colorbar(&mut canvas, &ramp, options);
    }
    canvas
}

fn draw_colorbar(canvas: &mut Canvas, ramp: &ColorRamp, options: &ImageOptions) {
    let bar_width = 24_i64;
    let right = i64::from(options.width) - i64::from(options.margin);
    let top = i64::from(options.margin);
    let bottom = i64::from(options.height) - i64::from(options.margin);
    if bottom <= top || right - bar_width < 0 {
        return;
    }
    #[allow(clippy::cast_precision_loss)]
    let span = (bottom - top) as f64;
    for y in top..bottom {
        #[allow(clippy::cast_precision_loss)]
        let color = ramp.color_at(1.0 - (y - top) as f64 / span);
        for x in right - bar_width..right {
            canvas.put(x, y, color);
        }
    }
}

/// Renders `records` and writes them as an RGB PNG with `title` stored in
/// the `Title` text chunk.
///
/// # Errors
///
/// Returns [`Error::IoError`] if the file cannot be created and
/// [`Error::ImageError`] if encoding fails.
pub fn write_png(
    records: &ScoredGeometryCollection,
    title: &str,
    path: &Path,
    options: &ImageOptions,
) -> Result<(), Error> {
    info!("Plotting {} scored streets to {}", records.len(), path.display());
    let canvas = render(records, options);

    let file = File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), canvas.width, canvas.height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder
        .add_text_chunk("Title".to_string(), title.to_string())
        .map_err(|e| Error::ImageError(e.to_string()))?;

    let mut writer = encoder
        .write_header()
        .map_err(|e| Error::ImageError(e.to_string()))?;
    writer
        .write_image_data(&canvas.pixels)
        .map_err(|e| Error::ImageError(e.to_string()))?;
    writer
        .finish()
        .map_err(|e| Error::ImageError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::centrality::{CentralityRecord, Strategy};
    use crate::model::EdgeId;
    use geo::{LineString, MultiLineString, coord};

    fn collection() -> ScoredGeometryCollection {
        let record = |id, y, centrality| CentralityRecord {
            edge_id: EdgeId(id),
            endpoints: None,
            geometry: MultiLineString::new(vec![LineString::new(vec![
                coord! { x: 8.0, y: y },
                coord! { x: 8.1, y: y },
            ])]),
            centrality,
        };
        ScoredGeometryCollection {
            strategy: Strategy::Empirical,
            records: vec![record(1, 49.0, 1.0), record(2, 49.1, 0.0)],
        }
    }

    #[test]
    fn ramp_runs_from_pale_to_dark() {
        let ramp = ColorRamp::default();
        assert_eq!(ramp.color_at(0.0), [252, 253, 191]);
        assert_eq!(ramp.color_at(1.0), [0, 0, 4]);
        assert_eq!(ramp.color_at(7.0), [0, 0, 4]);
        let mid = ramp.color_at(0.5);
        assert_eq!(mid, [183, 55, 121]);
    }

    #[test]
    fn streets_are_drawn_in_ramp_colours() {
        let options = ImageOptions {
            width: 200,
            height: 200,
            colorbar: false,
            ..ImageOptions::default()
        };
        let canvas = render(&collection(), &options);

        let colors: Vec<[u8; 3]> = (0..canvas.height)
            .filter_map(|y| canvas.pixel(100, y))
            .filter(|c| *c != BACKGROUND)
            .collect();
        assert!(colors.contains(&[0, 0, 4]));
        assert!(colors.contains(&[252, 253, 191]));
    }

    #[test]
    fn png_carries_title() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.png");
        write_png(
            &collection(),
            "Geographical, route type: length",
            &path,
            &ImageOptions::default(),
        )
        .unwrap();

        let decoder = png::Decoder::new(File::open(&path).unwrap());
        let reader = decoder.read_info().unwrap();
        let info = reader.info();
        assert_eq!((info.width, info.height), (1500, 1000));
        assert!(
            info.uncompressed_latin1_text
                .iter()
                .any(|chunk| chunk.keyword == "Title"
                    && chunk.text == "Geographical, route type: length")
        );
    }
}
