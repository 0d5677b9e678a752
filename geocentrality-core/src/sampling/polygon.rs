//! Uniform random points inside an arbitrary boundary by rejection sampling.
//!
//! Candidates are drawn uniformly from the bounding box and kept when they
//! fall inside the boundary. The expected number of draws per accepted point
//! is `1 / fill_ratio`, so throughput is proportional to how much of its
//! bounding box the boundary covers; long thin or strongly concave cities
//! are the slow case.

use geo::Point;
use log::{debug, info, warn};
use rand::Rng;

use crate::model::{PointSet, SamplePoint, StudyArea};
use crate::Error;

pub const DEFAULT_MAX_REJECTIONS: usize = 10_000;

#[derive(Debug, Clone, Copy)]
pub struct PolygonSampler {
    /// Consecutive rejected candidates tolerated before giving up
    pub max_rejections: usize,
}

impl Default for PolygonSampler {
    fn default() -> Self {
        Self {
            max_rejections: DEFAULT_MAX_REJECTIONS,
        }
    }
}

impl PolygonSampler {
    pub fn new(max_rejections: usize) -> Self {
        Self { max_rejections }
    }

    /// Draws exactly `count` points inside `area`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] when `count` is zero, [`Error::NoData`] when
    /// `max_rejections` candidates in a row land outside the boundary.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        area: &StudyArea,
        count: usize,
        rng: &mut R,
    ) -> Result<PointSet, Error> {
        if count == 0 {
            return Err(Error::InvalidInput(
                "number of points to sample must be positive".to_string(),
            ));
        }

        let fill_ratio = area.fill_ratio();
        info!(
            "Sampling {count} random points within '{}' (fill ratio {fill_ratio:.3})",
            area.name
        );
        if fill_ratio < 0.05 {
            warn!(
                "Boundary of '{}' covers only {:.1}% of its bounding box, sampling will be slow",
                area.name,
                fill_ratio * 100.0
            );
        }

        let bbox = area.bbox();
        let (min, max) = (bbox.min(), bbox.max());
        let mut points = Vec::with_capacity(count);
        let mut total_draws = 0usize;

        while points.len() < count {
            let mut rejections = 0usize;
            loop {
                total_draws += 1;
                let candidate = Point::new(
                    rng.random_range(min.x..=max.x),
                    rng.random_range(min.y..=max.y),
                );
                if area.contains(&candidate) {
                    points.push(SamplePoint::new(candidate));
                    break;
                }
                rejections += 1;
                if rejections >= self.max_rejections {
                    return Err(Error::NoData(format!(
                        "{rejections} consecutive candidates fell outside '{}'",
                        area.name
                    )));
                }
            }
        }

        debug!("Accepted {count} of {total_draws} candidate points");
        Ok(PointSet::new(points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{MultiPolygon, polygon};
    use rand::{SeedableRng, rngs::StdRng};

    fn l_shape() -> StudyArea {
        // Concave: the upper right quadrant is missing
        let poly = polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 1.0),
            (x: 1.0, y: 1.0),
            (x: 1.0, y: 2.0),
            (x: 0.0, y: 2.0),
        ];
        StudyArea::new("l-shape", MultiPolygon::new(vec![poly])).unwrap()
    }

    #[test]
    fn returns_requested_number_of_points_inside() {
        let area = l_shape();
        let mut rng = StdRng::seed_from_u64(7);
        let points = PolygonSampler::default().sample(&area, 250, &mut rng).unwrap();

        assert_eq!(points.len(), 250);
        assert!(points.iter().all(|p| area.contains(&p.geometry)));
        assert!(points.iter().all(|p| p.weight.is_none()));
    }

    #[test]
    fn zero_count_is_invalid() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = PolygonSampler::default().sample(&l_shape(), 0, &mut rng);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn gives_up_on_sliver_boundaries() {
        // Thin diagonal sliver covering a tiny fraction of its bbox
        let sliver = polygon![
            (x: 0.0, y: 0.0),
            (x: 100.0, y: 100.0),
            (x: 100.0, y: 100.000_001),
        ];
        let area = StudyArea::from_polygon("sliver", sliver).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let result = PolygonSampler::new(50).sample(&area, 10, &mut rng);
        assert!(matches!(result, Err(Error::NoData(_))));
    }
}
