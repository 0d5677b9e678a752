//! Population weighting of sampled points

use log::{info, warn};
use rand::distr::{Distribution, weighted::WeightedIndex};
use rand::{SeedableRng, rngs::StdRng};

use crate::model::{PointSet, SamplePoint};
use crate::raster::RasterSource;
use crate::Error;

pub const DEFAULT_RESAMPLE_SEED: u64 = 42;

#[derive(Debug, Clone, Copy)]
pub struct PopulationWeighter {
    /// Seed of the weighted draw; a fixed seed keeps runs reproducible
    pub seed: u64,
}

impl Default for PopulationWeighter {
    fn default() -> Self {
        Self {
            seed: DEFAULT_RESAMPLE_SEED,
        }
    }
}

impl PopulationWeighter {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Attaches the raster value at each point as its weight. Points outside
    /// the built-up area (value missing or not positive) are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoData`] when no point survives.
    pub fn sample_raster<R: RasterSource + ?Sized>(
        &self,
        points: &PointSet,
        raster: &R,
    ) -> Result<PointSet, Error> {
        info!("Sampling population values at {} points", points.len());

        let weighted: PointSet = points
            .iter()
            .filter_map(|point| {
                raster
                    .value_at(&point.geometry)
                    .filter(|value| *value > 0.0)
                    .map(|value| SamplePoint::with_weight(point.geometry, value))
            })
            .collect();

        let dropped = points.len() - weighted.len();
        if weighted.is_empty() {
            return Err(Error::NoData(format!(
                "none of {} points has a positive population value",
                points.len()
            )));
        }
        if dropped > 0 {
            warn!("Dropped {dropped} points outside the built-up area");
        }
        Ok(weighted)
    }

    /// Draws `count` points with replacement, each with probability
    /// proportional to its weight.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when `count` is zero or the weights
    /// do not sum to a positive finite value.
    pub fn weighted_resample(&self, points: &PointSet, count: usize) -> Result<PointSet, Error> {
        if count == 0 {
            return Err(Error::InvalidInput(
                "number of weighted points must be positive".to_string(),
            ));
        }
        let weights: Vec<f64> = points
            .iter()
            .map(|point| point.weight.unwrap_or(0.0).max(0.0))
            .collect();
        let total: f64 = weights.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "total population weight must be positive, got {total}"
            )));
        }

        let distribution = WeightedIndex::new(&weights)
            .map_err(|e| Error::InvalidInput(format!("invalid population weights: {e}")))?;
        let mut rng = StdRng::seed_from_u64(self.seed);

        let selected: PointSet = (0..count)
            .map(|_| points.as_slice()[distribution.sample(&mut rng)])
            .collect();

        info!("Selected {count} points weighted by population");
        Ok(selected)
    }
}
