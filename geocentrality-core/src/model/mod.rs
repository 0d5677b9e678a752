//! Data model for street centrality analysis
//!
//! Contains the study area, sampled points and the street network.

pub mod area;
pub mod osmid;
pub mod points;
pub mod streets;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use area::StudyArea;
pub use osmid::{EdgeId, RawOsmId};
pub use points::{PointSet, SamplePoint};
pub use streets::{NewEdge, StreetEdge, StreetGraph, StreetNode};

/// Edge attribute used as shortest-path weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightMethod {
    Length,
    TravelTime,
}

impl WeightMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            WeightMethod::Length => "length",
            WeightMethod::TravelTime => "travel_time",
        }
    }
}

impl fmt::Display for WeightMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightMethod {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "length" => Ok(WeightMethod::Length),
            "travel_time" => Ok(WeightMethod::TravelTime),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown weight metric '{other}', expected length or travel_time"
            ))),
        }
    }
}
