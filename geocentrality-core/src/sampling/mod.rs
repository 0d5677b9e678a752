//! Random point generation inside the study area

pub mod polygon;
pub mod population;

pub use polygon::PolygonSampler;
pub use population::PopulationWeighter;
