//! Street network betweenness centrality for cities.
//!
//! Scores streets either empirically, by how many randomly sampled
//! origin-destination routes traverse them, or exactly, by edge betweenness
//! over the complete road graph.

pub mod assembly;
pub mod centrality;
mod error;
pub mod export;
pub mod loading;
pub mod model;
pub mod pipeline;
pub mod prelude;
pub mod providers;
pub mod raster;
pub mod routing;
pub mod sampling;

pub use error::Error;
pub use model::WeightMethod;
