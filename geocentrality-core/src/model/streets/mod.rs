//! Street network model

pub mod components;
pub mod network;

pub use components::{StreetEdge, StreetNode};
pub use network::{IndexedPoint, NewEdge, StreetGraph, StreetGraphBuilder};
