//! Shortest paths and random route sampling over the street graph

pub mod dijkstra;
pub mod route;
pub mod sampler;

pub use route::{Route, RouteSegment};
pub use sampler::{NodeLocator, PathFinder, RouteSampler, SampledRoutes};
