//! This module is responsible for loading the study area and the street
//! network, either from the OSM web services or from local files.

mod builder;
mod cache;
mod config;
mod files;
mod http;
mod nominatim;
mod overpass;
mod speeds;

pub use builder::{OsmNode, OsmWay, build_street_graph, haversine_length};
pub use cache::ResponseCache;
pub use config::{DEFAULT_NOMINATIM_URL, DEFAULT_OVERPASS_URL, ProviderConfig, SamplingConfig};
pub use files::{GeoJsonBoundaryFile, GeoJsonNetworkFile, boundary_from_geojson, network_from_geojson};
pub use nominatim::NominatimProvider;
pub use overpass::{OverpassProvider, drive_query, parse_response};
pub use speeds::{SpeedTable, parse_maxspeed, travel_time};
