use log::info;

use super::config::ProviderConfig;
use super::files::boundary_from_geojson;
use super::http::HttpFetcher;
use crate::Error;
use crate::model::StudyArea;
use crate::providers::BoundaryProvider;

/// Geocodes city names to boundary polygons with Nominatim
#[derive(Debug, Clone)]
pub struct NominatimProvider {
    fetcher: HttpFetcher,
    url: String,
}

impl NominatimProvider {
    /// # Errors
    ///
    /// Returns [`Error::NetworkError`] if the HTTP client cannot be built.
    pub fn new(config: &ProviderConfig) -> Result<Self, Error> {
        Ok(Self {
            fetcher: HttpFetcher::new(config)?,
            url: config.nominatim_url.clone(),
        })
    }
}

impl BoundaryProvider for NominatimProvider {
    fn fetch_boundary(&self, city: &str) -> Result<StudyArea, Error> {
        info!("Starting download of the boundary of '{city}'");
        let request = self.fetcher.client().get(&self.url).query(&[
            ("q", city),
            ("format", "geojson"),
            ("polygon_geojson", "1"),
            ("limit", "5"),
        ]);
        let body = self.fetcher.fetch("nominatim", city, request)?;
        let area = boundary_from_geojson(city, &body)?;
        info!("Boundary of '{city}' downloaded");
        Ok(area)
    }
}
