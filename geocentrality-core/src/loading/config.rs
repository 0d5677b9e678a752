use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::routing::sampler::DEFAULT_MAX_ATTEMPTS;
use crate::sampling::polygon::DEFAULT_MAX_REJECTIONS;
use crate::sampling::population::DEFAULT_RESAMPLE_SEED;

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Retry ceilings and seeds of the random stages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Consecutive point-in-polygon rejections before giving up
    pub max_point_attempts: usize,
    /// Consecutive rejected point pairs before route sampling gives up
    pub max_route_attempts: usize,
    /// Seed of point and route sampling; drawn from entropy when unset
    pub seed: Option<u64>,
    /// Seed of the population-weighted resampling
    pub resample_seed: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_point_attempts: DEFAULT_MAX_REJECTIONS,
            max_route_attempts: DEFAULT_MAX_ATTEMPTS,
            seed: None,
            resample_seed: DEFAULT_RESAMPLE_SEED,
        }
    }
}

/// Settings handed to the online boundary and road network providers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub nominatim_url: String,
    pub overpass_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Directory for cached responses; nothing is cached when unset
    pub cache_dir: Option<PathBuf>,
    pub use_cache: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            overpass_url: DEFAULT_OVERPASS_URL.to_string(),
            user_agent: concat!("geocentrality/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 180,
            cache_dir: Some(PathBuf::from("cache")),
            use_cache: true,
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Cache directory in effect, if caching is enabled
    pub fn cache_dir(&self) -> Option<&PathBuf> {
        self.cache_dir.as_ref().filter(|_| self.use_cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: SamplingConfig = serde_json::from_str(r#"{"seed": 7}"#).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.resample_seed, 42);
        assert_eq!(config.max_route_attempts, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn cache_can_be_disabled() {
        let config = ProviderConfig {
            use_cache: false,
            ..ProviderConfig::default()
        };
        assert!(config.cache_dir().is_none());
        assert!(ProviderConfig::default().cache_dir().is_some());
    }
}
