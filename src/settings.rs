//! Optional TOML settings file
//!
//! ```toml
//! [sampling]
//! seed = 7
//!
//! [provider]
//! use_cache = false
//!
//! [speeds]
//! fallback_kph = 25
//! residential = 20
//!
//! [population]
//! raster = "data/population.tif"
//!
//! [output]
//! root = "output"
//! width = 2000
//! dissolve = "by_edge"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use geocentrality_core::assembly::DissolveMode;
use geocentrality_core::export::ImageOptions;
use geocentrality_core::loading::{ProviderConfig, SamplingConfig, SpeedTable};
use geocentrality_core::pipeline::{AnalysisOptions, PopulationOptions};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Looked up in the working directory when no `--config` is given
pub const DEFAULT_SETTINGS_FILE: &str = "geocentrality.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sampling: SamplingConfig,
    pub provider: ProviderConfig,
    pub speeds: SpeedSettings,
    pub population: PopulationOptions,
    pub input: InputSettings,
    pub output: OutputSettings,
}

/// Overrides of the built-in road class speeds, in km/h
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeedSettings {
    #[serde(default)]
    pub fallback_kph: Option<f64>,
    #[serde(flatten)]
    pub classes: BTreeMap<String, f64>,
}

impl SpeedSettings {
    pub fn table(&self) -> Result<SpeedTable> {
        SpeedTable::default()
            .with_overrides(self.classes.clone(), self.fallback_kph)
            .context("Invalid [speeds] settings")
    }
}

/// Local files used instead of the online providers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// GeoJSON with the city boundary
    pub boundary_file: Option<PathBuf>,
    /// GeoJSON with one LineString feature per directed street edge
    pub network_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Folder holding one subfolder per run
    pub root: PathBuf,
    pub dissolve: DissolveMode,
    pub include_untraversed: bool,
    #[serde(flatten)]
    pub image: ImageOptions,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("output"),
            dissolve: DissolveMode::default(),
            include_untraversed: false,
            image: ImageOptions::default(),
        }
    }
}

impl Settings {
    /// Reads `path`, or [`DEFAULT_SETTINGS_FILE`] when `None`. A file that
    /// does not exist yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path.is_some();
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_SETTINGS_FILE));
        if !path.exists() {
            if explicit {
                warn!("Settings file {} not found, using defaults", path.display());
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let settings = Self::parse(&content)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn analysis_options(&self) -> Result<AnalysisOptions> {
        Ok(AnalysisOptions {
            sampling: self.sampling.clone(),
            speeds: self.speeds.table()?,
            population: self.population.clone(),
            dissolve: self.output.dissolve,
            include_untraversed: self.output.include_untraversed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geocentrality_core::pipeline::DEFAULT_OVERSAMPLING;

    #[test]
    fn empty_file_gives_defaults() {
        let settings = Settings::parse("").unwrap();
        assert_eq!(settings.output.root, PathBuf::from("output"));
        assert_eq!(settings.output.dissolve, DissolveMode::ByScore);
        assert_eq!(settings.population.oversampling, DEFAULT_OVERSAMPLING);
        assert!(settings.provider.use_cache);
        assert_eq!(settings.sampling.resample_seed, 42);
        assert_eq!(settings.speeds.table().unwrap(), SpeedTable::default());
    }

    #[test]
    fn sections_override_defaults() {
        let settings = Settings::parse(
            r#"
            [sampling]
            seed = 7
            max_route_attempts = 50

            [speeds]
            fallback_kph = 25
            residential = 20.5
            motorway = 110

            [population]
            raster = "data/population.tif"
            oversampling = 3
            clip = true

            [input]
            boundary_file = "data/town.geojson"

            [output]
            root = "runs"
            width = 800
            dissolve = "by_edge"
            include_untraversed = true
            "#,
        )
        .unwrap();

        assert_eq!(settings.sampling.seed, Some(7));
        assert_eq!(settings.sampling.max_route_attempts, 50);
        let speeds = settings.speeds.table().unwrap();
        assert_eq!(speeds.fallback_kph(), 25.0);
        assert_eq!(speeds.class_speed("residential"), Some(20.5));
        assert_eq!(speeds.class_speed("motorway"), Some(110.0));
        assert_eq!(settings.population.oversampling, 3);
        assert!(settings.population.clip);
        assert_eq!(
            settings.input.boundary_file,
            Some(PathBuf::from("data/town.geojson"))
        );
        assert!(settings.input.network_file.is_none());
        assert_eq!(settings.output.root, PathBuf::from("runs"));
        assert_eq!(settings.output.image.width, 800);
        assert_eq!(settings.output.image.height, ImageOptions::default().height);

        let options = settings.analysis_options().unwrap();
        assert_eq!(options.dissolve, DissolveMode::ByEdge);
        assert!(options.include_untraversed);
    }

    #[test]
    fn non_positive_speed_is_rejected() {
        let settings = Settings::parse("[speeds]\nresidential = 0").unwrap();
        assert!(settings.analysis_options().is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(settings.output.root, PathBuf::from("output"));
    }

    #[test]
    fn reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[output]\nroot = \"elsewhere\"\n").unwrap();
        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.output.root, PathBuf::from("elsewhere"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[output\nroot = 1").unwrap();
        assert!(Settings::load(Some(&path)).is_err());
    }
}
