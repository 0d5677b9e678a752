#![forbid(unsafe_code)]

mod cli;
mod output;
mod settings;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use geocentrality_core::export::FileResultWriter;
use geocentrality_core::loading::{
    GeoJsonBoundaryFile, GeoJsonNetworkFile, NominatimProvider, OverpassProvider,
};
use geocentrality_core::pipeline::{Analysis, AnalysisRequest};
use geocentrality_core::providers::{BoundaryProvider, RoadNetworkProvider};
use geocentrality_core::raster::GeoTiffProvider;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::Cli;
use output::RunPaths;
use settings::Settings;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

type Providers = (Box<dyn BoundaryProvider>, Box<dyn RoadNetworkProvider>);

/// Local files where configured, Nominatim and Overpass otherwise
fn providers(settings: &Settings) -> Result<Providers> {
    let input = &settings.input;
    let config = &settings.provider;

    let boundaries: Box<dyn BoundaryProvider> = match &input.boundary_file {
        Some(path) => Box::new(GeoJsonBoundaryFile::new(path)),
        None => Box::new(NominatimProvider::new(config).context("Failed to set up Nominatim")?),
    };
    let network: Box<dyn RoadNetworkProvider> = match (&input.network_file, &input.boundary_file) {
        (Some(path), _) => Box::new(GeoJsonNetworkFile::new(path)),
        (None, Some(path)) => Box::new(
            OverpassProvider::with_boundaries(config, GeoJsonBoundaryFile::new(path))
                .context("Failed to set up Overpass")?,
        ),
        (None, None) => {
            Box::new(OverpassProvider::new(config).context("Failed to set up Overpass")?)
        }
    };
    Ok((boundaries, network))
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let request = AnalysisRequest::new(cli.city, cli.method.into(), cli.metric.into(), cli.routes)?;

    let paths = RunPaths::new(&settings.output.root, &request.run_name());
    paths.create_folders()?;

    let (boundaries, network) = providers(&settings)?;
    let analysis = Analysis {
        boundaries: boundaries.as_ref(),
        network: network.as_ref(),
        rasters: &GeoTiffProvider,
        options: settings.analysis_options()?,
    };
    let result = analysis
        .run(&request)
        .with_context(|| format!("Analysis of '{}' failed", request.city))?;

    let writer = FileResultWriter::new(settings.output.image);
    paths.write_results(&writer, &result, &request.title())?;

    info!(
        "Wrote {} rows to {} and {}",
        result.len(),
        paths.image.display(),
        paths.vector.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
