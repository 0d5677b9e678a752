use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use geocentrality_core::WeightMethod;
use geocentrality_core::pipeline::Method;

#[derive(Parser, Debug)]
#[command(
    name = "geocentrality",
    version,
    about = "Betweenness centrality of a city's street network",
    after_help = "EXAMPLES:\n    geocentrality Heidelberg geographical travel_time 500\n    geocentrality Heidelberg networkx length 1 --config geocentrality.toml"
)]
pub struct Cli {
    /// City to analyse, resolved through the geocoder
    pub city: String,

    /// Centrality method
    #[arg(value_enum)]
    pub method: MethodArg,

    /// Edge weight used for shortest paths
    #[arg(value_enum)]
    pub metric: MetricArg,

    /// Number of random routes to sample
    #[arg(value_parser = parse_routes)]
    pub routes: usize,

    /// Settings file (TOML)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum MethodArg {
    /// Traversal frequency of routes between uniformly random points
    #[value(name = "geographical")]
    Geographical,
    /// As geographical, with points weighted by a population raster
    #[value(name = "geographicalPop")]
    GeographicalPop,
    /// Exact edge betweenness over the whole graph
    #[value(name = "networkx")]
    Networkx,
}

impl From<MethodArg> for Method {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Geographical => Method::Geographical,
            MethodArg::GeographicalPop => Method::GeographicalPop,
            MethodArg::Networkx => Method::Networkx,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum MetricArg {
    #[value(name = "length")]
    Length,
    #[value(name = "travel_time")]
    TravelTime,
}

impl From<MetricArg> for WeightMethod {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Length => WeightMethod::Length,
            MetricArg::TravelTime => WeightMethod::TravelTime,
        }
    }
}

fn parse_routes(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("number of routes must be positive".to_string()),
        Ok(routes) => Ok(routes),
        Err(e) => Err(format!("'{raw}' is not a number of routes: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positional_arguments() {
        let cli = Cli::try_parse_from([
            "geocentrality",
            "Heidelberg",
            "geographicalPop",
            "travel_time",
            "50",
        ])
        .unwrap();
        assert_eq!(cli.city, "Heidelberg");
        assert_eq!(Method::from(cli.method), Method::GeographicalPop);
        assert_eq!(WeightMethod::from(cli.metric), WeightMethod::TravelTime);
        assert_eq!(cli.routes, 50);
        assert!(cli.config.is_none());
    }

    #[test]
    fn accepts_config_flag() {
        let cli = Cli::try_parse_from([
            "geocentrality",
            "Heidelberg",
            "networkx",
            "length",
            "1",
            "--config",
            "settings.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("settings.toml")));
    }

    #[test]
    fn rejects_bad_arguments() {
        let cases: [&[&str]; 5] = [
            &["geocentrality", "Heidelberg", "geographical", "length"],
            &["geocentrality", "Heidelberg", "shortest", "length", "10"],
            &["geocentrality", "Heidelberg", "geographical", "time", "10"],
            &["geocentrality", "Heidelberg", "geographical", "length", "0"],
            &["geocentrality", "Heidelberg", "geographical", "length", "ten"],
        ];
        for args in cases {
            let err = Cli::try_parse_from(args).unwrap_err();
            assert!(err.use_stderr(), "{args:?} should fail");
        }
    }

    #[test]
    fn help_is_not_an_error() {
        let err = Cli::try_parse_from(["geocentrality", "--help"]).unwrap_err();
        assert!(!err.use_stderr());
    }
}
