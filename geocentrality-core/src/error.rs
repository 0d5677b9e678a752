use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("No usable data: {0}")]
    NoData(String),
    #[error("Route sampling gave up after {attempts} rejected point pairs")]
    RouteSamplingExhausted { attempts: usize },
    #[error("Nothing to aggregate: {0}")]
    EmptyInput(String),
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Raster error: {0}")]
    RasterError(String),
    #[error("Image error: {0}")]
    ImageError(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::NetworkError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidData(err.to_string())
    }
}
