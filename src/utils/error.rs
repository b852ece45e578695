// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the pipeline
#[derive(Error, Debug)]
pub enum RouteError {
    #[error("No listing page for region '{region}' and grade '{grade}'")]
    UnknownRoute { region: String, grade: String },
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error {status} for {url}")]
    Http { status: reqwest::StatusCode, url: String },

    #[error("Transport failed for {url}: {message}")]
    Transport { url: String, message: String },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Listing row {row} is malformed: {reason}")]
    RowParse { row: usize, reason: String },

    #[error("Detail page structure not recognised: {0}")]
    DetailStructure(String),

    #[error("Malformed area line '{0}': expected 'City, Province [Postcode]'")]
    AreaFormat(String),

    #[error("Invalid URL '{url}': {message}")]
    InvalidUri { url: String, message: String },
}

/// Failure of a single orchestrated operation (one listing or one detail page).
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Scrape failed: {0}")]
    Scrape(#[from] ScrapeError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}

impl From<RouteError> for AppError {
    fn from(err: RouteError) -> Self {
        AppError::Scrape(err.into())
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        AppError::Scrape(err.into())
    }
}

impl ScrapeError {
    /// Whether the caller may reasonably retry the same operation later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScrapeError::Fetch(_))
    }
}
