// src/utils/mod.rs
pub mod error;
pub mod logging;
pub mod text;

pub use error::{AppError, FetchError, ParseError, RouteError, ScrapeError}; // Re-export error types for convenience
