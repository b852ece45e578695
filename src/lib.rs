// src/lib.rs
//! Scrapes regional school ranking sites: resolves a (region, grade) listing
//! page, fetches it through a cache, and parses listing rows and school detail
//! pages into typed records.

pub mod config;
pub mod extractors;
pub mod fetch;
pub mod models;
pub mod rankings;
pub mod routes;
pub mod storage;
pub mod utils;

pub use config::ScraperConfig;
pub use models::{AreaInfo, ListingRecord, LocationInfo, SchoolDetail};
pub use rankings::{DetailOutcome, ListingOutcome, RowFailure, SchoolRankings};
pub use routes::{ParsedUri, RouteKey, RouteTable};
pub use utils::AppError;
