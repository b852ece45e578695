// src/rankings.rs
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::config::ScraperConfig;
use crate::extractors::{parse_detail, parse_listing};
use crate::fetch::{HttpTransport, MemoryCache, PageFetcher};
use crate::models::{ListingRecord, SchoolDetail};
use crate::routes::{RouteKey, RouteTable};
use crate::utils::error::{FetchError, ParseError, RouteError, ScrapeError};

/// A listing row that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    pub row: usize,
    pub reason: String,
}

/// Records of one listing page plus the rows that were skipped.
#[derive(Debug, Clone, Serialize)]
pub struct ListingOutcome {
    pub key: RouteKey,
    pub url: String,
    pub records: Vec<ListingRecord>,
    pub failures: Vec<RowFailure>,
}

/// Detail lookup result for one listing record.
#[derive(Debug)]
pub struct DetailOutcome {
    pub record: ListingRecord,
    pub result: Result<SchoolDetail, ScrapeError>,
}

/// Resolves, fetches and parses listing and detail pages.
pub struct SchoolRankings {
    routes: RouteTable,
    fetcher: PageFetcher,
    max_concurrent: usize,
}

impl SchoolRankings {
    pub fn new(routes: RouteTable, fetcher: PageFetcher, max_concurrent: usize) -> Self {
        Self {
            routes,
            fetcher,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Wires the HTTP transport and an in-memory cache from the config.
    pub fn from_config(config: &ScraperConfig) -> Result<Self, FetchError> {
        let transport = Arc::new(HttpTransport::new(config)?);
        let cache = Arc::new(MemoryCache::new());
        let fetcher = PageFetcher::new(transport, cache, config.cache_ttl_minutes);
        Ok(Self::new(config.route_table(), fetcher, config.max_concurrent))
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn listing_url(&self, key: &RouteKey) -> Result<&str, RouteError> {
        self.routes.resolve(key)
    }

    /// Fetches and parses the listing page for `key`.
    ///
    /// Malformed rows are logged and returned as failures next to the good records.
    pub async fn listing(&self, key: &RouteKey) -> Result<ListingOutcome, ScrapeError> {
        let url = self.routes.resolve(key)?.to_string();
        tracing::info!("Fetching {} listing from {}", key, url);

        let html = self.fetcher.fetch(&url).await?;
        let (records, failures) = collect_listing(&html, &url)?;

        for failure in &failures {
            tracing::warn!("Skipping row {} of {}: {}", failure.row, url, failure.reason);
        }
        tracing::info!(
            "Parsed {} records from {} listing ({} rows skipped)",
            records.len(),
            key,
            failures.len()
        );

        Ok(ListingOutcome {
            key: key.clone(),
            url,
            records,
            failures,
        })
    }

    /// Fetches and parses one detail page.
    pub async fn detail(&self, url: &str) -> Result<SchoolDetail, ScrapeError> {
        let html = self.fetcher.fetch(url).await?;
        let detail = parse_detail(&html, url)?;
        tracing::debug!("Parsed detail for '{}' from {}", detail.name, url);
        Ok(detail)
    }

    /// Fetches the detail page of every record, at most `max_concurrent` at a time.
    ///
    /// Outcomes keep the order of `records`; a failed page does not stop the rest.
    pub async fn details(&self, records: &[ListingRecord]) -> Vec<DetailOutcome> {
        let outcomes: Vec<DetailOutcome> = stream::iter(records.iter().cloned())
            .map(|record| async move {
                let result = self.detail(&record.link).await;
                if let Err(error) = &result {
                    tracing::warn!("Failed to fetch detail for '{}' ({}): {}", record.name, record.link, error);
                }
                DetailOutcome { record, result }
            })
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        tracing::info!("Fetched {} detail pages ({} failed)", outcomes.len(), failed);
        outcomes
    }

    /// Listing for `key` followed by all of its detail pages.
    pub async fn listing_with_details(
        &self,
        key: &RouteKey,
    ) -> Result<(ListingOutcome, Vec<DetailOutcome>), ScrapeError> {
        let listing = self.listing(key).await?;
        let details = self.details(&listing.records).await;
        Ok((listing, details))
    }
}

// The parsed DOM is not Send, so it lives and dies inside this sync call.
fn collect_listing(html: &str, url: &str) -> Result<(Vec<ListingRecord>, Vec<RowFailure>), ParseError> {
    let page = parse_listing(html, url)?;
    let mut records = Vec::new();
    let mut failures = Vec::new();

    for result in page.records() {
        match result {
            Ok(record) => records.push(record),
            Err(ParseError::RowParse { row, reason }) => failures.push(RowFailure { row, reason }),
            Err(other) => return Err(other),
        }
    }
    Ok((records, failures))
}
