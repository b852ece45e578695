// src/main.rs
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use school_rankings::storage::StorageManager;
use school_rankings::utils::{self, AppError};
use school_rankings::{DetailOutcome, RouteKey, SchoolRankings, ScraperConfig};

/// Command Line Interface for the school rankings scraper
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON config file (routes, cache TTL, timeouts)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the cache TTL in minutes
    #[arg(long, global = true)]
    cache_ttl: Option<u64>,

    /// Override how many detail pages are fetched at once
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Write results under this directory instead of printing them
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Debug-level logging for this crate (ignored when RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the known regions, grades and listing URLs
    Routes,

    /// Fetch the ranked listing for a region and grade
    List {
        /// Region code, e.g. "on"
        #[arg(short, long)]
        region: String,

        /// Grade band, e.g. "elementary"
        #[arg(short, long)]
        grade: String,

        /// Also fetch every school's detail page
        #[arg(short, long)]
        details: bool,
    },

    /// Fetch a single school detail page
    Detail {
        /// Absolute URL of the detail page
        #[arg(short, long)]
        url: String,
    },
}

/// Detail outcome as printed on stdout.
#[derive(Serialize)]
struct PrintedDetail<'a> {
    rank: &'a str,
    link: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a school_rankings::SchoolDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Parse CLI Arguments
    let args = Args::parse();

    // 2. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(args.verbose);
    tracing::debug!("Starting with args: {:?}", args);

    // 3. Build configuration: file/env first, then CLI overrides
    let mut config = ScraperConfig::load(args.config.as_deref())?;
    if let Some(ttl) = args.cache_ttl {
        config.cache_ttl_minutes = ttl;
    }
    if let Some(concurrency) = args.concurrency {
        config.max_concurrent = concurrency;
    }
    config.validate()?;

    let rankings = SchoolRankings::from_config(&config)?;
    let storage = args.output_dir.as_ref().map(StorageManager::new).transpose()?;

    match args.command {
        Command::Routes => {
            for (key, url) in rankings.routes().entries() {
                println!("{}\t{}\t{}", key.region, key.grade, url);
            }
        }
        Command::List { region, grade, details } => {
            let key = RouteKey::new(&region, &grade);
            let listing = rankings.listing(&key).await?;

            if listing.records.is_empty() && !listing.failures.is_empty() {
                return Err(AppError::Processing(format!(
                    "No rows of {} could be parsed ({} failures); the page layout may have changed",
                    listing.url,
                    listing.failures.len()
                )));
            }

            let detail_outcomes: Option<Vec<DetailOutcome>> = if details {
                Some(rankings.details(&listing.records).await)
            } else {
                None
            };

            match &storage {
                Some(storage) => {
                    storage.save_listing(&listing)?;
                    if let Some(outcomes) = &detail_outcomes {
                        storage.save_details(&listing, outcomes)?;
                    }
                    storage.save_metadata(&listing, detail_outcomes.as_deref())?;
                }
                None => match &detail_outcomes {
                    Some(outcomes) => {
                        let printed: Vec<PrintedDetail> = outcomes
                            .iter()
                            .map(|o| PrintedDetail {
                                rank: &o.record.rank,
                                link: &o.record.link,
                                detail: o.result.as_ref().ok(),
                                error: o.result.as_ref().err().map(|e| e.to_string()),
                            })
                            .collect();
                        println!("{}", serde_json::to_string_pretty(&printed)?);
                    }
                    None => println!("{}", serde_json::to_string_pretty(&listing.records)?),
                },
            }

            tracing::info!(
                "Processing finished. Records: {}, skipped rows: {}",
                listing.records.len(),
                listing.failures.len()
            );
        }
        Command::Detail { url } => {
            let detail = rankings.detail(&url).await?;
            match &storage {
                Some(storage) => {
                    storage.save_detail(&detail)?;
                }
                None => println!("{}", serde_json::to_string_pretty(&detail)?),
            }
        }
    }

    Ok(())
}
