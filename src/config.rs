// src/config.rs
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::routes::{RouteMap, RouteTable};
use crate::utils::error::AppError;

pub const DEFAULT_CACHE_TTL_MINUTES: u64 = 1440;
const DEFAULT_USER_AGENT: &str = concat!("school_rankings/", env!("CARGO_PKG_VERSION"));

pub const ENV_CACHE_TTL: &str = "SCHOOL_CACHE_TTL_MINUTES";
pub const ENV_MAX_CONCURRENT: &str = "SCHOOL_MAX_CONCURRENT";

/// Read-only settings for a scraping session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// How long fetched HTML stays in the cache.
    pub cache_ttl_minutes: u64,
    pub user_agent: String,
    /// Per-request timeout applied by the HTTP transport.
    pub timeout_secs: u64,
    /// Upper bound on detail pages fetched at once.
    pub max_concurrent: usize,
    pub routes: RouteMap,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            cache_ttl_minutes: DEFAULT_CACHE_TTL_MINUTES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            max_concurrent: 4,
            routes: RouteTable::builtin_map(),
        }
    }
}

impl ScraperConfig {
    /// Loads a JSON config file. Missing keys fall back to the defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        let config: ScraperConfig = serde_json::from_str(&raw)?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Defaults, then the optional file, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut config = match path {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides from a key lookup (normally the process environment).
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_CACHE_TTL) {
            self.cache_ttl_minutes = parse_env_number(ENV_CACHE_TTL, &raw)?;
            tracing::debug!("Setting cache TTL to {} minutes from {}", self.cache_ttl_minutes, ENV_CACHE_TTL);
        }
        if let Some(raw) = lookup(ENV_MAX_CONCURRENT) {
            self.max_concurrent = parse_env_number(ENV_MAX_CONCURRENT, &raw)?;
            tracing::debug!("Setting max concurrency to {} from {}", self.max_concurrent, ENV_MAX_CONCURRENT);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.max_concurrent == 0 {
            return Err(AppError::Config("max_concurrent must be at least 1".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::Config("timeout_secs must be at least 1".to_string()));
        }
        for (region, grades) in &self.routes {
            for (grade, url) in grades {
                Url::parse(url).map_err(|e| {
                    AppError::Config(format!("Route {}/{} has an invalid URL '{}': {}", region, grade, url, e))
                })?;
            }
        }
        Ok(())
    }

    pub fn route_table(&self) -> RouteTable {
        RouteTable::from_map(&self.routes)
    }
}

fn parse_env_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{} must be a whole number, got '{}'", key, raw)))
}
