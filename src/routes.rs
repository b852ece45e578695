// src/routes.rs
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::utils::error::{ParseError, RouteError};

/// Listing pages known out of the box: (region, grade, url).
const BUILTIN_ROUTES: &[(&str, &str, &str)] = &[
    ("ab", "elementary", "http://alberta.compareschoolrankings.org/elementary/SchoolsByRankLocationName.aspx"),
    ("ab", "high", "http://alberta.compareschoolrankings.org/high/SchoolsByRankLocationName.aspx"),
    ("bc", "elementary", "http://britishcolumbia.compareschoolrankings.org/elementary/SchoolsByRankLocationName.aspx"),
    ("bc", "secondary", "http://britishcolumbia.compareschoolrankings.org/secondary/SchoolsByRankLocationName.aspx"),
    ("on", "elementary", "http://ontario.compareschoolrankings.org/elementary/SchoolsByRankLocationName.aspx"),
    ("on", "secondary", "http://ontario.compareschoolrankings.org/secondary/SchoolsByRankLocationName.aspx"),
    ("qc", "secondary", "http://quebec.compareschoolrankings.org/secondary/SchoolsByRankLocationName.aspx"),
];

/// Nested region -> grade -> listing URL mapping, as found in config files.
pub type RouteMap = BTreeMap<String, BTreeMap<String, String>>;

/// A (region, grade) request. Both parts are lower-cased on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteKey {
    pub region: String,
    pub grade: String,
}

impl RouteKey {
    pub fn new(region: &str, grade: &str) -> Self {
        Self {
            region: region.trim().to_lowercase(),
            grade: grade.trim().to_lowercase(),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.region, self.grade)
    }
}

/// Read-only lookup from (region, grade) to a listing URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    routes: RouteMap,
}

impl RouteTable {
    /// Builds a table from a nested mapping; keys are normalised to lower case.
    pub fn from_map(map: &RouteMap) -> Self {
        let routes = map
            .iter()
            .map(|(region, grades)| {
                let grades = grades
                    .iter()
                    .map(|(grade, url)| (grade.trim().to_lowercase(), url.clone()))
                    .collect();
                (region.trim().to_lowercase(), grades)
            })
            .collect();
        Self { routes }
    }

    /// The built-in table as a nested mapping.
    pub fn builtin_map() -> RouteMap {
        let mut map = RouteMap::new();
        for (region, grade, url) in BUILTIN_ROUTES {
            map.entry(region.to_string())
                .or_default()
                .insert(grade.to_string(), url.to_string());
        }
        map
    }

    pub fn resolve(&self, key: &RouteKey) -> Result<&str, RouteError> {
        self.routes
            .get(&key.region)
            .and_then(|grades| grades.get(&key.grade))
            .map(String::as_str)
            .ok_or_else(|| RouteError::UnknownRoute {
                region: key.region.clone(),
                grade: key.grade.clone(),
            })
    }

    /// Case-insensitive convenience over [`RouteTable::resolve`].
    pub fn resolve_listing_url(&self, region: &str, grade: &str) -> Result<&str, RouteError> {
        self.resolve(&RouteKey::new(region, grade))
    }

    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    pub fn grades<'a>(&'a self, region: &str) -> impl Iterator<Item = &'a str> {
        self.routes
            .get(&region.trim().to_lowercase())
            .into_iter()
            .flat_map(|grades| grades.keys().map(String::as_str))
    }

    /// All routes in (region, grade) order.
    pub fn entries(&self) -> impl Iterator<Item = (RouteKey, &str)> {
        self.routes.iter().flat_map(|(region, grades)| {
            grades.iter().map(move |(grade, url)| {
                (
                    RouteKey { region: region.clone(), grade: grade.clone() },
                    url.as_str(),
                )
            })
        })
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self { routes: Self::builtin_map() }
    }
}

/// Scheme/host/path split of a page URL, used to absolutise hrefs found on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUri {
    pub scheme: String,
    /// Host, with the port appended when the URL names a non-default one.
    pub host: String,
    pub path: String,
}

impl ParsedUri {
    pub fn parse(url: &str) -> Result<Self, ParseError> {
        let parsed = Url::parse(url).map_err(|e| ParseError::InvalidUri {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let host = parsed.host_str().ok_or_else(|| ParseError::InvalidUri {
            url: url.to_string(),
            message: "URL has no host".to_string(),
        })?;
        let host = match parsed.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        Ok(Self {
            scheme: parsed.scheme().to_string(),
            host,
            path: parsed.path().to_string(),
        })
    }

    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    /// Makes an href absolute against this page's scheme and host.
    ///
    /// Absolute hrefs are returned unchanged, protocol-relative ones take this
    /// page's scheme; anything else is appended to the origin as a root-relative path.
    pub fn absolute(&self, href: &str) -> String {
        let href = href.trim();
        if Url::parse(href).is_ok_and(|u| u.has_host()) {
            return href.to_string();
        }
        if href.starts_with("//") {
            return format!("{}:{}", self.scheme, href);
        }
        if href.starts_with('/') {
            format!("{}{}", self.origin(), href)
        } else {
            format!("{}/{}", self.origin(), href)
        }
    }
}
