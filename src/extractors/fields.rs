// src/extractors/fields.rs
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{AreaInfo, LocationInfo};
use crate::utils::error::ParseError;
use crate::utils::text::strip_whitespace;

// Bing Maps initialiser embedded in the detail page head, e.g.
// `center: new Microsoft.Maps.Location(43.65, -79.38)`
static MAP_CENTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"center:\s*new\s+Microsoft\.Maps\.Location\(\s*([^,()\s]+)\s*,\s*([^,()\s]+)\s*\)")
        .expect("Failed to compile MAP_CENTER_RE")
});

/// Labelled contact lines on the detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Phone,
    District,
}

impl ContactField {
    pub fn label(self) -> &'static str {
        match self {
            ContactField::Phone => "Phone Number:",
            ContactField::District => "School District:",
        }
    }
}

/// Splits "City, Province Postcode" (postcode optional).
pub fn parse_area(line: &str) -> Result<AreaInfo, ParseError> {
    let (city, rest) = line
        .split_once(',')
        .ok_or_else(|| ParseError::AreaFormat(line.to_string()))?;
    let rest = rest.trim();

    let (province, postcode) = match rest.split_once(char::is_whitespace) {
        Some((province, postcode)) => (province, strip_whitespace(postcode)),
        None => (rest, String::new()),
    };

    Ok(AreaInfo {
        city: city.trim().to_string(),
        province: province.to_string(),
        postcode,
    })
}

/// Drops the field's label from the line; unlabelled lines come back trimmed.
pub fn parse_contact(line: &str, field: ContactField) -> String {
    let line = line.trim();
    line.strip_prefix(field.label())
        .unwrap_or(line)
        .trim()
        .to_string()
}

/// Reads the map centre out of the page head text. No match is not an error.
pub fn parse_location(head_text: &str) -> LocationInfo {
    match MAP_CENTER_RE.captures(head_text) {
        Some(caps) => LocationInfo {
            lat: caps[1].to_string(),
            lng: caps[2].to_string(),
        },
        None => {
            tracing::debug!("No map centre found in page head");
            LocationInfo::default()
        }
    }
}
