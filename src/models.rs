// src/models.rs
use serde::{Deserialize, Serialize};

/// One ranked row of a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub rank: String, // As printed, e.g. "1" or "12/1049"
    pub name: String,
    pub link: String, // Absolute URL of the detail page
    pub city: String,
    pub rating: String,
}

/// Profile of a single school, read from its detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolDetail {
    pub name: String,
    #[serde(rename = "type")]
    pub school_type: String,
    pub address: String,
    pub city: String,
    pub province: String,
    pub postcode: String,
    pub phone: String,
    pub district: String,
    pub website: String,
    pub location: LocationInfo,
}

/// "City, Province Postcode" split into its parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaInfo {
    pub city: String,
    pub province: String,
    pub postcode: String,
}

/// Map centre of the detail page, kept exactly as written in the page script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub lat: String,
    pub lng: String,
}

impl LocationInfo {
    pub fn is_known(&self) -> bool {
        !self.lat.is_empty() && !self.lng.is_empty()
    }
}
