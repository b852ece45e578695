// src/extractors/mod.rs
pub mod detail;
pub mod fields;
pub mod listing;

// Re-export key extraction entry points for convenience
pub use detail::parse_detail;
pub use fields::{parse_area, parse_contact, parse_location, ContactField};
pub use listing::{parse_listing, ListingPage};
