// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::models::SchoolDetail;
use crate::rankings::{DetailOutcome, ListingOutcome};
use crate::utils::error::StorageError;

/// Detail result as written to disk: either the record or the error text.
#[derive(Debug, Serialize)]
struct StoredDetail<'a> {
    link: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a SchoolDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Directory for one listing: /base_dir/region/grade/
    fn listing_dir(&self, listing: &ListingOutcome) -> Result<PathBuf, StorageError> {
        let target_dir = self.base_dir.join(&listing.key.region).join(&listing.key.grade);
        fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        Ok(target_dir)
    }

    /// Saves the listing records as listing.json
    pub fn save_listing(&self, listing: &ListingOutcome) -> Result<PathBuf, StorageError> {
        let file_path = self.listing_dir(listing)?.join("listing.json");
        write_json(&file_path, &listing.records)?;
        tracing::info!("Saved {} listing records to {}", listing.records.len(), file_path.display());
        Ok(file_path)
    }

    /// Saves detail outcomes (in listing order) as details.json
    pub fn save_details(&self, listing: &ListingOutcome, details: &[DetailOutcome]) -> Result<PathBuf, StorageError> {
        let file_path = self.listing_dir(listing)?.join("details.json");
        let stored: Vec<StoredDetail> = details
            .iter()
            .map(|outcome| StoredDetail {
                link: &outcome.record.link,
                detail: outcome.result.as_ref().ok(),
                error: outcome.result.as_ref().err().map(|e| e.to_string()),
            })
            .collect();
        write_json(&file_path, &stored)?;
        tracing::info!("Saved {} detail results to {}", stored.len(), file_path.display());
        Ok(file_path)
    }

    /// Saves metadata about the run in JSON format
    pub fn save_metadata(&self, listing: &ListingOutcome, details: Option<&[DetailOutcome]>) -> Result<PathBuf, StorageError> {
        let file_path = self.listing_dir(listing)?.join("metadata.json");

        let metadata = serde_json::json!({
            "region": listing.key.region,
            "grade": listing.key.grade,
            "source_url": listing.url,
            "record_count": listing.records.len(),
            "row_failures": listing.failures,
            "detail_count": details.map(|d| d.len()),
            "detail_failures": details.map(|d| d.iter().filter(|o| o.result.is_err()).count()),
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });
        write_json(&file_path, &metadata)?;

        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }

    /// Saves a single detail record under /base_dir/details/<slug>.json
    pub fn save_detail(&self, detail: &SchoolDetail) -> Result<PathBuf, StorageError> {
        let target_dir = self.base_dir.join("details");
        fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;

        let file_path = target_dir.join(format!("{}.json", slug(&detail.name)));
        write_json(&file_path, detail)?;
        tracing::info!("Saved detail to {}", file_path.display());
        Ok(file_path)
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    let body = serde_json::to_string_pretty(value)
        .map_err(|e| StorageError::SerializationError(e.to_string()))?;
    fs::write(path, body).map_err(StorageError::IoError)
}

/// File-name-safe form of a school name.
fn slug(name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let slug = slug.trim_matches('_').to_string();
    if slug.is_empty() {
        "school".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListingRecord;
    use crate::rankings::RowFailure;
    use crate::routes::RouteKey;
    use crate::utils::error::{FetchError, ScrapeError};

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("school_rankings_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn record(name: &str, link: &str) -> ListingRecord {
        ListingRecord {
            rank: "1".to_string(),
            name: name.to_string(),
            link: link.to_string(),
            city: "Edmonton".to_string(),
            rating: "9.1".to_string(),
        }
    }

    #[test]
    fn slug_is_file_safe() {
        assert_eq!(slug("St. Mary's Catholic HS"), "st__mary_s_catholic_hs");
        assert_eq!(slug("???"), "school");
    }

    #[test]
    fn saves_listing_details_and_metadata() {
        let dir = temp_dir("listing");
        let storage = StorageManager::new(&dir).unwrap();

        let listing = ListingOutcome {
            key: RouteKey::new("AB", "High"),
            url: "http://alberta.example.org/high/list.aspx".to_string(),
            records: vec![record("Ross Sheppard", "http://a/1"), record("Harry Ainlay", "http://a/2")],
            failures: vec![RowFailure { row: 3, reason: "missing column 4".to_string() }],
        };
        let details = vec![
            DetailOutcome {
                record: listing.records[0].clone(),
                result: Ok(SchoolDetail { name: "Ross Sheppard".to_string(), ..SchoolDetail::default() }),
            },
            DetailOutcome {
                record: listing.records[1].clone(),
                result: Err(ScrapeError::Fetch(FetchError::Transport {
                    url: "http://a/2".to_string(),
                    message: "timed out".to_string(),
                })),
            },
        ];

        let listing_path = storage.save_listing(&listing).unwrap();
        assert_eq!(listing_path, dir.join("ab").join("high").join("listing.json"));
        let saved: Vec<ListingRecord> =
            serde_json::from_str(&fs::read_to_string(&listing_path).unwrap()).unwrap();
        assert_eq!(saved, listing.records);

        let details_path = storage.save_details(&listing, &details).unwrap();
        let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(details_path).unwrap()).unwrap();
        assert_eq!(saved[0]["detail"]["name"], "Ross Sheppard");
        assert!(saved[0].get("error").is_none());
        assert!(saved[1]["error"].as_str().unwrap().contains("timed out"));

        let meta_path = storage.save_metadata(&listing, Some(&details)).unwrap();
        let meta: serde_json::Value = serde_json::from_str(&fs::read_to_string(meta_path).unwrap()).unwrap();
        assert_eq!(meta["record_count"], 2);
        assert_eq!(meta["detail_failures"], 1);
        assert_eq!(meta["row_failures"][0]["row"], 3);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn saves_single_detail_by_name() {
        let dir = temp_dir("detail");
        let storage = StorageManager::new(&dir).unwrap();
        let detail = SchoolDetail { name: "Lord Byng".to_string(), ..SchoolDetail::default() };

        let path = storage.save_detail(&detail).unwrap();
        assert_eq!(path, dir.join("details").join("lord_byng.json"));
        let saved: SchoolDetail = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved, detail);

        fs::remove_dir_all(&dir).unwrap();
    }
}
