//! Test utilities and module declarations for storage tests.

use crate::Storage;
use designflow_core::{DesignRecord, ScrapedDesign};
use tempfile::TempDir;

pub fn create_test_storage() -> (Storage, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let storage = Storage::new(&db_path).unwrap();
    (storage, temp_dir)
}

pub fn create_test_design(title: &str, source_url: &str) -> DesignRecord {
    let scrape = ScrapedDesign::new(title, "Test Brand", source_url, format!("{source_url}/img.png"));
    DesignRecord::from_scraped(scrape.validate().unwrap())
}
