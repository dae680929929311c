//! In-memory doubles shared by the service tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use designflow_core::{DesignRecord, ScrapedDesign};
use designflow_llm::{DescriptionGenerator, LlmError};
use designflow_storage::{DesignStore, Storage, StorageError};
use tempfile::TempDir;
use tokio::sync::Barrier;

pub fn create_test_storage() -> (Storage, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let storage = Storage::new(&temp_dir.path().join("test.db")).unwrap();
    (storage, temp_dir)
}

pub fn pending_record(id: &str, image: &str) -> DesignRecord {
    let scrape = ScrapedDesign::new(id, "Brand", format!("https://shop.example/{id}"), image);
    let mut record = DesignRecord::from_scraped(scrape.validate().unwrap());
    record.id = id.to_owned();
    record
}

pub fn analyzed_record(id: &str, prompt: &str) -> DesignRecord {
    let mut record = pending_record(id, "img");
    record.prompt = Some(prompt.to_owned());
    record
}

/// `DesignStore` over a `Vec`, with the same source-URL uniqueness as SQLite.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<DesignRecord>>,
    reject_next_put: AtomicBool,
}

impl MemoryStore {
    pub fn with(records: Vec<DesignRecord>) -> Self {
        Self { records: Mutex::new(records), reject_next_put: AtomicBool::new(false) }
    }

    pub fn reject_next_put_as_duplicate(&self) {
        self.reject_next_put.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl DesignStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Option<DesignRecord>, StorageError> {
        Ok(self.records.lock().unwrap().iter().find(|d| d.id == id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<DesignRecord>, StorageError> {
        Ok(self.records.lock().unwrap().clone())
    }

    async fn put(&self, design: &DesignRecord) -> Result<(), StorageError> {
        if self.reject_next_put.swap(false, Ordering::SeqCst) {
            return Err(StorageError::Duplicate("designs.source_url".to_owned()));
        }
        let mut records = self.records.lock().unwrap();
        let clash = design.source_url.as_deref().is_some_and(|url| {
            records.iter().any(|d| d.id != design.id && d.has_source_url(url))
        });
        if clash {
            return Err(StorageError::Duplicate("designs.source_url".to_owned()));
        }
        match records.iter_mut().find(|d| d.id == design.id) {
            Some(existing) => *existing = design.clone(),
            None => records.push(design.clone()),
        }
        Ok(())
    }

    async fn set_prompt_if_pending(&self, id: &str, prompt: &str) -> Result<bool, StorageError> {
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|d| d.id == id && d.prompt.is_none()) {
            Some(record) => {
                record.prompt = Some(prompt.to_owned());
                Ok(true)
            },
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|d| d.id != id);
        Ok(records.len() < before)
    }

    async fn clear(&self) -> Result<usize, StorageError> {
        let mut records = self.records.lock().unwrap();
        let removed = records.len();
        records.clear();
        Ok(removed)
    }

    async fn append_generated_output(&self, id: &str, output: &str) -> Result<(), StorageError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| StorageError::NotFound { entity: "design", id: id.to_owned() })?;
        record.generated_outputs.push(output.to_owned());
        Ok(())
    }
}

/// Answers `prompt for <image>`; the image `blank` yields an empty answer.
#[derive(Default)]
pub struct CountingGenerator {
    calls: AtomicUsize,
    failing_image: Option<String>,
    barrier: Option<Barrier>,
}

impl CountingGenerator {
    pub fn failing_on(image: &str) -> Self {
        Self { failing_image: Some(image.to_owned()), ..Self::default() }
    }

    /// Every call waits until `n` calls are in flight.
    pub fn with_barrier(mut self, n: usize) -> Self {
        self.barrier = Some(Barrier::new(n));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DescriptionGenerator for CountingGenerator {
    async fn describe(&self, image_url: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        if self.failing_image.as_deref() == Some(image_url) {
            return Err(LlmError::HttpStatus { code: 500, body: "boom".to_owned() });
        }
        if image_url == "blank" {
            return Err(LlmError::EmptyResponse);
        }
        Ok(format!("prompt for {image_url}"))
    }
}
