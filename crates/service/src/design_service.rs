//! Import with source-URL dedup, plus plain record management.

use std::sync::Arc;

use designflow_core::{DesignRecord, ImportOutcome, ScrapedDesign};
use designflow_storage::{DesignStore, StorageError};

use crate::ServiceError;

pub struct DesignService {
    store: Arc<dyn DesignStore>,
}

impl DesignService {
    #[must_use]
    pub fn new(store: Arc<dyn DesignStore>) -> Self {
        Self { store }
    }

    async fn find_by_source_url(&self, url: &str) -> Result<Option<DesignRecord>, ServiceError> {
        let all = self.store.get_all().await?;
        Ok(all.into_iter().find(|d| d.has_source_url(url)))
    }

    /// Stores a scraped design unless its source URL is already known.
    ///
    /// First writer wins: a second import of the same URL is a silent no-op
    /// reported as [`ImportOutcome::DuplicateSkipped`], also when two imports race.
    pub async fn import(&self, scrape: &ScrapedDesign) -> Result<ImportOutcome, ServiceError> {
        let valid = scrape.validate()?;

        if let Some(existing) = self.find_by_source_url(valid.source_url()).await? {
            tracing::info!(existing_id = %existing.id, source_url = valid.source_url(), "Duplicate import skipped");
            return Ok(ImportOutcome::DuplicateSkipped { existing_id: existing.id });
        }

        let source_url = valid.source_url().to_owned();
        let record = DesignRecord::from_scraped(valid);
        match self.store.put(&record).await {
            Ok(()) => {
                tracing::info!(record_id = %record.id, source_url = %source_url, "Design imported");
                Ok(ImportOutcome::Imported { record })
            },
            Err(StorageError::Duplicate(msg)) => {
                // Lost the race against a concurrent import of the same URL.
                let existing = self.find_by_source_url(&source_url).await?.ok_or_else(|| {
                    ServiceError::Storage(StorageError::Duplicate(msg))
                })?;
                tracing::info!(existing_id = %existing.id, source_url = %source_url, "Concurrent duplicate import skipped");
                Ok(ImportOutcome::DuplicateSkipped { existing_id: existing.id })
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to store imported design");
                Err(e.into())
            },
        }
    }

    pub async fn list(&self) -> Result<Vec<DesignRecord>, ServiceError> {
        Ok(self.store.get_all().await?)
    }

    pub async fn get(&self, id: &str) -> Result<DesignRecord, ServiceError> {
        self.store.get(id).await?.ok_or_else(|| ServiceError::NotFound(id.to_owned()))
    }

    /// Returns `false` if nothing was deleted.
    pub async fn delete(&self, id: &str) -> Result<bool, ServiceError> {
        let deleted = self.store.delete(id).await?;
        if deleted {
            tracing::info!(record_id = %id, "Design deleted");
        }
        Ok(deleted)
    }

    pub async fn clear(&self) -> Result<usize, ServiceError> {
        let removed = self.store.clear().await?;
        tracing::info!(removed, "All designs cleared");
        Ok(removed)
    }
}
