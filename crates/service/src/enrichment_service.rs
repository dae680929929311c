//! Fills the `prompt` of pending designs from their primary image.

use std::sync::Arc;

use designflow_core::DesignRecord;
use designflow_llm::DescriptionGenerator;
use designflow_storage::DesignStore;
use futures_util::future::join_all;
use serde::Serialize;

use crate::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum EnrichOutcome {
    Analyzed { prompt: String },
    /// The record already had a prompt; nothing was requested or written.
    AlreadyAnalyzed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentFailure {
    pub record_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentReport {
    pub analyzed: usize,
    pub skipped: usize,
    pub failed: Vec<EnrichmentFailure>,
}

pub struct EnrichmentService {
    store: Arc<dyn DesignStore>,
    generator: Arc<dyn DescriptionGenerator>,
}

impl EnrichmentService {
    #[must_use]
    pub fn new(store: Arc<dyn DesignStore>, generator: Arc<dyn DescriptionGenerator>) -> Self {
        Self { store, generator }
    }

    /// Requests one prompt per pending record, all concurrently.
    ///
    /// A failing record is reported in [`EnrichmentReport::failed`] and stays
    /// pending; it never affects its siblings.
    pub async fn analyze_all(&self) -> Result<EnrichmentReport, ServiceError> {
        let records = self.store.get_all().await?;
        let total = records.len();
        let pending: Vec<DesignRecord> = records.into_iter().filter(DesignRecord::is_pending).collect();
        let mut report =
            EnrichmentReport { skipped: total.saturating_sub(pending.len()), ..EnrichmentReport::default() };

        let results = join_all(pending.iter().map(|record| self.enrich(record))).await;
        for (record, result) in pending.iter().zip(results) {
            match result {
                Ok(EnrichOutcome::Analyzed { .. }) => report.analyzed += 1,
                Ok(EnrichOutcome::AlreadyAnalyzed) => report.skipped += 1,
                Err(e) => {
                    tracing::warn!(record_id = %record.id, error = %e, "Enrichment failed");
                    report.failed.push(EnrichmentFailure {
                        record_id: record.id.clone(),
                        reason: e.to_string(),
                    });
                },
            }
        }

        tracing::info!(
            analyzed = report.analyzed,
            skipped = report.skipped,
            failed = report.failed.len(),
            "Enrichment run finished"
        );
        Ok(report)
    }

    /// Enriches a single record by id.
    pub async fn analyze_one(&self, id: &str) -> Result<EnrichOutcome, ServiceError> {
        let record = self.store.get(id).await?.ok_or_else(|| ServiceError::NotFound(id.to_owned()))?;
        if !record.is_pending() {
            return Ok(EnrichOutcome::AlreadyAnalyzed);
        }
        self.enrich(&record).await
    }

    async fn enrich(&self, record: &DesignRecord) -> Result<EnrichOutcome, ServiceError> {
        let image = record.primary_image().ok_or_else(|| {
            ServiceError::InvalidInput(format!("design {} has no image", record.id))
        })?;
        let prompt = self.generator.describe(image).await?;

        // Conditional write: a concurrent prompt or a delete during the request wins.
        if !self.store.set_prompt_if_pending(&record.id, &prompt).await? {
            if self.store.get(&record.id).await?.is_none() {
                return Err(ServiceError::NotFound(record.id.clone()));
            }
            tracing::debug!(record_id = %record.id, "Prompt set concurrently, discarding result");
            return Ok(EnrichOutcome::AlreadyAnalyzed);
        }
        tracing::info!(record_id = %record.id, "Design analyzed");
        Ok(EnrichOutcome::Analyzed { prompt })
    }
}
