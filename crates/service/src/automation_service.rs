//! Submits designs to the automation queue and records finished runs.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use designflow_automation::{
    AutomationError, AutomationQueue, JobExecutor, JobReport, QueueSnapshot, Submission,
};
use designflow_core::DesignRecord;
use designflow_storage::DesignStore;
use serde::Serialize;

use crate::ServiceError;

/// Appends a generation reference to the record after each successful job.
struct RecordingExecutor {
    inner: Arc<dyn JobExecutor>,
    store: Arc<dyn DesignStore>,
}

#[async_trait]
impl JobExecutor for RecordingExecutor {
    async fn run(&self, record: &DesignRecord) -> Result<JobReport, AutomationError> {
        let report = self.inner.run(record).await?;
        let reference = format!("{}#{}", report.target_url, Utc::now().to_rfc3339());
        // The submission already happened; a bookkeeping failure does not fail the job.
        if let Err(e) = self.store.append_generated_output(&record.id, &reference).await {
            tracing::warn!(record_id = %record.id, error = %e, "Failed to record generated output");
        }
        Ok(report)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedJob {
    pub record_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedJob {
    pub record_id: String,
    #[serde(flatten)]
    pub submission: Submission,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSubmission {
    pub submitted: Vec<SubmittedJob>,
    pub rejected: Vec<RejectedJob>,
}

pub struct AutomationService {
    store: Arc<dyn DesignStore>,
    queue: AutomationQueue,
}

impl AutomationService {
    #[must_use]
    pub fn new(store: Arc<dyn DesignStore>, executor: Arc<dyn JobExecutor>) -> Self {
        let recording = RecordingExecutor { inner: executor, store: Arc::clone(&store) };
        Self { store, queue: AutomationQueue::new(Arc::new(recording)) }
    }

    #[must_use]
    pub const fn queue(&self) -> &AutomationQueue {
        &self.queue
    }

    async fn load_runnable(&self, id: &str) -> Result<DesignRecord, ServiceError> {
        let record =
            self.store.get(id).await?.ok_or_else(|| ServiceError::NotFound(id.to_owned()))?;
        if record.is_pending() {
            return Err(AutomationError::MissingPrompt(record.id).into());
        }
        Ok(record)
    }

    /// Queues one analyzed design.
    pub async fn start(&self, id: &str) -> Result<Submission, ServiceError> {
        let record = self.load_runnable(id).await?;
        Ok(self.queue.submit(record))
    }

    /// Queues several designs in the given order. Unknown or pending ones are
    /// reported back and do not stop the rest.
    pub async fn start_bulk(&self, ids: &[String]) -> Result<BulkSubmission, ServiceError> {
        let mut result = BulkSubmission::default();
        for id in ids {
            match self.load_runnable(id).await {
                Ok(record) => result
                    .submitted
                    .push(SubmittedJob { record_id: id.clone(), submission: self.queue.submit(record) }),
                Err(e @ (ServiceError::NotFound(_) | ServiceError::Automation(_))) => {
                    result.rejected.push(RejectedJob { record_id: id.clone(), reason: e.to_string() });
                },
                Err(e) => return Err(e),
            }
        }
        tracing::info!(
            submitted = result.submitted.len(),
            rejected = result.rejected.len(),
            "Bulk automation submitted"
        );
        Ok(result)
    }

    #[must_use]
    pub fn status(&self) -> QueueSnapshot {
        self.queue.snapshot()
    }

    pub fn cancel_pending(&self) -> usize {
        self.queue.cancel_backlog()
    }

    pub async fn wait_idle(&self) {
        self.queue.on_idle().await;
    }
}
