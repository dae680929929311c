//! Single-flight automation queue.
//!
//! At most one job runs at a time; later submissions wait in a FIFO backlog.
//! A failed or panicking job never stops the queue from advancing.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use designflow_core::DesignRecord;
use serde::Serialize;
use tokio::sync::{broadcast, watch};

use crate::error::AutomationError;
use crate::job::JobExecutor;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueState {
    Idle,
    Busy,
}

/// How a submission was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "submission", rename_all = "camelCase")]
pub enum Submission {
    Started,
    /// 1-based position in the backlog.
    Queued { position: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    pub state: QueueState,
    pub running: Option<String>,
    pub backlog: Vec<String>,
    pub completed: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    Started { record_id: String },
    Finished { record_id: String, ok: bool, error: Option<String> },
    Idle,
}

#[derive(Debug, Default)]
struct QueueInner {
    running: Option<String>,
    backlog: VecDeque<DesignRecord>,
    completed: u64,
    failed: u64,
}

struct Shared {
    executor: Arc<dyn JobExecutor>,
    inner: Mutex<QueueInner>,
    idle_tx: watch::Sender<bool>,
    event_tx: broadcast::Sender<QueueEvent>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: QueueEvent) {
        // No subscribers is fine.
        let _ = self.event_tx.send(event);
    }
}

/// Owns the Idle/Busy state and backlog. Cloning shares the same queue.
#[derive(Clone)]
pub struct AutomationQueue {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for AutomationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutomationQueue").field("snapshot", &self.snapshot()).finish()
    }
}

impl AutomationQueue {
    pub fn new(executor: Arc<dyn JobExecutor>) -> Self {
        let (idle_tx, _) = watch::channel(true);
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                executor,
                inner: Mutex::new(QueueInner::default()),
                idle_tx,
                event_tx,
            }),
        }
    }

    /// Starts `record` now if idle, otherwise appends it to the backlog.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, record: DesignRecord) -> Submission {
        let mut inner = self.shared.lock();
        if inner.running.is_some() {
            tracing::info!(record_id = %record.id, backlog = inner.backlog.len() + 1, "Job queued");
            inner.backlog.push_back(record);
            return Submission::Queued { position: inner.backlog.len() };
        }

        inner.running = Some(record.id.clone());
        self.shared.idle_tx.send_replace(false);
        drop(inner);

        tokio::spawn(drive(Arc::clone(&self.shared), record));
        Submission::Started
    }

    #[must_use]
    pub fn snapshot(&self) -> QueueSnapshot {
        let inner = self.shared.lock();
        QueueSnapshot {
            state: if inner.running.is_some() { QueueState::Busy } else { QueueState::Idle },
            running: inner.running.clone(),
            backlog: inner.backlog.iter().map(|r| r.id.clone()).collect(),
            completed: inner.completed,
            failed: inner.failed,
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        *self.shared.idle_tx.borrow()
    }

    /// Resolves once nothing is running and the backlog is empty.
    pub async fn on_idle(&self) {
        let mut rx = self.shared.idle_tx.subscribe();
        // The sender lives in `shared`, which `self` keeps alive.
        let _ = rx.wait_for(|idle| *idle).await;
    }

    /// Drops every job that has not started yet. The running job finishes normally.
    pub fn cancel_backlog(&self) -> usize {
        let mut inner = self.shared.lock();
        let dropped = inner.backlog.len();
        inner.backlog.clear();
        if dropped > 0 {
            tracing::info!(dropped, "Automation backlog cancelled");
        }
        dropped
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.shared.event_tx.subscribe()
    }
}

/// Runs `first`, then keeps popping the backlog until it is empty.
async fn drive(shared: Arc<Shared>, first: DesignRecord) {
    let mut next = Some(first);
    while let Some(record) = next {
        let record_id = record.id.clone();
        shared.emit(QueueEvent::Started { record_id: record_id.clone() });
        tracing::info!(record_id = %record_id, "Automation job started");

        // A separate task turns a panic into a JoinError instead of killing the driver.
        let executor = Arc::clone(&shared.executor);
        let handle = tokio::spawn(async move { executor.run(&record).await });
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(AutomationError::Panicked(e.to_string())),
        };

        let error = match result {
            Ok(report) => {
                tracing::info!(record_id = %record_id, steps = report.steps.len(), "Automation job finished");
                None
            },
            Err(e) => {
                tracing::warn!(record_id = %record_id, error = %e, "Automation job failed");
                Some(e.to_string())
            },
        };

        next = {
            let mut inner = shared.lock();
            if error.is_some() {
                inner.failed = inner.failed.saturating_add(1);
            } else {
                inner.completed = inner.completed.saturating_add(1);
            }
            let popped = inner.backlog.pop_front();
            inner.running = popped.as_ref().map(|r| r.id.clone());
            if popped.is_none() {
                // Flipped under the lock so a concurrent submit cannot be overwritten.
                shared.idle_tx.send_replace(true);
            }
            popped
        };
        shared.emit(QueueEvent::Finished { record_id, ok: error.is_none(), error });
    }

    shared.emit(QueueEvent::Idle);
    tracing::info!("Automation queue idle");
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
