//! Async storage trait for the design record store.
//!
//! Services depend on this trait rather than on [`crate::Storage`] so the
//! blocking SQLite calls never run on the async executor.

use async_trait::async_trait;
use designflow_core::DesignRecord;

use crate::error::StorageError;

/// Record store keyed by design id.
#[async_trait]
pub trait DesignStore: Send + Sync {
    /// Fetch one design, `None` if absent.
    async fn get(&self, id: &str) -> Result<Option<DesignRecord>, StorageError>;

    /// Fetch every design in insertion order.
    async fn get_all(&self) -> Result<Vec<DesignRecord>, StorageError>;

    /// Upsert by id.
    async fn put(&self, design: &DesignRecord) -> Result<(), StorageError>;

    /// Set the prompt unless one is already stored. `false` means nothing was written.
    async fn set_prompt_if_pending(&self, id: &str, prompt: &str) -> Result<bool, StorageError>;

    /// Delete by id. Returns `false` when nothing was deleted.
    async fn delete(&self, id: &str) -> Result<bool, StorageError>;

    /// Delete every design.
    async fn clear(&self) -> Result<usize, StorageError>;

    /// Append a generated artifact reference to a design.
    async fn append_generated_output(&self, id: &str, output: &str) -> Result<(), StorageError>;
}
