//! Async trait implementation for SQLite `Storage` via `spawn_blocking`.

use async_trait::async_trait;
use designflow_core::DesignRecord;

use crate::Storage;
use crate::error::StorageError;
use crate::traits::DesignStore;

/// Helper: run a blocking closure on the tokio blocking pool.
async fn blocking<F, T>(f: F) -> Result<T, StorageError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StorageError::Blocking(format!("spawn_blocking join error: {e}")))?
}

/// Body-generating macro for async-to-blocking delegation.
///
/// Each argument is annotated with a capture kind:
/// - `@ref arg`: `.clone()` a `&T`, pass as `&arg`
/// - `@str arg`: `.to_owned()` a `&str`, pass as `&arg`
macro_rules! delegate {
    ($self:ident, $method:ident $(, @$kind:ident $arg:ident)*) => {{
        let s = $self.clone();
        $(delegate!(@capture $kind $arg);)*
        blocking(move || s.$method($(delegate!(@pass $kind $arg)),*)).await
    }};
    (@capture ref $arg:ident) => { let $arg = $arg.clone(); };
    (@capture str $arg:ident) => { let $arg = $arg.to_owned(); };
    (@pass ref $arg:ident) => { &$arg };
    (@pass str $arg:ident) => { &$arg };
}

#[async_trait]
impl DesignStore for Storage {
    async fn get(&self, id: &str) -> Result<Option<DesignRecord>, StorageError> {
        delegate!(self, get_design, @str id)
    }
    async fn get_all(&self) -> Result<Vec<DesignRecord>, StorageError> {
        delegate!(self, get_all_designs)
    }
    async fn put(&self, design: &DesignRecord) -> Result<(), StorageError> {
        delegate!(self, put_design, @ref design)
    }
    async fn set_prompt_if_pending(&self, id: &str, prompt: &str) -> Result<bool, StorageError> {
        delegate!(self, set_prompt_if_pending, @str id, @str prompt)
    }
    async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        delegate!(self, delete_design, @str id)
    }
    async fn clear(&self) -> Result<usize, StorageError> {
        delegate!(self, clear_designs)
    }
    async fn append_generated_output(&self, id: &str, output: &str) -> Result<(), StorageError> {
        delegate!(self, append_generated_output, @str id, @str output)
    }
}
