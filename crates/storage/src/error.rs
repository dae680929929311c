//! Typed error enum for the storage layer.
//!
//! Callers match on specific failure modes (not found, duplicate source URL,
//! driver failures) instead of downcasting opaque boxes.

use rusqlite::ffi;
use thiserror::Error;

/// Storage-layer error with variants covering every expected failure mode.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Row not found for expected-present entity.
    #[error("not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// Unique constraint violation (a second record for the same source URL).
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// SQL failure reported by the SQLite driver.
    #[error("database error: {0}")]
    Database(#[source] rusqlite::Error),

    /// No connection could be taken from the pool.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Row data could not be deserialized into domain type.
    #[error("data corruption: {context}")]
    DataCorruption {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Migration failure.
    #[error("migration error: {0}")]
    Migration(String),

    /// The blocking worker running the query died.
    #[error("blocking task failed: {0}")]
    Blocking(String),
}

impl StorageError {
    /// Whether this error is a unique-constraint violation.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

/// Custom `From<rusqlite::Error>`, not a blanket `#[from]`.
///
/// - `SQLITE_CONSTRAINT_UNIQUE` → `Duplicate`
/// - `FromSqlConversionFailure` → `DataCorruption`
/// - Everything else → `Database`
impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(e, msg)
                if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Self::Duplicate(msg.unwrap_or_else(|| "unique constraint failed".to_owned()))
            },
            rusqlite::Error::FromSqlConversionFailure(column, _, source) => Self::DataCorruption {
                context: format!("column {column}"),
                source,
            },
            other => Self::Database(other),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::DataCorruption {
            context: "JSON serialization/deserialization".to_owned(),
            source: Box::new(err),
        }
    }
}
