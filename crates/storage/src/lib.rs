//! Storage layer for designflow
//!
//! SQLite-backed record store for imported designs. Every public operation
//! runs in its own transaction on a pooled connection.

mod error;
mod migrations;
mod sqlite_async;
mod storage;
#[cfg(test)]
mod tests;
pub mod traits;

pub use error::StorageError;
pub use storage::Storage;
pub use traits::DesignStore;
