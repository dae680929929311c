use chrono::{DateTime, Utc};
use designflow_core::DesignRecord;
use rusqlite::{OptionalExtension as _, TransactionBehavior, params};

use super::{Storage, get_conn, log_row_error, parse_json};
use crate::error::StorageError;

const SELECT_COLUMNS: &str =
    "SELECT id, title, brand, source_url, images, prompt, generated_outputs, created_at FROM designs";

fn row_to_design(row: &rusqlite::Row<'_>) -> rusqlite::Result<DesignRecord> {
    let created_at = DateTime::parse_from_rfc3339(&row.get::<_, String>(7)?)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
        })?
        .with_timezone(&Utc);
    Ok(DesignRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        brand: row.get(2)?,
        source_url: row.get(3)?,
        images: parse_json(&row.get::<_, String>(4)?)?,
        prompt: row.get(5)?,
        generated_outputs: parse_json(&row.get::<_, String>(6)?)?,
        created_at,
    })
}

impl Storage {
    /// Get a design by id.
    ///
    /// # Errors
    /// Returns error if the query fails or the row is corrupt.
    pub fn get_design(&self, id: &str) -> Result<Option<DesignRecord>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?;
        Ok(stmt.query_row(params![id], row_to_design).optional()?)
    }

    /// Get every design in insertion order.
    ///
    /// Rows that fail to decode are logged and skipped.
    ///
    /// # Errors
    /// Returns error if the query fails.
    pub fn get_all_designs(&self) -> Result<Vec<DesignRecord>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY rowid ASC"))?;
        let designs = stmt.query_map([], row_to_design)?.filter_map(log_row_error).collect();
        Ok(designs)
    }

    /// Insert or replace a design keyed by `id`.
    ///
    /// The row keeps its original insertion position on update.
    ///
    /// # Errors
    /// Returns `StorageError::Duplicate` if another record already owns the
    /// same `source_url`, or a database error.
    pub fn put_design(&self, design: &DesignRecord) -> Result<(), StorageError> {
        let images = serde_json::to_string(&design.images)?;
        let outputs = serde_json::to_string(&design.generated_outputs)?;
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO designs
               (id, title, brand, source_url, images, prompt, generated_outputs, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
               ON CONFLICT(id) DO UPDATE SET
                   title = excluded.title,
                   brand = excluded.brand,
                   source_url = excluded.source_url,
                   images = excluded.images,
                   prompt = excluded.prompt,
                   generated_outputs = excluded.generated_outputs,
                   created_at = excluded.created_at",
            params![
                design.id,
                design.title,
                design.brand,
                design.source_url,
                images,
                design.prompt,
                outputs,
                design.created_at.to_rfc3339(),
            ],
        )?;
        tx.commit()?;
        tracing::debug!(design_id = %design.id, "Design saved");
        Ok(())
    }

    /// Set `prompt` only while it is still unset.
    ///
    /// Returns `false` when the design is missing or already has a prompt;
    /// neither case writes anything.
    ///
    /// # Errors
    /// Returns error if the update fails.
    pub fn set_prompt_if_pending(&self, id: &str, prompt: &str) -> Result<bool, StorageError> {
        let conn = get_conn(&self.pool)?;
        let affected = conn.execute(
            "UPDATE designs SET prompt = ?1 WHERE id = ?2 AND prompt IS NULL",
            params![prompt, id],
        )?;
        if affected > 0 {
            tracing::debug!(design_id = %id, "Prompt saved");
        }
        Ok(affected > 0)
    }

    /// Delete a design. Returns `false` if it did not exist.
    ///
    /// # Errors
    /// Returns error if the delete fails.
    pub fn delete_design(&self, id: &str) -> Result<bool, StorageError> {
        let conn = get_conn(&self.pool)?;
        let affected = conn.execute("DELETE FROM designs WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// Delete every design. Returns the number of removed rows.
    ///
    /// # Errors
    /// Returns error if the delete fails.
    pub fn clear_designs(&self) -> Result<usize, StorageError> {
        let conn = get_conn(&self.pool)?;
        let affected = conn.execute("DELETE FROM designs", [])?;
        Ok(affected)
    }

    /// Append one artifact reference to `generated_outputs`.
    ///
    /// # Errors
    /// Returns `StorageError::NotFound` if the design does not exist.
    pub fn append_generated_output(&self, id: &str, output: &str) -> Result<(), StorageError> {
        let mut conn = get_conn(&self.pool)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current: Option<String> = tx
            .query_row("SELECT generated_outputs FROM designs WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;
        let Some(current) = current else {
            return Err(StorageError::NotFound { entity: "design", id: id.to_owned() });
        };
        let mut outputs: Vec<String> = serde_json::from_str(&current)?;
        outputs.push(output.to_owned());
        tx.execute(
            "UPDATE designs SET generated_outputs = ?1 WHERE id = ?2",
            params![serde_json::to_string(&outputs)?, id],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Number of stored designs.
    ///
    /// # Errors
    /// Returns error if the query fails.
    pub fn count_designs(&self) -> Result<usize, StorageError> {
        let conn = get_conn(&self.pool)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM designs", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}
