//! Migration v2: enforce one record per source URL.
//!
//! Existing duplicates are resolved first-writer-wins (lowest rowid survives).

pub(super) const DEDUP_SQL: &str = "
DELETE FROM designs
WHERE source_url IS NOT NULL
  AND rowid NOT IN (
      SELECT MIN(rowid) FROM designs WHERE source_url IS NOT NULL GROUP BY source_url
  )";

pub(super) const INDEX_SQL: &str = "
CREATE UNIQUE INDEX IF NOT EXISTS idx_designs_source_url
    ON designs(source_url) WHERE source_url IS NOT NULL;
";
