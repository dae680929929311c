//! Migration v1: designs table

pub(super) const SQL: &str = "
CREATE TABLE IF NOT EXISTS designs (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    brand TEXT NOT NULL,
    source_url TEXT,
    images TEXT NOT NULL DEFAULT '[]',
    prompt TEXT,
    generated_outputs TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_designs_created ON designs(created_at);
";
