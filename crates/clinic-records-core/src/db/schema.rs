//! SQLite schema definition.

/// Database schema: a single key-value table holding whole serialized values.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Key-Value Store
-- ============================================================================

CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
