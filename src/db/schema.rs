//! SQL DDL for the embedding cache.
//!
//! Defines the `embeddings` table (one row per memory per model) and
//! `schema_meta`. All DDL uses `IF NOT EXISTS` for idempotent initialization.
//! Changes after v1 belong in [`super::migrations`].

use rusqlite::Connection;

const SCHEMA_SQL: &str = r#"
-- Cached vectors, keyed by memory and model
CREATE TABLE IF NOT EXISTS embeddings (
    memory_id TEXT NOT NULL,
    model TEXT NOT NULL,
    vector BLOB NOT NULL,
    dimensions INTEGER NOT NULL,
    content_hash TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (memory_id, model)
);

CREATE INDEX IF NOT EXISTS idx_embeddings_model ON embeddings(model);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Create the v1 tables if they are missing.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_row_per_memory_and_model() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        let insert = "INSERT INTO embeddings (memory_id, model, vector, dimensions, content_hash, created_at) \
                      VALUES ('a', ?1, x'00000000', 1, 'h', '2026-01-01T00:00:00Z')";
        conn.execute(insert, ["m1"]).unwrap();
        conn.execute(insert, ["m2"]).unwrap();
        assert!(conn.execute(insert, ["m1"]).is_err());

        let version: String = conn
            .query_row("SELECT value FROM schema_meta WHERE key = 'schema_version'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, "1");
    }
}
