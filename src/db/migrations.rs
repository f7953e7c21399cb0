//! Forward-only schema migrations for the cache database.
//!
//! The version lives in `schema_meta`. Each step in [`MIGRATIONS`] upgrades
//! exactly one version inside its own transaction.

use rusqlite::{Connection, OptionalExtension};

/// The schema version that the current binary expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

type Step = fn(&Connection) -> rusqlite::Result<()>;

/// `(version reached, step)`, in order. The base schema is v1.
const MIGRATIONS: &[(u32, Step)] = &[];

fn read_meta(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row("SELECT value FROM schema_meta WHERE key = ?1", [key], |row| row.get(0))
        .optional()
}

fn write_meta(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO schema_meta (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        [key, value],
    )?;
    Ok(())
}

/// Schema version recorded in the database; 0 when missing or unreadable.
pub fn get_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    Ok(read_meta(conn, "schema_version")?
        .and_then(|v| v.parse().ok())
        .unwrap_or(0))
}

/// The model the cache was last populated with, if any.
pub fn get_embedding_model(conn: &Connection) -> rusqlite::Result<Option<String>> {
    read_meta(conn, "embedding_model")
}

pub fn set_embedding_model(conn: &Connection, model: &str) -> rusqlite::Result<()> {
    write_meta(conn, "embedding_model", model)
}

/// Apply every step above the recorded version.
pub fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    let current = get_schema_version(conn)?;
    if current > CURRENT_SCHEMA_VERSION {
        tracing::warn!(
            found = current,
            supported = CURRENT_SCHEMA_VERSION,
            "embedding cache written by a newer version"
        );
        return Ok(());
    }

    for (to, step) in MIGRATIONS.iter().filter(|(to, _)| *to > current) {
        tracing::info!(from = to - 1, to, "migrating embedding cache");
        let tx = conn.unchecked_transaction()?;
        step(&tx)?;
        write_meta(&tx, "schema_version", &to.to_string())?;
        tx.commit()?;
    }
    Ok(())
}
