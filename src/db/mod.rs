//! SQLite storage for the embedding cache.
//!
//! One database file per scope. A file that cannot be opened as a valid cache
//! is moved aside and replaced with an empty one: losing cached vectors only
//! costs recomputation.

pub mod migrations;
pub mod schema;

use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{GraphError, Result};

/// How the cache database came to be usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OpenStatus {
    Opened,
    /// The previous file was unusable and has been moved to `moved_to`.
    Recovered { reason: String, moved_to: PathBuf },
}

/// Open (or create) the cache database at `path`, recovering from corruption.
pub fn open_cache_database(path: impl AsRef<Path>) -> Result<(Connection, OpenStatus)> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| GraphError::io(parent, e))?;
    }

    match try_open(path) {
        Ok(conn) => {
            tracing::debug!(path = %path.display(), "embedding cache opened");
            Ok((conn, OpenStatus::Opened))
        }
        Err(e) => {
            let moved_to = quarantine(path)?;
            tracing::warn!(
                path = %path.display(),
                moved_to = %moved_to.display(),
                error = %e,
                "embedding cache unusable, starting empty"
            );
            let conn = try_open(path)?;
            Ok((
                conn,
                OpenStatus::Recovered {
                    reason: e.to_string(),
                    moved_to,
                },
            ))
        }
    }
}

fn try_open(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.busy_timeout(std::time::Duration::from_millis(5000))?;
    schema::init_schema(&conn)?;
    migrations::run_migrations(&conn)?;

    let check: String = conn.query_row("PRAGMA quick_check", [], |row| row.get(0))?;
    if check != "ok" {
        return Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CORRUPT),
            Some(check),
        ));
    }
    Ok(conn)
}

/// Move a broken database (and its WAL side files) out of the way.
fn quarantine(path: &Path) -> Result<PathBuf> {
    let moved_to = path.with_extension("corrupt");
    if path.exists() {
        std::fs::rename(path, &moved_to).map_err(|e| GraphError::io(path, e))?;
    }
    for suffix in ["-wal", "-shm"] {
        let mut side = path.as_os_str().to_owned();
        side.push(suffix);
        let _ = std::fs::remove_file(PathBuf::from(side));
    }
    Ok(moved_to)
}

/// Open an in-memory cache database with schema and migrations applied.
pub fn open_memory_database() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    schema::init_schema(&conn)?;
    migrations::run_migrations(&conn)?;
    Ok(conn)
}

/// Diagnostics for `doctor`.
#[derive(Debug, Serialize)]
pub struct CacheHealth {
    pub integrity_ok: bool,
    pub integrity_details: String,
    pub schema_version: u32,
    pub embedding_model: Option<String>,
    pub entry_count: usize,
    pub entries_by_model: BTreeMap<String, usize>,
}

pub fn check_cache_health(conn: &Connection) -> Result<CacheHealth> {
    let integrity_details: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
    let schema_version = migrations::get_schema_version(conn)?;
    let embedding_model = migrations::get_embedding_model(conn)?;

    let mut stmt = conn.prepare("SELECT model, COUNT(*) FROM embeddings GROUP BY model ORDER BY model")?;
    let entries_by_model: BTreeMap<String, usize> = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize)))?
        .collect::<rusqlite::Result<_>>()?;

    Ok(CacheHealth {
        integrity_ok: integrity_details == "ok",
        integrity_details,
        schema_version,
        embedding_model,
        entry_count: entries_by_model.values().sum(),
        entries_by_model,
    })
}

/// Little-endian byte encoding of a vector for BLOB storage.
pub fn vector_to_bytes(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|x| x.to_le_bytes()).collect()
}

/// Inverse of [`vector_to_bytes`]. `None` if the length is not a multiple of 4.
pub fn bytes_to_vector(bytes: &[u8]) -> Option<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return None;
    }
    Some(
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    )
}
