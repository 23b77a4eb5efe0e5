//! Status database schema

use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use crate::types::LaurelError;

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

/// Create or migrate the status schema
pub fn init_schema(conn: &Connection) -> Result<(), LaurelError> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Creating status schema v{}", SCHEMA_VERSION);
        conn.execute_batch(STATUS_SCHEMA)
            .map_err(|e| LaurelError::Store(format!("Failed to create status tables: {}", e)))?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version < SCHEMA_VERSION {
        info!("Migrating status schema from v{} to v{}", current_version, SCHEMA_VERSION);
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version > SCHEMA_VERSION {
        return Err(LaurelError::Config(format!(
            "status database is schema v{}, this build understands up to v{}",
            current_version, SCHEMA_VERSION
        )));
    } else {
        info!("Status schema is up to date (v{})", current_version);
    }

    Ok(())
}

/// Current schema version (0 if not initialized)
fn get_schema_version(conn: &Connection) -> Result<i32, LaurelError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
        [],
    )
    .map_err(|e| LaurelError::Store(format!("Failed to create schema_version table: {}", e)))?;

    let version = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
        .optional()?;

    Ok(version.unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), LaurelError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// One row per achievement. The CHECKs pin the per-status field invariants
/// so a bad write fails at the store rather than surfacing later.
const STATUS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS achievement_status (
    id TEXT PRIMARY KEY NOT NULL,
    achievement_id TEXT NOT NULL UNIQUE,
    student_id TEXT NOT NULL,
    status TEXT NOT NULL
        CHECK (status IN ('draft', 'submitted', 'verified', 'rejected', 'deleted')),
    submitted_at TEXT,
    verified_at TEXT,
    verified_by TEXT,
    rejection_note TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,

    CHECK ((status = 'rejected') = (rejection_note IS NOT NULL)),
    CHECK ((status = 'verified') = (verified_at IS NOT NULL)),
    CHECK ((verified_at IS NULL) = (verified_by IS NULL)),
    CHECK ((status IN ('submitted', 'verified', 'rejected')) = (submitted_at IS NOT NULL))
);

CREATE INDEX IF NOT EXISTS idx_status_student ON achievement_status(student_id, status);
"#;
