//! SQLite status record store
//!
//! The status record is the authoritative workflow state. Every transition is
//! a conditional update (`WHERE status = <from>`) executed in a transaction, so
//! two racing transitions on one record cannot both succeed.
//!
//! ## Tables
//!
//! - `achievement_status` - one row per achievement
//! - `schema_version` - migration bookkeeping

pub mod schema;

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::store::StatusStore;
use crate::types::{AchievementStatus, LaurelError, Result, StatusRecord, Transition};

const SELECT_COLUMNS: &str = "id, achievement_id, student_id, status, submitted_at, \
     verified_at, verified_by, rejection_note, created_at, updated_at";

/// SQLite database of status records
pub struct SqliteStatusStore {
    conn: Mutex<Connection>,
}

impl SqliteStatusStore {
    /// Open or create the status database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        info!("Opening status database at {:?}", path);

        let conn = Connection::open(path)
            .map_err(|e| LaurelError::Store(format!("Failed to open SQLite: {}", e)))?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(|e| LaurelError::Store(format!("Failed to set PRAGMA: {}", e)))?;

        Self::with_schema(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        debug!("Opening in-memory status database");

        let conn = Connection::open_in_memory()
            .map_err(|e| LaurelError::Store(format!("Failed to open in-memory SQLite: {}", e)))?;

        Self::with_schema(conn)
    }

    fn with_schema(conn: Connection) -> Result<Self> {
        schema::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run a read against the connection
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| LaurelError::Internal(format!("Lock poisoned: {}", e)))?;
        f(&conn)
    }

    /// Run a write with exclusive access
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| LaurelError::Internal(format!("Lock poisoned: {}", e)))?;
        f(&mut conn)
    }

    /// Number of status records, deleted ones included
    pub fn count(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM achievement_status", [], |row| row.get(0))?;
            Ok(count as u64)
        })
    }
}

fn select_by_achievement(conn: &Connection, achievement_id: &str) -> Result<Option<StatusRecord>> {
    let sql = format!(
        "SELECT {} FROM achievement_status WHERE achievement_id = ?1",
        SELECT_COLUMNS
    );
    let record = conn
        .query_row(&sql, [achievement_id], row_to_record)
        .optional()?;
    Ok(record)
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<StatusRecord> {
    let status: String = row.get(3)?;
    let status = status.parse::<AchievementStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(StatusRecord {
        id: row.get(0)?,
        achievement_id: row.get(1)?,
        student_id: row.get(2)?,
        status,
        submitted_at: row.get(4)?,
        verified_at: row.get(5)?,
        verified_by: row.get(6)?,
        rejection_note: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Column values a transition writes. `None` leaves the column unchanged.
struct TransitionColumns<'a> {
    submitted_at: Option<DateTime<Utc>>,
    verified_at: Option<DateTime<Utc>>,
    verified_by: Option<&'a str>,
    rejection_note: Option<&'a str>,
}

impl<'a> TransitionColumns<'a> {
    fn for_transition(transition: &'a Transition, now: DateTime<Utc>) -> Self {
        let mut columns = Self {
            submitted_at: None,
            verified_at: None,
            verified_by: None,
            rejection_note: None,
        };
        match transition {
            Transition::Submit => columns.submitted_at = Some(now),
            Transition::Verify { verified_by } => {
                columns.verified_at = Some(now);
                columns.verified_by = Some(verified_by.as_str());
            }
            Transition::Reject { note } => columns.rejection_note = Some(note.as_str()),
            Transition::Delete => {}
        }
        columns
    }
}

#[async_trait]
impl StatusStore for SqliteStatusStore {
    async fn create_draft(&self, achievement_id: &str, student_id: &str) -> Result<StatusRecord> {
        let now = Utc::now();
        let record = StatusRecord {
            id: Uuid::new_v4().to_string(),
            achievement_id: achievement_id.to_string(),
            student_id: student_id.to_string(),
            status: AchievementStatus::Draft,
            submitted_at: None,
            verified_at: None,
            verified_by: None,
            rejection_note: None,
            created_at: now,
            updated_at: now,
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO achievement_status
                    (id, achievement_id, student_id, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.id,
                    record.achievement_id,
                    record.student_id,
                    record.status.as_str(),
                    record.created_at,
                    record.updated_at,
                ],
            )?;
            Ok(())
        })?;

        debug!("Created draft status for achievement {}", achievement_id);
        Ok(record)
    }

    async fn get(&self, achievement_id: &str) -> Result<Option<StatusRecord>> {
        self.with_conn(|conn| select_by_achievement(conn, achievement_id))
    }

    async fn transition(
        &self,
        achievement_id: &str,
        transition: &Transition,
    ) -> Result<StatusRecord> {
        let now = Utc::now();
        let columns = TransitionColumns::for_transition(transition, now);

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let changed = tx.execute(
                "UPDATE achievement_status
                 SET status = ?1,
                     submitted_at = COALESCE(?2, submitted_at),
                     verified_at = COALESCE(?3, verified_at),
                     verified_by = COALESCE(?4, verified_by),
                     rejection_note = COALESCE(?5, rejection_note),
                     updated_at = ?6
                 WHERE achievement_id = ?7 AND status = ?8",
                params![
                    transition.to().as_str(),
                    columns.submitted_at,
                    columns.verified_at,
                    columns.verified_by,
                    columns.rejection_note,
                    now,
                    achievement_id,
                    transition.from().as_str(),
                ],
            )?;

            if changed == 0 {
                return Err(LaurelError::ConflictOrNotFound(format!(
                    "achievement {} is not {}",
                    achievement_id,
                    transition.from()
                )));
            }

            let record = select_by_achievement(&tx, achievement_id)?.ok_or_else(|| {
                LaurelError::Inconsistent(format!(
                    "status for {} vanished mid-transaction",
                    achievement_id
                ))
            })?;

            tx.commit()?;
            Ok(record)
        })
    }

    async fn find_by_achievement_ids(
        &self,
        achievement_ids: &[String],
    ) -> Result<Vec<StatusRecord>> {
        if achievement_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; achievement_ids.len()].join(", ");
        let sql = format!(
            "SELECT {} FROM achievement_status WHERE achievement_id IN ({})",
            SELECT_COLUMNS, placeholders
        );

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let records = stmt
                .query_map(params_from_iter(achievement_ids.iter()), row_to_record)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
    }

    async fn achievement_ids_with_status(
        &self,
        status: AchievementStatus,
        student_ids: Option<&[String]>,
    ) -> Result<Vec<String>> {
        let mut binds = vec![status.as_str().to_string()];
        let mut sql = String::from("SELECT achievement_id FROM achievement_status WHERE status = ?");
        if let Some(student_ids) = student_ids {
            if student_ids.is_empty() {
                return Ok(Vec::new());
            }
            let placeholders = vec!["?"; student_ids.len()].join(", ");
            sql.push_str(&format!(" AND student_id IN ({})", placeholders));
            binds.extend(student_ids.iter().cloned());
        }
        sql.push_str(" ORDER BY created_at DESC");

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let ids = stmt
                .query_map(params_from_iter(binds.iter()), |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            Ok(ids)
        })
    }
}
