//! # roll-db
//!
//! libSQL storage and the session code lifecycle service for Rollcall.
//!
//! Holds all relational state: users, courses, sections, enrollments, class
//! sessions with their code verifiers, attendance records, and the audit
//! trail. Every lifecycle operation is a method on [`service::RollService`].
//!
//! Uses the `libsql` crate (C `SQLite` fork) in local mode. Cross-process
//! exclusivity rests on `BEGIN IMMEDIATE` transactions plus the schema's
//! unique indexes, not on in-process locks.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;

#[cfg(test)]
mod test_support;

use std::time::Duration;

use error::DatabaseError;
use libsql::{Builder, TransactionBehavior};

/// Default wait on a locked database file.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Central database handle.
///
/// Wraps one libSQL database and one connection. Operations on a handle are
/// sequential; open a second handle on the same file for concurrent writers.
pub struct RollDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl RollDb {
    /// Open a local database at the given path with the default busy timeout.
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        Self::open_local_with_timeout(path, DEFAULT_BUSY_TIMEOUT).await
    }

    /// Open a local database, waiting up to `busy_timeout` on a locked file.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local_with_timeout(
        path: &str,
        busy_timeout: Duration,
    ) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Both pragmas are per-connection in SQLite.
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;
        let mut rows = conn
            .query(
                &format!("PRAGMA busy_timeout = {}", busy_timeout.as_millis()),
                (),
            )
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA busy_timeout: {e}")))?;
        while rows.next().await?.is_some() {}

        let roll_db = Self { db, conn };
        roll_db.run_migrations().await?;
        Ok(roll_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Begin a write transaction that takes the database write lock up front.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the lock cannot be acquired within the
    /// busy timeout.
    pub async fn begin_write(&self) -> Result<libsql::Transaction, DatabaseError> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await?)
    }

    /// Begin a read transaction so multi-query reports see one snapshot.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the transaction cannot be started.
    pub async fn begin_read(&self) -> Result<libsql::Transaction, DatabaseError> {
        Ok(self.conn.transaction().await?)
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"cls-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        generate_id_on(&self.conn, prefix).await
    }
}

/// Generate a prefixed ID on an arbitrary connection or open transaction.
///
/// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
pub(crate) async fn generate_id_on(
    conn: &libsql::Connection,
    prefix: &str,
) -> Result<String, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
            (),
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<String>(0)?)
}

/// Commit `tx` when `result` is `Ok`, otherwise roll it back.
///
/// # Errors
///
/// Returns the original error, or the commit error if committing fails.
pub(crate) async fn finish<T>(
    tx: libsql::Transaction,
    result: Result<T, DatabaseError>,
) -> Result<T, DatabaseError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(error) => {
            if let Err(rollback) = tx.rollback().await {
                tracing::warn!(%rollback, "rollback failed");
            }
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn test_db() -> RollDb {
        RollDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = [
            "users",
            "courses",
            "sections",
            "enrollments",
            "class_sessions",
            "attendance_records",
            "audit_trail",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn one_open_index_exists() {
        let db = test_db().await;
        let mut rows = db
            .conn()
            .query(
                "SELECT name FROM sqlite_master WHERE type='index' AND name=?1",
                ["idx_class_sessions_one_open"],
            )
            .await
            .unwrap();
        assert!(rows.next().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id("cls").await.unwrap();
        assert!(id.starts_with("cls-"), "ID should start with 'cls-': {id}");
        assert_eq!(id.len(), 12, "ID should be 12 chars: {id}");
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn generate_id_unique() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            assert!(ids.insert(db.generate_id("att").await.unwrap()));
        }
    }

    #[tokio::test]
    async fn foreign_keys_enforced() {
        let db = test_db().await;
        let result = db
            .conn()
            .execute(
                "INSERT INTO enrollments (id, section_id, student_id, created_at)
                 VALUES ('enr-1', 'sec-missing', 'usr-missing', '2026-10-15T09:00:00.000000Z')",
                (),
            )
            .await;
        assert!(result.is_err(), "FK violation should be rejected");
    }

    #[tokio::test]
    async fn rollback_discards_writes() {
        let db = test_db().await;
        let tx = db.begin_write().await.unwrap();
        tx.execute(
            "INSERT INTO courses (id, code, title, created_at)
             VALUES ('crs-1', 'CS101', 'Intro', '2026-10-15T09:00:00.000000Z')",
            (),
        )
        .await
        .unwrap();
        let result: Result<(), DatabaseError> =
            finish(tx, Err(DatabaseError::InvalidState("boom".into()))).await;
        assert!(result.is_err());

        let mut rows = db
            .conn()
            .query("SELECT COUNT(*) FROM courses", ())
            .await
            .unwrap();
        let count: i64 = rows.next().await.unwrap().unwrap().get(0).unwrap();
        assert_eq!(count, 0);
    }
}
