//! Service layer orchestrating lifecycle operations with audit.
//!
//! `RollService` wraps `RollDb` (raw database access), the injected clock,
//! and the attendance settings. All repo methods are implemented as
//! `impl RollService`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use roll_config::{AttendanceConfig, RollConfig};
use roll_core::clock::{Clock, SystemClock};

use crate::RollDb;
use crate::error::DatabaseError;

/// Orchestrates lifecycle operations against one database handle.
///
/// Every mutation method follows this protocol:
/// 1. Read the clock once
/// 2. Load rows and run guard and state checks
/// 3. Begin an immediate transaction, re-check state, execute SQL
/// 4. Append the audit entry inside the same transaction
/// 5. Commit
pub struct RollService {
    db: RollDb,
    clock: Arc<dyn Clock>,
    attendance: AttendanceConfig,
}

impl RollService {
    /// Open the database named by `config` with the wall clock.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn from_config(config: &RollConfig) -> Result<Self, DatabaseError> {
        let db = RollDb::open_local_with_timeout(
            &config.database.path,
            Duration::from_millis(config.database.busy_timeout_ms),
        )
        .await?;
        Ok(Self::from_db(
            db,
            Arc::new(SystemClock),
            config.attendance.clone(),
        ))
    }

    /// Create from an existing `RollDb`.
    #[must_use]
    pub fn from_db(db: RollDb, clock: Arc<dyn Clock>, attendance: AttendanceConfig) -> Self {
        Self {
            db,
            clock,
            attendance,
        }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &RollDb {
        &self.db
    }

    #[must_use]
    pub const fn attendance(&self) -> &AttendanceConfig {
        &self.attendance
    }

    /// Code lifetime from configuration.
    #[must_use]
    pub fn ttl(&self) -> TimeDelta {
        self.attendance.ttl()
    }

    /// Current instant from the injected clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
