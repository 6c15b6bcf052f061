//! Class session repository: the lifecycle state machine.
//!
//! ```text
//! create ──► scheduled ──open──► open ──close/expire──► closed
//! ```
//!
//! The verifier column is only ever read by [`load_session_with_verifier`];
//! every public read path returns `ClassSession`, which has no field for it.

use chrono::{DateTime, SubsecRound, Utc};
use roll_core::audit_detail::{ScheduledDetail, StatusChangedDetail};
use roll_core::code::{AccessCode, CodeVerifier};
use roll_core::entities::ClassSession;
use roll_core::enums::{AuditAction, EntityType, Role, SessionStatus};
use roll_core::errors::CoreError;
use roll_core::expiry;
use roll_core::guard::{Actor, Capability, SectionRelations, authorize, is_section_manager};
use roll_core::ids::PREFIX_CLASS_SESSION;
use roll_core::link;
use roll_core::responses::{OpenedSession, StudentOpenSession};

use crate::error::{DatabaseError, is_unique_violation};
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_optional_datetime, to_sql_datetime};
use crate::repos::audit::append_audit_on;
use crate::repos::directory::load_section;
use crate::service::RollService;
use crate::{finish, generate_id_on};

pub(crate) const SELECT_COLS: &str =
    "id, section_id, scheduled_start, scheduled_end, status, opened_at, closed_at, created_at";

pub(crate) fn row_to_session(row: &libsql::Row) -> Result<ClassSession, DatabaseError> {
    Ok(ClassSession {
        id: row.get(0)?,
        section_id: row.get(1)?,
        scheduled_start: parse_datetime(&row.get::<String>(2)?)?,
        scheduled_end: parse_datetime(&row.get::<String>(3)?)?,
        status: parse_enum(&row.get::<String>(4)?)?,
        opened_at: parse_optional_datetime(get_opt_string(row, 5)?.as_deref())?,
        closed_at: parse_optional_datetime(get_opt_string(row, 6)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

pub(crate) async fn load_session(
    conn: &libsql::Connection,
    id: &str,
) -> Result<ClassSession, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM class_sessions WHERE id = ?1"),
            [id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| CoreError::not_found(EntityType::ClassSession, id))?;
    row_to_session(&row)
}

/// The only read of the verifier column. Used by redemption.
pub(crate) async fn load_session_with_verifier(
    conn: &libsql::Connection,
    id: &str,
) -> Result<(ClassSession, Option<CodeVerifier>), DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS}, code_verifier FROM class_sessions WHERE id = ?1"),
            [id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| CoreError::not_found(EntityType::ClassSession, id))?;
    let session = row_to_session(&row)?;
    let verifier = get_opt_string(&row, 8)?.map(CodeVerifier::from_stored);
    Ok((session, verifier))
}

/// Sessions of a section, newest scheduled start first.
pub(crate) async fn load_section_sessions(
    conn: &libsql::Connection,
    section_id: &str,
) -> Result<Vec<ClassSession>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {SELECT_COLS} FROM class_sessions WHERE section_id = ?1
                 ORDER BY scheduled_start DESC, id"
            ),
            [section_id],
        )
        .await?;
    let mut sessions = Vec::new();
    while let Some(row) = rows.next().await? {
        sessions.push(row_to_session(&row)?);
    }
    Ok(sessions)
}

fn invalid_transition(session: &ClassSession, to: SessionStatus) -> DatabaseError {
    CoreError::InvalidTransition {
        entity_type: EntityType::ClassSession.as_str().to_string(),
        id: session.id.clone(),
        from: session.status.as_str().to_string(),
        to: to.as_str().to_string(),
    }
    .into()
}

/// Close every open session whose deadline has passed, optionally limited
/// to one section. Runs on the caller's write transaction.
pub(crate) async fn sweep_expired_on(
    conn: &libsql::Connection,
    ttl: chrono::TimeDelta,
    now: DateTime<Utc>,
    section_id: Option<&str>,
) -> Result<Vec<String>, DatabaseError> {
    let mut rows = match section_id {
        Some(section_id) => {
            conn.query(
                &format!(
                    "SELECT {SELECT_COLS} FROM class_sessions
                     WHERE status = 'open' AND section_id = ?1"
                ),
                [section_id],
            )
            .await?
        }
        None => {
            conn.query(
                &format!("SELECT {SELECT_COLS} FROM class_sessions WHERE status = 'open'"),
                (),
            )
            .await?
        }
    };
    let mut expired = Vec::new();
    while let Some(row) = rows.next().await? {
        let session = row_to_session(&row)?;
        if expiry::is_expired(&session, ttl, now) {
            expired.push(session);
        }
    }
    drop(rows);

    let mut closed = Vec::with_capacity(expired.len());
    for session in expired {
        let changed = conn
            .execute(
                "UPDATE class_sessions SET status = 'closed', closed_at = ?1
                 WHERE id = ?2 AND status = 'open'",
                libsql::params![to_sql_datetime(now), session.id.as_str()],
            )
            .await?;
        if changed == 0 {
            continue;
        }
        append_audit_on(
            conn,
            None,
            EntityType::ClassSession,
            &session.id,
            AuditAction::Expired,
            Some(&StatusChangedDetail {
                from: SessionStatus::Open.as_str().to_string(),
                to: SessionStatus::Closed.as_str().to_string(),
                deadline: Some(expiry::deadline(&session, ttl)),
            }),
            now,
        )
        .await?;
        tracing::info!(session = %session.id, section = %session.section_id, "session expired");
        closed.push(session.id);
    }
    Ok(closed)
}

/// Flip a scheduled row to `open` and store its verifier.
///
/// The partial unique index on open sessions is the last line of
/// exclusivity; its violation surfaces as `Conflict`.
pub(crate) async fn mark_open_on(
    conn: &libsql::Connection,
    session_id: &str,
    verifier: &CodeVerifier,
    now: DateTime<Utc>,
) -> Result<u64, DatabaseError> {
    conn.execute(
        "UPDATE class_sessions
         SET status = 'open', opened_at = ?1, code_verifier = ?2
         WHERE id = ?3 AND status = 'scheduled'",
        libsql::params![to_sql_datetime(now), verifier.as_str(), session_id],
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            CoreError::Conflict("Another session is already open for this section.".into()).into()
        } else {
            DatabaseError::from(e)
        }
    })
}

impl RollService {
    /// Require that `actor` manages the section owning `session`.
    async fn require_manager(&self, actor: &Actor, section_id: &str) -> Result<(), DatabaseError> {
        let section = load_section(self.db().conn(), section_id).await?;
        if !is_section_manager(actor, &section) {
            return Err(CoreError::AccessDenied.into());
        }
        Ok(())
    }

    /// Schedule a new session for a section.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown section, `AccessDenied` unless the actor
    /// manages it, `Validation` if `end <= start` once both bounds are
    /// truncated to the stored microsecond precision.
    pub async fn create_session(
        &self,
        actor: &Actor,
        section_id: &str,
        scheduled_start: DateTime<Utc>,
        scheduled_end: DateTime<Utc>,
    ) -> Result<ClassSession, DatabaseError> {
        self.require_manager(actor, section_id).await?;
        let scheduled_start = scheduled_start.trunc_subsecs(6);
        let scheduled_end = scheduled_end.trunc_subsecs(6);
        ClassSession::validate_window(scheduled_start, scheduled_end)?;

        let now = self.now();
        let tx = self.db().begin_write().await?;
        let result = async {
            let session = ClassSession {
                id: generate_id_on(&tx, PREFIX_CLASS_SESSION).await?,
                section_id: section_id.to_string(),
                scheduled_start,
                scheduled_end,
                status: SessionStatus::Scheduled,
                opened_at: None,
                closed_at: None,
                created_at: now,
            };
            tx.execute(
                "INSERT INTO class_sessions
                 (id, section_id, scheduled_start, scheduled_end, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                libsql::params![
                    session.id.as_str(),
                    section_id,
                    to_sql_datetime(scheduled_start),
                    to_sql_datetime(scheduled_end),
                    SessionStatus::Scheduled.as_str(),
                    to_sql_datetime(now)
                ],
            )
            .await?;
            append_audit_on(
                &tx,
                Some(&actor.id),
                EntityType::ClassSession,
                &session.id,
                AuditAction::Created,
                Some(&ScheduledDetail {
                    section_id: section_id.to_string(),
                    scheduled_start,
                    scheduled_end,
                }),
                now,
            )
            .await?;
            Ok(session)
        }
        .await;
        let session = finish(tx, result).await?;

        tracing::info!(session = %session.id, section = %section_id, actor = %actor.id, "session created");
        Ok(session)
    }

    /// Open a scheduled session and hand its code to the opener, once.
    ///
    /// Expired sessions of the same section are swept first, so a stale
    /// `open` row never blocks a new opening.
    ///
    /// # Errors
    ///
    /// `NotFound`, `AccessDenied` unless the actor manages the section,
    /// `InvalidTransition` unless the session is `scheduled`, `Conflict` if
    /// another session of the section is open.
    pub async fn open_session(
        &self,
        actor: &Actor,
        session_id: &str,
    ) -> Result<OpenedSession, DatabaseError> {
        let now = self.now();
        let ttl = self.ttl();
        let current = load_session(self.db().conn(), session_id).await?;
        self.require_manager(actor, &current.section_id).await?;
        if !current.status.can_transition_to(SessionStatus::Open) {
            return Err(invalid_transition(&current, SessionStatus::Open));
        }

        // Hashing is slow; keep it outside the write lock.
        let code = AccessCode::generate()?;
        let verifier = CodeVerifier::derive(&code)?;

        let tx = self.db().begin_write().await?;
        let result = async {
            sweep_expired_on(&tx, ttl, now, Some(&current.section_id)).await?;

            let fresh = load_session(&tx, session_id).await?;
            if !fresh.status.can_transition_to(SessionStatus::Open) {
                return Err(invalid_transition(&fresh, SessionStatus::Open));
            }

            let mut rows = tx
                .query(
                    "SELECT id FROM class_sessions
                     WHERE section_id = ?1 AND status = 'open' AND id <> ?2",
                    [fresh.section_id.as_str(), session_id],
                )
                .await?;
            if let Some(row) = rows.next().await? {
                let other: String = row.get(0)?;
                return Err(CoreError::Conflict(format!(
                    "Session {other} is already open for this section."
                ))
                .into());
            }
            drop(rows);

            let changed = mark_open_on(&tx, session_id, &verifier, now).await?;
            if changed == 0 {
                return Err(invalid_transition(&fresh, SessionStatus::Open));
            }

            let opened = ClassSession {
                status: SessionStatus::Open,
                opened_at: Some(now),
                ..fresh
            };
            let deadline = expiry::deadline(&opened, ttl);
            append_audit_on(
                &tx,
                Some(&actor.id),
                EntityType::ClassSession,
                session_id,
                AuditAction::Opened,
                Some(&StatusChangedDetail {
                    from: SessionStatus::Scheduled.as_str().to_string(),
                    to: SessionStatus::Open.as_str().to_string(),
                    deadline: Some(deadline),
                }),
                now,
            )
            .await?;
            Ok((opened, deadline))
        }
        .await;
        let (session, deadline) = finish(tx, result).await?;

        tracing::info!(
            session = %session.id,
            section = %session.section_id,
            actor = %actor.id,
            %deadline,
            "session opened"
        );
        let redemption_url = link::redemption_url(&self.attendance().base_url, &session.id, &code);
        Ok(OpenedSession {
            session,
            code,
            deadline,
            redemption_url,
        })
    }

    /// Close an open session.
    ///
    /// # Errors
    ///
    /// `NotFound`, `AccessDenied` unless the actor manages the section,
    /// `InvalidTransition` unless the session is `open`.
    pub async fn close_session(
        &self,
        actor: &Actor,
        session_id: &str,
    ) -> Result<ClassSession, DatabaseError> {
        let now = self.now();
        let ttl = self.ttl();
        let current = load_session(self.db().conn(), session_id).await?;
        self.require_manager(actor, &current.section_id).await?;
        if !current.status.can_transition_to(SessionStatus::Closed) {
            return Err(invalid_transition(&current, SessionStatus::Closed));
        }

        let tx = self.db().begin_write().await?;
        let result = async {
            let changed = tx
                .execute(
                    "UPDATE class_sessions SET status = 'closed', closed_at = ?1
                     WHERE id = ?2 AND status = 'open'",
                    libsql::params![to_sql_datetime(now), session_id],
                )
                .await?;
            if changed == 0 {
                let fresh = load_session(&tx, session_id).await?;
                return Err(invalid_transition(&fresh, SessionStatus::Closed));
            }
            append_audit_on(
                &tx,
                Some(&actor.id),
                EntityType::ClassSession,
                session_id,
                AuditAction::Closed,
                Some(&StatusChangedDetail {
                    from: SessionStatus::Open.as_str().to_string(),
                    to: SessionStatus::Closed.as_str().to_string(),
                    deadline: Some(expiry::deadline(&current, ttl)),
                }),
                now,
            )
            .await?;
            Ok(())
        }
        .await;
        finish(tx, result).await?;

        tracing::info!(session = %session_id, section = %current.section_id, actor = %actor.id, "session closed");
        Ok(ClassSession {
            status: SessionStatus::Closed,
            closed_at: Some(now),
            ..current
        })
    }

    /// Close open sessions past their deadline. Returns the closed IDs.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the transaction fails.
    pub async fn sweep_expired(&self, section_id: Option<&str>) -> Result<Vec<String>, DatabaseError> {
        let now = self.now();
        let tx = self.db().begin_write().await?;
        let result = sweep_expired_on(&tx, self.ttl(), now, section_id).await;
        finish(tx, result).await
    }

    /// Fetch one session. Only a section manager may read it.
    ///
    /// # Errors
    ///
    /// `NotFound` or `AccessDenied`.
    pub async fn get_session(&self, actor: &Actor, session_id: &str) -> Result<ClassSession, DatabaseError> {
        let session = load_session(self.db().conn(), session_id).await?;
        self.require_manager(actor, &session.section_id).await?;
        Ok(session)
    }

    /// Sessions of a section, newest scheduled start first, after sweeping
    /// expired ones.
    ///
    /// # Errors
    ///
    /// `NotFound` or `AccessDenied` unless the actor manages the section or
    /// is an admin.
    pub async fn list_sessions(
        &self,
        actor: &Actor,
        section_id: &str,
        limit: u32,
    ) -> Result<Vec<ClassSession>, DatabaseError> {
        let section = load_section(self.db().conn(), section_id).await?;
        authorize(
            actor,
            Capability::ViewReports,
            SectionRelations::of(actor, &section, false),
        )?;
        self.sweep_expired(Some(section_id)).await?;

        let mut sessions = load_section_sessions(self.db().conn(), section_id).await?;
        sessions.truncate(limit as usize);
        Ok(sessions)
    }

    /// Currently redeemable sessions across the student's enrolled sections.
    ///
    /// # Errors
    ///
    /// `AccessDenied` unless the actor is a student.
    pub async fn student_open_sessions(
        &self,
        actor: &Actor,
    ) -> Result<Vec<StudentOpenSession>, DatabaseError> {
        if actor.role != Role::Student {
            return Err(CoreError::AccessDenied.into());
        }
        let ttl = self.ttl();
        self.sweep_expired(None).await?;
        let now = self.now();

        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT s.id, s.section_id, s.scheduled_start, s.scheduled_end, s.status,
                        s.opened_at, s.closed_at, s.created_at,
                        sec.section_code, c.code,
                        EXISTS (SELECT 1 FROM attendance_records r
                                WHERE r.session_id = s.id AND r.student_id = ?1)
                 FROM class_sessions s
                 JOIN sections sec ON sec.id = s.section_id
                 JOIN courses c ON c.id = sec.course_id
                 JOIN enrollments e ON e.section_id = s.section_id AND e.student_id = ?1
                 WHERE s.status = 'open'
                 ORDER BY s.scheduled_start DESC",
                [actor.id.as_str()],
            )
            .await?;

        let mut open = Vec::new();
        while let Some(row) = rows.next().await? {
            let session = row_to_session(&row)?;
            if !expiry::is_redeemable(&session, ttl, now) {
                continue;
            }
            open.push(StudentOpenSession {
                deadline: expiry::deadline(&session, ttl),
                section_code: row.get(8)?,
                course_code: row.get(9)?,
                already_redeemed: row.get::<i64>(10)? != 0,
                session,
            });
        }
        Ok(open)
    }
}
