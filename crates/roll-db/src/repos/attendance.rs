//! Attendance record repository: code redemption.

use roll_core::audit_detail::RedeemedDetail;
use roll_core::code;
use roll_core::entities::AttendanceRecord;
use roll_core::enums::{AttendanceStatus, AuditAction, EntityType, SessionStatus};
use roll_core::errors::CoreError;
use roll_core::expiry;
use roll_core::guard::{Actor, is_enrolled_student};
use roll_core::ids::PREFIX_ATTENDANCE;
use roll_core::responses::Redemption;

use crate::error::DatabaseError;
use crate::helpers::{parse_datetime, parse_enum, to_sql_datetime};
use crate::repos::audit::append_audit_on;
use crate::repos::directory::enrollment_exists;
use crate::repos::session::{load_session, load_session_with_verifier};
use crate::service::RollService;
use crate::{finish, generate_id_on};

pub(crate) const SELECT_COLS: &str = "id, session_id, student_id, status, recorded_at";

pub(crate) fn row_to_record(row: &libsql::Row) -> Result<AttendanceRecord, DatabaseError> {
    Ok(AttendanceRecord {
        id: row.get(0)?,
        session_id: row.get(1)?,
        student_id: row.get(2)?,
        status: parse_enum(&row.get::<String>(3)?)?,
        recorded_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

async fn collect_records(mut rows: libsql::Rows) -> Result<Vec<AttendanceRecord>, DatabaseError> {
    let mut records = Vec::new();
    while let Some(row) = rows.next().await? {
        records.push(row_to_record(&row)?);
    }
    Ok(records)
}

pub(crate) async fn load_record(
    conn: &libsql::Connection,
    session_id: &str,
    student_id: &str,
) -> Result<Option<AttendanceRecord>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {SELECT_COLS} FROM attendance_records
                 WHERE session_id = ?1 AND student_id = ?2"
            ),
            [session_id, student_id],
        )
        .await?;
    rows.next().await?.map(|row| row_to_record(&row)).transpose()
}

/// All records for one session.
pub(crate) async fn load_session_records(
    conn: &libsql::Connection,
    session_id: &str,
) -> Result<Vec<AttendanceRecord>, DatabaseError> {
    let rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM attendance_records WHERE session_id = ?1"),
            [session_id],
        )
        .await?;
    collect_records(rows).await
}

/// All records for every session of a section.
pub(crate) async fn load_section_records(
    conn: &libsql::Connection,
    section_id: &str,
) -> Result<Vec<AttendanceRecord>, DatabaseError> {
    let rows = conn
        .query(
            "SELECT r.id, r.session_id, r.student_id, r.status, r.recorded_at
             FROM attendance_records r
             JOIN class_sessions s ON s.id = r.session_id
             WHERE s.section_id = ?1",
            [section_id],
        )
        .await?;
    collect_records(rows).await
}

/// All records held by one student.
pub(crate) async fn load_student_records(
    conn: &libsql::Connection,
    student_id: &str,
) -> Result<Vec<AttendanceRecord>, DatabaseError> {
    let rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM attendance_records WHERE student_id = ?1"),
            [student_id],
        )
        .await?;
    collect_records(rows).await
}

impl RollService {
    /// Redeem an access code for the calling student.
    ///
    /// Checks run in a fixed order so the error a caller sees is stable:
    /// unknown session, not open, not enrolled, past deadline, wrong code.
    /// A repeated redemption by the same student returns the existing record
    /// with `already_recorded` set and writes nothing.
    ///
    /// # Errors
    ///
    /// `NotFound`, `NotOpen`, `AccessDenied`, `Expired`, or `InvalidCode`.
    pub async fn redeem(
        &self,
        actor: &Actor,
        session_id: &str,
        submitted: &str,
    ) -> Result<Redemption, DatabaseError> {
        let now = self.now();
        let ttl = self.ttl();

        let (session, verifier) = load_session_with_verifier(self.db().conn(), session_id).await?;
        let verifier = match verifier {
            Some(v) if session.status == SessionStatus::Open => v,
            _ => {
                return Err(CoreError::NotOpen {
                    session_id: session.id,
                }
                .into());
            }
        };

        let enrolled = enrollment_exists(self.db().conn(), &session.section_id, &actor.id).await?;
        if !is_enrolled_student(actor, enrolled) {
            return Err(CoreError::AccessDenied.into());
        }

        if expiry::is_expired(&session, ttl, now) {
            return Err(CoreError::Expired {
                deadline: expiry::deadline(&session, ttl),
                session_id: session.id,
            }
            .into());
        }

        let candidate = submitted.trim();
        if !code::is_well_formed(candidate) || !verifier.matches(candidate) {
            tracing::debug!(session = %session_id, student = %actor.id, "code rejected");
            return Err(CoreError::InvalidCode.into());
        }

        let tx = self.db().begin_write().await?;
        let result = async {
            // The session may have been closed while the code was verified.
            let fresh = load_session(&tx, session_id).await?;
            if fresh.status != SessionStatus::Open {
                return Err(CoreError::NotOpen {
                    session_id: fresh.id,
                }
                .into());
            }
            if expiry::is_expired(&fresh, ttl, now) {
                return Err(CoreError::Expired {
                    deadline: expiry::deadline(&fresh, ttl),
                    session_id: fresh.id,
                }
                .into());
            }

            let record = AttendanceRecord {
                id: generate_id_on(&tx, PREFIX_ATTENDANCE).await?,
                session_id: session_id.to_string(),
                student_id: actor.id.clone(),
                status: AttendanceStatus::Present,
                recorded_at: now,
            };
            let inserted = tx
                .execute(
                    "INSERT INTO attendance_records (id, session_id, student_id, status, recorded_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT (session_id, student_id) DO NOTHING",
                    libsql::params![
                        record.id.as_str(),
                        session_id,
                        actor.id.as_str(),
                        AttendanceStatus::Present.as_str(),
                        to_sql_datetime(now)
                    ],
                )
                .await?;

            if inserted == 0 {
                let existing = load_record(&tx, session_id, &actor.id)
                    .await?
                    .ok_or(DatabaseError::NoResult)?;
                return Ok(Redemption {
                    record: existing,
                    already_recorded: true,
                });
            }

            append_audit_on(
                &tx,
                Some(&actor.id),
                EntityType::AttendanceRecord,
                &record.id,
                AuditAction::Redeemed,
                Some(&RedeemedDetail {
                    session_id: session_id.to_string(),
                    student_id: actor.id.clone(),
                }),
                now,
            )
            .await?;
            Ok(Redemption {
                record,
                already_recorded: false,
            })
        }
        .await;
        let redemption = finish(tx, result).await?;

        if redemption.already_recorded {
            tracing::debug!(session = %session_id, student = %actor.id, "attendance already recorded");
        } else {
            tracing::info!(session = %session_id, student = %actor.id, "attendance recorded");
        }
        Ok(redemption)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::audit::AuditFilter;
    use crate::test_support::helpers::{clocked_service, schedule, seed, t0, test_service};
    use chrono::TimeDelta;
    use pretty_assertions::assert_eq;

    fn core(err: &DatabaseError) -> &CoreError {
        err.as_core().unwrap_or_else(|| panic!("expected core error, got {err}"))
    }

    /// A code guaranteed to differ from `code`.
    fn wrong(code: &str) -> String {
        let n: u32 = code.parse().unwrap();
        format!("{:06}", (n + 1) % 1_000_000)
    }

    #[tokio::test]
    async fn enrolled_student_redeems_once() {
        let svc = test_service().await;
        let fx = seed(&svc, 2).await;
        let session = schedule(&svc, &fx, 0).await;
        let opened = svc.open_session(&fx.lecturer(), &session.id).await.unwrap();

        let first = svc
            .redeem(&fx.student(0), &session.id, opened.code.as_str())
            .await
            .unwrap();
        assert!(!first.already_recorded);
        assert_eq!(first.record.status, AttendanceStatus::Present);
        assert_eq!(first.record.recorded_at, t0());

        let second = svc
            .redeem(&fx.student(0), &session.id, opened.code.as_str())
            .await
            .unwrap();
        assert!(second.already_recorded);
        assert_eq!(second.record, first.record);

        let records = load_session_records(svc.db().conn(), &session.id).await.unwrap();
        assert_eq!(records.len(), 1);

        let audits = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::Redeemed),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(audits.len(), 1);
    }

    #[tokio::test]
    async fn surrounding_whitespace_is_ignored() {
        let svc = test_service().await;
        let fx = seed(&svc, 1).await;
        let session = schedule(&svc, &fx, 0).await;
        let opened = svc.open_session(&fx.lecturer(), &session.id).await.unwrap();

        let padded = format!("  {}\n", opened.code.as_str());
        svc.redeem(&fx.student(0), &session.id, &padded).await.unwrap();
    }

    #[tokio::test]
    async fn wrong_or_malformed_code_is_rejected() {
        let svc = test_service().await;
        let fx = seed(&svc, 1).await;
        let session = schedule(&svc, &fx, 0).await;
        let opened = svc.open_session(&fx.lecturer(), &session.id).await.unwrap();

        for bad in [wrong(opened.code.as_str()), "12345".into(), "abcdef".into(), String::new()] {
            let err = svc.redeem(&fx.student(0), &session.id, &bad).await.unwrap_err();
            assert!(matches!(core(&err), CoreError::InvalidCode), "accepted {bad:?}");
        }
        assert_eq!(load_record(svc.db().conn(), &session.id, &fx.students[0].id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn unenrolled_student_is_denied_without_record() {
        let svc = test_service().await;
        let fx = seed(&svc, 1).await;
        let session = schedule(&svc, &fx, 0).await;
        let opened = svc.open_session(&fx.lecturer(), &session.id).await.unwrap();

        for actor in [fx.outsider(), fx.lecturer(), fx.admin()] {
            let err = svc
                .redeem(&actor, &session.id, opened.code.as_str())
                .await
                .unwrap_err();
            assert!(matches!(core(&err), CoreError::AccessDenied));
        }
        let records = load_session_records(svc.db().conn(), &session.id).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn scheduled_and_closed_sessions_are_not_open() {
        let svc = test_service().await;
        let fx = seed(&svc, 1).await;
        let session = schedule(&svc, &fx, 0).await;

        let err = svc.redeem(&fx.student(0), &session.id, "000000").await.unwrap_err();
        assert!(matches!(core(&err), CoreError::NotOpen { .. }));

        let opened = svc.open_session(&fx.lecturer(), &session.id).await.unwrap();
        svc.close_session(&fx.lecturer(), &session.id).await.unwrap();
        let err = svc
            .redeem(&fx.student(0), &session.id, opened.code.as_str())
            .await
            .unwrap_err();
        assert!(matches!(core(&err), CoreError::NotOpen { .. }));
    }

    #[tokio::test]
    async fn redemption_after_ttl_is_expired() {
        let (svc, clock) = clocked_service(15).await;
        let fx = seed(&svc, 2).await;
        let session = schedule(&svc, &fx, 0).await;
        let opened = svc.open_session(&fx.lecturer(), &session.id).await.unwrap();

        // The deadline instant itself is still redeemable.
        clock.advance(TimeDelta::minutes(15));
        svc.redeem(&fx.student(0), &session.id, opened.code.as_str())
            .await
            .unwrap();

        clock.advance(TimeDelta::seconds(1));
        let err = svc
            .redeem(&fx.student(1), &session.id, opened.code.as_str())
            .await
            .unwrap_err();
        match core(&err) {
            CoreError::Expired { deadline, .. } => {
                assert_eq!(*deadline, t0() + TimeDelta::minutes(15));
            }
            other => panic!("expected Expired, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn zero_ttl_expires_on_next_tick() {
        let (svc, clock) = clocked_service(0).await;
        let fx = seed(&svc, 1).await;
        let session = schedule(&svc, &fx, 0).await;
        let opened = svc.open_session(&fx.lecturer(), &session.id).await.unwrap();

        clock.advance(TimeDelta::microseconds(1));
        let err = svc
            .redeem(&fx.student(0), &session.id, opened.code.as_str())
            .await
            .unwrap_err();
        assert!(matches!(core(&err), CoreError::Expired { .. }));
    }

    #[tokio::test]
    async fn scheduled_end_caps_the_deadline() {
        let (svc, clock) = clocked_service(120).await;
        let fx = seed(&svc, 1).await;
        let session = schedule(&svc, &fx, 0).await;
        let opened = svc.open_session(&fx.lecturer(), &session.id).await.unwrap();
        assert_eq!(opened.deadline, session.scheduled_end);

        clock.advance(TimeDelta::minutes(61));
        let err = svc
            .redeem(&fx.student(0), &session.id, opened.code.as_str())
            .await
            .unwrap_err();
        assert!(matches!(core(&err), CoreError::Expired { .. }));
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let svc = test_service().await;
        let fx = seed(&svc, 1).await;
        let err = svc.redeem(&fx.student(0), "cls-nope", "123456").await.unwrap_err();
        assert!(matches!(core(&err), CoreError::NotFound { .. }));
    }
}
