//! CSV exports of attendance.
//!
//! Scheduled bounds use minute precision (`2026-10-15T09:00`), `recorded_at`
//! second precision (`2026-10-15T09:03:12`), both in UTC. Absent rows carry
//! an empty `recorded_at`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::CoreError;
use crate::report::{SessionRoster, StudentSessionLine};

pub const SESSION_HEADER: [&str; 9] = [
    "session_id",
    "section_code",
    "scheduled_start",
    "scheduled_end",
    "student_id",
    "username",
    "email",
    "status",
    "recorded_at",
];

pub const SECTION_HEADER: [&str; 8] = [
    "session_id",
    "session_start",
    "session_end",
    "student_id",
    "username",
    "email",
    "status",
    "recorded_at",
];

pub const STUDENT_HEADER: [&str; 8] = [
    "section_code",
    "course_code",
    "course_title",
    "session_id",
    "scheduled_start",
    "scheduled_end",
    "status",
    "recorded_at",
];

#[derive(Serialize)]
struct SessionRow<'a> {
    session_id: &'a str,
    section_code: &'a str,
    scheduled_start: String,
    scheduled_end: String,
    student_id: &'a str,
    username: &'a str,
    email: &'a str,
    status: &'static str,
    recorded_at: String,
}

#[derive(Serialize)]
struct SectionRow<'a> {
    session_id: &'a str,
    session_start: String,
    session_end: String,
    student_id: &'a str,
    username: &'a str,
    email: &'a str,
    status: &'static str,
    recorded_at: String,
}

#[derive(Serialize)]
struct StudentRow<'a> {
    section_code: &'a str,
    course_code: &'a str,
    course_title: &'a str,
    session_id: &'a str,
    scheduled_start: String,
    scheduled_end: String,
    status: &'static str,
    recorded_at: String,
}

fn minutes(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M").to_string()
}

fn seconds(instant: Option<DateTime<Utc>>) -> String {
    instant.map_or_else(String::new, |at| at.format("%Y-%m-%dT%H:%M:%S").to_string())
}

fn csv_error(e: impl std::fmt::Display) -> CoreError {
    CoreError::Other(anyhow::anyhow!("CSV export failed: {e}"))
}

/// Write `header` then every row, returning the UTF-8 document.
fn write_csv<R: Serialize>(header: &[&str], rows: impl IntoIterator<Item = R>) -> Result<String, CoreError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);
    wtr.write_record(header).map_err(csv_error)?;
    for row in rows {
        wtr.serialize(row).map_err(csv_error)?;
    }
    let bytes = wtr.into_inner().map_err(csv_error)?;
    String::from_utf8(bytes).map_err(csv_error)
}

/// One row per enrolled student of the session.
///
/// # Errors
///
/// Returns `CoreError::Other` if the CSV writer fails.
pub fn session_csv(roster: &SessionRoster) -> Result<String, CoreError> {
    let session = &roster.session;
    write_csv(
        &SESSION_HEADER,
        roster.entries.iter().map(|e| SessionRow {
            session_id: &session.id,
            section_code: &roster.section_code,
            scheduled_start: minutes(session.scheduled_start),
            scheduled_end: minutes(session.scheduled_end),
            student_id: &e.student_id,
            username: &e.username,
            email: &e.email,
            status: e.status.as_str(),
            recorded_at: seconds(e.recorded_at),
        }),
    )
}

/// One row per `(session, enrolled student)` pair, sessions in ascending start.
///
/// # Errors
///
/// Returns `CoreError::Other` if the CSV writer fails.
pub fn section_csv(rosters: &[SessionRoster]) -> Result<String, CoreError> {
    let mut ordered: Vec<&SessionRoster> = rosters.iter().collect();
    ordered.sort_by(|a, b| {
        a.session
            .scheduled_start
            .cmp(&b.session.scheduled_start)
            .then_with(|| a.session.id.cmp(&b.session.id))
    });
    write_csv(
        &SECTION_HEADER,
        ordered.into_iter().flat_map(|roster| {
            roster.entries.iter().map(move |e| SectionRow {
                session_id: &roster.session.id,
                session_start: minutes(roster.session.scheduled_start),
                session_end: minutes(roster.session.scheduled_end),
                student_id: &e.student_id,
                username: &e.username,
                email: &e.email,
                status: e.status.as_str(),
                recorded_at: seconds(e.recorded_at),
            })
        }),
    )
}

/// One row per session across the student's enrolled sections, ascending start.
///
/// # Errors
///
/// Returns `CoreError::Other` if the CSV writer fails.
pub fn student_csv(lines: &[StudentSessionLine]) -> Result<String, CoreError> {
    let mut ordered: Vec<&StudentSessionLine> = lines.iter().collect();
    ordered.sort_by(|a, b| {
        a.scheduled_start
            .cmp(&b.scheduled_start)
            .then_with(|| a.session_id.cmp(&b.session_id))
    });
    write_csv(
        &STUDENT_HEADER,
        ordered.into_iter().map(|l| StudentRow {
            section_code: &l.section_code,
            course_code: &l.course_code,
            course_title: &l.course_title,
            session_id: &l.session_id,
            scheduled_start: minutes(l.scheduled_start),
            scheduled_end: minutes(l.scheduled_end),
            status: l.status.as_str(),
            recorded_at: seconds(l.recorded_at),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ClassSession;
    use crate::enums::{AttendanceStatus, SessionStatus};
    use crate::report::RosterEntry;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn roster(id: &str, hour: u32) -> SessionRoster {
        let start = Utc.with_ymd_and_hms(2026, 10, 15, hour, 0, 0).unwrap();
        SessionRoster {
            session: ClassSession {
                id: id.into(),
                section_id: "sec-1".into(),
                scheduled_start: start,
                scheduled_end: start + chrono::TimeDelta::minutes(90),
                status: SessionStatus::Closed,
                opened_at: Some(start),
                closed_at: None,
                created_at: start,
            },
            section_code: "A".into(),
            entries: vec![
                RosterEntry {
                    student_id: "usr-a".into(),
                    username: "alice".into(),
                    email: "alice@example.edu".into(),
                    status: AttendanceStatus::Present,
                    recorded_at: Some(start + chrono::TimeDelta::seconds(192)),
                },
                RosterEntry {
                    student_id: "usr-b".into(),
                    username: "bob".into(),
                    email: "bob@example.edu".into(),
                    status: AttendanceStatus::Absent,
                    recorded_at: None,
                },
            ],
            present: 1,
            total: 2,
            percentage: 50.0,
        }
    }

    #[test]
    fn session_export_shape() {
        let out = session_csv(&roster("cls-1", 9)).unwrap();
        assert_eq!(
            out,
            "session_id,section_code,scheduled_start,scheduled_end,student_id,username,email,status,recorded_at\n\
             cls-1,A,2026-10-15T09:00,2026-10-15T10:30,usr-a,alice,alice@example.edu,present,2026-10-15T09:03:12\n\
             cls-1,A,2026-10-15T09:00,2026-10-15T10:30,usr-b,bob,bob@example.edu,absent,\n"
        );
    }

    #[test]
    fn empty_roster_still_has_header() {
        let mut r = roster("cls-1", 9);
        r.entries.clear();
        let out = session_csv(&r).unwrap();
        assert_eq!(out.lines().count(), 1);
        assert!(out.starts_with("session_id,section_code,"));
    }

    #[test]
    fn section_export_orders_sessions_ascending() {
        let out = section_csv(&[roster("cls-late", 13), roster("cls-early", 9)]).unwrap();
        let ids: Vec<&str> = out
            .lines()
            .skip(1)
            .map(|l| l.split(',').next().unwrap())
            .collect();
        assert_eq!(ids, vec!["cls-early", "cls-early", "cls-late", "cls-late"]);
        assert!(out.starts_with("session_id,session_start,session_end,"));
    }

    #[test]
    fn student_export_quotes_titles_with_commas() {
        let start = Utc.with_ymd_and_hms(2026, 10, 15, 9, 0, 0).unwrap();
        let lines = vec![StudentSessionLine {
            session_id: "cls-1".into(),
            section_code: "A".into(),
            course_code: "CS101".into(),
            course_title: "Data, Logic".into(),
            scheduled_start: start,
            scheduled_end: start + chrono::TimeDelta::hours(1),
            status: AttendanceStatus::Absent,
            recorded_at: None,
        }];
        let out = student_csv(&lines).unwrap();
        assert_eq!(
            out.lines().nth(1).unwrap(),
            "A,CS101,\"Data, Logic\",cls-1,2026-10-15T09:00,2026-10-15T10:00,absent,"
        );
    }
}
