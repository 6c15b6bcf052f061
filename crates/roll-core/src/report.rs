//! Read-side attendance aggregation.
//!
//! Builders here are pure functions over a snapshot of rows loaded in one
//! read transaction. Presence is derived solely from the existence of an
//! attendance record; there are no stored absent rows.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{AttendanceRecord, ClassSession, Course, Section, User};
use crate::enums::{AttendanceStatus, SessionStatus};

/// `present / total * 100`, or `0.0` when `total` is zero.
#[must_use]
pub fn percentage(present: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let pct = present as f64 / total as f64 * 100.0;
    pct
}

// ---------------------------------------------------------------------------
// Per-session roster
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RosterEntry {
    pub student_id: String,
    pub username: String,
    pub email: String,
    pub status: AttendanceStatus,
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Every enrolled student of a session's section, present or absent.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SessionRoster {
    pub session: ClassSession,
    pub section_code: String,
    pub entries: Vec<RosterEntry>,
    pub present: usize,
    pub total: usize,
    pub percentage: f64,
}

/// Build the roster for `session` from its section's enrolled students.
///
/// Entries are ordered by username. Records belonging to other sessions or
/// to students no longer enrolled are ignored.
#[must_use]
pub fn build_roster(
    session: &ClassSession,
    section: &Section,
    students: &[User],
    records: &[AttendanceRecord],
) -> SessionRoster {
    let recorded: HashMap<&str, DateTime<Utc>> = records
        .iter()
        .filter(|r| r.session_id == session.id)
        .map(|r| (r.student_id.as_str(), r.recorded_at))
        .collect();

    let mut entries: Vec<RosterEntry> = students
        .iter()
        .map(|student| {
            let recorded_at = recorded.get(student.id.as_str()).copied();
            RosterEntry {
                student_id: student.id.clone(),
                username: student.username.clone(),
                email: student.email.clone(),
                status: status_of(recorded_at.is_some()),
                recorded_at,
            }
        })
        .collect();
    entries.sort_by(|a, b| a.username.cmp(&b.username));

    let present = entries
        .iter()
        .filter(|e| e.status == AttendanceStatus::Present)
        .count();
    let total = entries.len();

    SessionRoster {
        session: session.clone(),
        section_code: section.section_code.clone(),
        entries,
        present,
        total,
        percentage: percentage(present, total),
    }
}

const fn status_of(present: bool) -> AttendanceStatus {
    if present {
        AttendanceStatus::Present
    } else {
        AttendanceStatus::Absent
    }
}

// ---------------------------------------------------------------------------
// Per-section summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SessionAttendance {
    pub session_id: String,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub status: SessionStatus,
    pub present: usize,
    pub total: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ActivityEntry {
    pub session_id: String,
    pub student_id: String,
    pub username: String,
    pub recorded_at: DateTime<Utc>,
}

/// Attendance across every session of a section.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SectionSummary {
    pub section: Section,
    pub enrolled: usize,
    pub sessions: Vec<SessionAttendance>,
    /// Present `(session, student)` pairs.
    pub present: usize,
    /// `sessions × enrolled` pairs.
    pub possible: usize,
    pub percentage: f64,
    /// Newest first.
    pub recent_activity: Vec<ActivityEntry>,
}

/// Build a section summary.
///
/// Sessions are reported in ascending scheduled start. The activity feed is
/// the `recent_limit` latest records of enrolled students, newest first.
#[must_use]
pub fn build_section_summary(
    section: &Section,
    sessions: &[ClassSession],
    students: &[User],
    records: &[AttendanceRecord],
    recent_limit: usize,
) -> SectionSummary {
    let usernames: HashMap<&str, &str> = students
        .iter()
        .map(|s| (s.id.as_str(), s.username.as_str()))
        .collect();
    let session_ids: HashSet<&str> = sessions.iter().map(|s| s.id.as_str()).collect();

    // Only enrolled students in this section's sessions count.
    let counted: Vec<&AttendanceRecord> = records
        .iter()
        .filter(|r| {
            session_ids.contains(r.session_id.as_str())
                && usernames.contains_key(r.student_id.as_str())
        })
        .collect();

    let mut per_session: HashMap<&str, usize> = HashMap::new();
    for record in &counted {
        *per_session.entry(record.session_id.as_str()).or_default() += 1;
    }

    let enrolled = students.len();
    let mut ordered: Vec<&ClassSession> = sessions.iter().collect();
    ordered.sort_by(|a, b| {
        a.scheduled_start
            .cmp(&b.scheduled_start)
            .then_with(|| a.id.cmp(&b.id))
    });
    let session_rows: Vec<SessionAttendance> = ordered
        .into_iter()
        .map(|s| {
            let present = per_session.get(s.id.as_str()).copied().unwrap_or(0);
            SessionAttendance {
                session_id: s.id.clone(),
                scheduled_start: s.scheduled_start,
                scheduled_end: s.scheduled_end,
                status: s.status,
                present,
                total: enrolled,
                percentage: percentage(present, enrolled),
            }
        })
        .collect();

    let mut activity: Vec<&AttendanceRecord> = counted.clone();
    activity.sort_by(|a, b| {
        b.recorded_at
            .cmp(&a.recorded_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    let recent_activity = activity
        .into_iter()
        .take(recent_limit)
        .map(|r| ActivityEntry {
            session_id: r.session_id.clone(),
            student_id: r.student_id.clone(),
            username: usernames
                .get(r.student_id.as_str())
                .map_or_else(String::new, |u| (*u).to_string()),
            recorded_at: r.recorded_at,
        })
        .collect();

    let present = counted.len();
    let possible = sessions.len() * enrolled;

    SectionSummary {
        section: section.clone(),
        enrolled,
        sessions: session_rows,
        present,
        possible,
        percentage: percentage(present, possible),
        recent_activity,
    }
}

// ---------------------------------------------------------------------------
// Per-student summary
// ---------------------------------------------------------------------------

/// One enrolled section with its course and every session scheduled for it.
#[derive(Debug, Clone)]
pub struct EnrolledSection {
    pub section: Section,
    pub course: Course,
    pub sessions: Vec<ClassSession>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct StudentSectionTotals {
    pub section_id: String,
    pub section_code: String,
    pub course_code: String,
    pub course_title: String,
    pub present: usize,
    pub sessions: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StudentSessionLine {
    pub session_id: String,
    pub section_code: String,
    pub course_code: String,
    pub course_title: String,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub status: AttendanceStatus,
    pub recorded_at: Option<DateTime<Utc>>,
}

/// A student's attendance across every enrolled section.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct StudentSummary {
    pub student_id: String,
    pub sections: Vec<StudentSectionTotals>,
    /// Newest scheduled start first.
    pub recent_sessions: Vec<StudentSessionLine>,
}

/// Every session line for `student_id`, newest scheduled start first.
#[must_use]
pub fn student_session_lines(
    student_id: &str,
    enrolled: &[EnrolledSection],
    records: &[AttendanceRecord],
) -> Vec<StudentSessionLine> {
    let recorded = records_for(student_id, records);
    let mut lines: Vec<StudentSessionLine> = enrolled
        .iter()
        .flat_map(|e| {
            e.sessions.iter().map(|s| {
                let recorded_at = recorded.get(s.id.as_str()).copied();
                StudentSessionLine {
                    session_id: s.id.clone(),
                    section_code: e.section.section_code.clone(),
                    course_code: e.course.code.clone(),
                    course_title: e.course.title.clone(),
                    scheduled_start: s.scheduled_start,
                    scheduled_end: s.scheduled_end,
                    status: status_of(recorded_at.is_some()),
                    recorded_at,
                }
            })
        })
        .collect();
    lines.sort_by(|a, b| {
        b.scheduled_start
            .cmp(&a.scheduled_start)
            .then_with(|| a.session_id.cmp(&b.session_id))
    });
    lines
}

/// Build the student's per-section totals and recent-sessions feed.
#[must_use]
pub fn build_student_summary(
    student_id: &str,
    enrolled: &[EnrolledSection],
    records: &[AttendanceRecord],
    recent_limit: usize,
) -> StudentSummary {
    let recorded = records_for(student_id, records);
    let sections = enrolled
        .iter()
        .map(|e| {
            let total = e.sessions.len();
            let present = e
                .sessions
                .iter()
                .filter(|s| recorded.contains_key(s.id.as_str()))
                .count();
            StudentSectionTotals {
                section_id: e.section.id.clone(),
                section_code: e.section.section_code.clone(),
                course_code: e.course.code.clone(),
                course_title: e.course.title.clone(),
                present,
                sessions: total,
                percentage: percentage(present, total),
            }
        })
        .collect();

    let mut recent_sessions = student_session_lines(student_id, enrolled, records);
    recent_sessions.truncate(recent_limit);

    StudentSummary {
        student_id: student_id.to_string(),
        sections,
        recent_sessions,
    }
}

fn records_for<'a>(
    student_id: &str,
    records: &'a [AttendanceRecord],
) -> HashMap<&'a str, DateTime<Utc>> {
    records
        .iter()
        .filter(|r| r.student_id == student_id)
        .map(|r| (r.session_id.as_str(), r.recorded_at))
        .collect()
}
