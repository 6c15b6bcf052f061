//! Attendance reports.
//!
//! Each report loads everything it needs inside one read transaction and
//! hands the rows to the pure builders in `roll_core::report`.

use roll_core::entities::Section;
use roll_core::enums::{EntityType, Role};
use roll_core::errors::CoreError;
use roll_core::guard::{Actor, Capability, SectionRelations, authorize, authorize_student_view};
use roll_core::report::{
    EnrolledSection, SectionSummary, SessionRoster, StudentSessionLine, StudentSummary,
    build_roster, build_section_summary, build_student_summary, student_session_lines,
};

use crate::error::DatabaseError;
use crate::finish;
use crate::repos::attendance::{load_section_records, load_session_records, load_student_records};
use crate::repos::directory::{load_course, load_section, load_section_students, load_user, row_to_section};
use crate::repos::session::{load_section_sessions, load_session};
use crate::service::RollService;

fn require_viewer(actor: &Actor, section: &Section) -> Result<(), CoreError> {
    authorize(
        actor,
        Capability::ViewReports,
        SectionRelations::of(actor, section, false),
    )
}

/// Every section the student is enrolled in, with course and sessions.
async fn load_enrolled_sections(
    conn: &libsql::Connection,
    student_id: &str,
) -> Result<Vec<EnrolledSection>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT s.id, s.course_id, s.section_code, s.instructor_id, s.assistant_id, s.created_at
             FROM enrollments e JOIN sections s ON s.id = e.section_id
             WHERE e.student_id = ?1
             ORDER BY s.id",
            [student_id],
        )
        .await?;
    let mut sections = Vec::new();
    while let Some(row) = rows.next().await? {
        sections.push(row_to_section(&row)?);
    }
    drop(rows);

    let mut enrolled = Vec::with_capacity(sections.len());
    for section in sections {
        let course = load_course(conn, &section.course_id).await?;
        let sessions = load_section_sessions(conn, &section.id).await?;
        enrolled.push(EnrolledSection {
            section,
            course,
            sessions,
        });
    }
    Ok(enrolled)
}

/// Load a student and make sure the ID names a student.
async fn load_student(conn: &libsql::Connection, student_id: &str) -> Result<(), DatabaseError> {
    let user = load_user(conn, student_id).await?;
    if user.role != Role::Student {
        return Err(CoreError::not_found(EntityType::User, student_id).into());
    }
    Ok(())
}

impl RollService {
    /// Present/absent roster for one session over the section's enrolled students.
    ///
    /// # Errors
    ///
    /// `NotFound`, or `AccessDenied` unless the actor manages the section or
    /// is an admin.
    pub async fn session_roster(
        &self,
        actor: &Actor,
        session_id: &str,
    ) -> Result<SessionRoster, DatabaseError> {
        let tx = self.db().begin_read().await?;
        let result = async {
            let session = load_session(&tx, session_id).await?;
            let section = load_section(&tx, &session.section_id).await?;
            require_viewer(actor, &section)?;
            let students = load_section_students(&tx, &section.id).await?;
            let records = load_session_records(&tx, session_id).await?;
            Ok(build_roster(&session, &section, &students, &records))
        }
        .await;
        finish(tx, result).await
    }

    /// Rosters for every session of a section.
    ///
    /// # Errors
    ///
    /// Same as [`Self::session_roster`].
    pub async fn section_rosters(
        &self,
        actor: &Actor,
        section_id: &str,
    ) -> Result<Vec<SessionRoster>, DatabaseError> {
        let tx = self.db().begin_read().await?;
        let result = async {
            let section = load_section(&tx, section_id).await?;
            require_viewer(actor, &section)?;
            let students = load_section_students(&tx, section_id).await?;
            let sessions = load_section_sessions(&tx, section_id).await?;
            let records = load_section_records(&tx, section_id).await?;
            Ok(sessions
                .iter()
                .map(|s| build_roster(s, &section, &students, &records))
                .collect())
        }
        .await;
        finish(tx, result).await
    }

    /// Per-session counts and a recent activity feed for a section.
    ///
    /// # Errors
    ///
    /// Same as [`Self::session_roster`].
    pub async fn section_summary(
        &self,
        actor: &Actor,
        section_id: &str,
        recent_limit: u32,
    ) -> Result<SectionSummary, DatabaseError> {
        let tx = self.db().begin_read().await?;
        let result = async {
            let section = load_section(&tx, section_id).await?;
            require_viewer(actor, &section)?;
            let students = load_section_students(&tx, section_id).await?;
            let sessions = load_section_sessions(&tx, section_id).await?;
            let records = load_section_records(&tx, section_id).await?;
            Ok(build_section_summary(
                &section,
                &sessions,
                &students,
                &records,
                recent_limit as usize,
            ))
        }
        .await;
        finish(tx, result).await
    }

    /// A student's attendance across every enrolled section.
    ///
    /// # Errors
    ///
    /// `AccessDenied` unless the actor is that student or an admin;
    /// `NotFound` if the ID is not a student.
    pub async fn student_summary(
        &self,
        actor: &Actor,
        student_id: &str,
        recent_limit: u32,
    ) -> Result<StudentSummary, DatabaseError> {
        authorize_student_view(actor, student_id)?;
        let tx = self.db().begin_read().await?;
        let result = async {
            load_student(&tx, student_id).await?;
            let enrolled = load_enrolled_sections(&tx, student_id).await?;
            let records = load_student_records(&tx, student_id).await?;
            Ok(build_student_summary(
                student_id,
                &enrolled,
                &records,
                recent_limit as usize,
            ))
        }
        .await;
        finish(tx, result).await
    }

    /// Every session line for a student, newest first.
    ///
    /// # Errors
    ///
    /// Same as [`Self::student_summary`].
    pub async fn student_sessions(
        &self,
        actor: &Actor,
        student_id: &str,
    ) -> Result<Vec<StudentSessionLine>, DatabaseError> {
        authorize_student_view(actor, student_id)?;
        let tx = self.db().begin_read().await?;
        let result = async {
            load_student(&tx, student_id).await?;
            let enrolled = load_enrolled_sections(&tx, student_id).await?;
            let records = load_student_records(&tx, student_id).await?;
            Ok(student_session_lines(student_id, &enrolled, &records))
        }
        .await;
        finish(tx, result).await
    }
}
