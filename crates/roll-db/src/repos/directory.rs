//! Collaborator directory: users, courses, sections, and enrollments.
//!
//! This is the administrative data-entry surface the lifecycle engine reads
//! through `get_section` and `is_enrolled`. It validates roles on the way in
//! so the guard can trust the relations it computes.

use roll_core::audit_detail::EnrolledDetail;
use roll_core::entities::{Course, Enrollment, Section, User};
use roll_core::enums::{AuditAction, EntityType, Role};
use roll_core::errors::CoreError;
use roll_core::ids::{PREFIX_COURSE, PREFIX_ENROLLMENT, PREFIX_SECTION, PREFIX_USER};

use crate::error::{DatabaseError, is_unique_violation};
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, to_sql_datetime};
use crate::repos::audit::append_audit_on;
use crate::service::RollService;
use crate::{finish, generate_id_on};

const USER_COLS: &str = "id, username, email, role, created_at";
const COURSE_COLS: &str = "id, code, title, created_at";
const SECTION_COLS: &str = "id, course_id, section_code, instructor_id, assistant_id, created_at";
const ENROLLMENT_COLS: &str = "id, section_id, student_id, created_at";

pub(crate) fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        role: parse_enum(&row.get::<String>(3)?)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

pub(crate) fn row_to_course(row: &libsql::Row) -> Result<Course, DatabaseError> {
    Ok(Course {
        id: row.get(0)?,
        code: row.get(1)?,
        title: row.get(2)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
    })
}

pub(crate) fn row_to_section(row: &libsql::Row) -> Result<Section, DatabaseError> {
    Ok(Section {
        id: row.get(0)?,
        course_id: row.get(1)?,
        section_code: row.get(2)?,
        instructor_id: row.get(3)?,
        assistant_id: get_opt_string(row, 4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

fn row_to_enrollment(row: &libsql::Row) -> Result<Enrollment, DatabaseError> {
    Ok(Enrollment {
        id: row.get(0)?,
        section_id: row.get(1)?,
        student_id: row.get(2)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
    })
}

fn required(value: &str, what: &str) -> Result<String, DatabaseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{what} is required.")).into());
    }
    Ok(trimmed.to_string())
}

/// Load a section on any connection. Shared with the lifecycle repos.
pub(crate) async fn load_section(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Section, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SECTION_COLS} FROM sections WHERE id = ?1"),
            [id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| CoreError::not_found(EntityType::Section, id))?;
    row_to_section(&row)
}

pub(crate) async fn load_user(conn: &libsql::Connection, id: &str) -> Result<User, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {USER_COLS} FROM users WHERE id = ?1"), [id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| CoreError::not_found(EntityType::User, id))?;
    row_to_user(&row)
}

pub(crate) async fn load_course(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Course, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {COURSE_COLS} FROM courses WHERE id = ?1"),
            [id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| CoreError::not_found(EntityType::Course, id))?;
    row_to_course(&row)
}

pub(crate) async fn enrollment_exists(
    conn: &libsql::Connection,
    section_id: &str,
    student_id: &str,
) -> Result<bool, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT 1 FROM enrollments WHERE section_id = ?1 AND student_id = ?2",
            [section_id, student_id],
        )
        .await?;
    Ok(rows.next().await?.is_some())
}

/// Enrolled students of a section, ordered by username.
pub(crate) async fn load_section_students(
    conn: &libsql::Connection,
    section_id: &str,
) -> Result<Vec<User>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT u.id, u.username, u.email, u.role, u.created_at
             FROM enrollments e JOIN users u ON u.id = e.student_id
             WHERE e.section_id = ?1
             ORDER BY u.username",
            [section_id],
        )
        .await?;
    let mut users = Vec::new();
    while let Some(row) = rows.next().await? {
        users.push(row_to_user(&row)?);
    }
    Ok(users)
}

impl RollService {
    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    /// Register a user.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for blank fields or a taken username/email.
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        role: Role,
    ) -> Result<User, DatabaseError> {
        let username = required(username, "Username")?;
        let email = required(email, "Email")?;
        let now = self.now();
        let user = User {
            id: self.db().generate_id(PREFIX_USER).await?,
            username,
            email,
            role,
            created_at: now,
        };

        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO users ({USER_COLS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
                libsql::params![
                    user.id.as_str(),
                    user.username.as_str(),
                    user.email.as_str(),
                    role.as_str(),
                    to_sql_datetime(now)
                ],
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    CoreError::Validation("Username or email already exists.".into()).into()
                } else {
                    DatabaseError::from(e)
                }
            })?;

        tracing::debug!(user = %user.id, role = %role, "user created");
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `CoreError::NotFound` if no such user exists.
    pub async fn get_user(&self, id: &str) -> Result<User, DatabaseError> {
        load_user(self.db().conn(), id).await
    }

    /// # Errors
    ///
    /// Returns `CoreError::NotFound` if no such user exists.
    pub async fn get_user_by_username(&self, username: &str) -> Result<User, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {USER_COLS} FROM users WHERE username = ?1"),
                [username.trim()],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| CoreError::not_found(EntityType::User, username))?;
        row_to_user(&row)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_users(&self, role: Option<Role>, limit: u32) -> Result<Vec<User>, DatabaseError> {
        let mut rows = match role {
            Some(role) => {
                self.db()
                    .conn()
                    .query(
                        &format!(
                            "SELECT {USER_COLS} FROM users WHERE role = ?1 ORDER BY username LIMIT {limit}"
                        ),
                        [role.as_str()],
                    )
                    .await?
            }
            None => {
                self.db()
                    .conn()
                    .query(
                        &format!("SELECT {USER_COLS} FROM users ORDER BY username LIMIT {limit}"),
                        (),
                    )
                    .await?
            }
        };
        let mut users = Vec::new();
        while let Some(row) = rows.next().await? {
            users.push(row_to_user(&row)?);
        }
        Ok(users)
    }

    // -----------------------------------------------------------------------
    // Courses
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns `CoreError::Validation` for blank fields or a duplicate code.
    pub async fn create_course(&self, code: &str, title: &str) -> Result<Course, DatabaseError> {
        let code = required(code, "Course code")?;
        let title = required(title, "Course title")?;
        let now = self.now();
        let course = Course {
            id: self.db().generate_id(PREFIX_COURSE).await?,
            code,
            title,
            created_at: now,
        };

        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO courses ({COURSE_COLS}) VALUES (?1, ?2, ?3, ?4)"),
                libsql::params![
                    course.id.as_str(),
                    course.code.as_str(),
                    course.title.as_str(),
                    to_sql_datetime(now)
                ],
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    CoreError::Validation(format!("Course code '{}' already exists.", course.code))
                        .into()
                } else {
                    DatabaseError::from(e)
                }
            })?;
        Ok(course)
    }

    /// # Errors
    ///
    /// Returns `CoreError::NotFound` if no such course exists.
    pub async fn get_course(&self, id: &str) -> Result<Course, DatabaseError> {
        load_course(self.db().conn(), id).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_courses(&self, limit: u32) -> Result<Vec<Course>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {COURSE_COLS} FROM courses ORDER BY code LIMIT {limit}"),
                (),
            )
            .await?;
        let mut courses = Vec::new();
        while let Some(row) = rows.next().await? {
            courses.push(row_to_course(&row)?);
        }
        Ok(courses)
    }

    // -----------------------------------------------------------------------
    // Sections
    // -----------------------------------------------------------------------

    /// Create a section owned by a lecturer, optionally with a TA.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` for a missing course or user,
    /// `CoreError::Validation` for a role mismatch or duplicate section code.
    pub async fn create_section(
        &self,
        course_id: &str,
        section_code: &str,
        instructor_id: &str,
        assistant_id: Option<&str>,
    ) -> Result<Section, DatabaseError> {
        let section_code = required(section_code, "Section code")?;
        let conn = self.db().conn();
        load_course(conn, course_id).await?;

        let instructor = load_user(conn, instructor_id).await?;
        if instructor.role != Role::Lecturer {
            return Err(CoreError::Validation(format!(
                "Instructor {} must have role lecturer, not {}.",
                instructor.username, instructor.role
            ))
            .into());
        }
        if let Some(assistant_id) = assistant_id {
            let assistant = load_user(conn, assistant_id).await?;
            if assistant.role != Role::Ta {
                return Err(CoreError::Validation(format!(
                    "Assistant {} must have role ta, not {}.",
                    assistant.username, assistant.role
                ))
                .into());
            }
        }

        let now = self.now();
        let section = Section {
            id: self.db().generate_id(PREFIX_SECTION).await?,
            course_id: course_id.to_string(),
            section_code,
            instructor_id: instructor_id.to_string(),
            assistant_id: assistant_id.map(String::from),
            created_at: now,
        };

        conn.execute(
            &format!("INSERT INTO sections ({SECTION_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            libsql::params![
                section.id.as_str(),
                section.course_id.as_str(),
                section.section_code.as_str(),
                section.instructor_id.as_str(),
                section.assistant_id.as_deref(),
                to_sql_datetime(now)
            ],
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CoreError::Validation(format!(
                    "Section '{}' already exists for this course.",
                    section.section_code
                ))
                .into()
            } else {
                DatabaseError::from(e)
            }
        })?;

        tracing::debug!(section = %section.id, course = %course_id, "section created");
        Ok(section)
    }

    /// Narrow read used by the guard: the section with its instructor and assistant.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` if no such section exists.
    pub async fn get_section(&self, id: &str) -> Result<Section, DatabaseError> {
        load_section(self.db().conn(), id).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_sections(
        &self,
        course_id: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Section>, DatabaseError> {
        let mut rows = match course_id {
            Some(course_id) => {
                self.db()
                    .conn()
                    .query(
                        &format!(
                            "SELECT {SECTION_COLS} FROM sections WHERE course_id = ?1
                             ORDER BY section_code LIMIT {limit}"
                        ),
                        [course_id],
                    )
                    .await?
            }
            None => {
                self.db()
                    .conn()
                    .query(
                        &format!(
                            "SELECT {SECTION_COLS} FROM sections
                             ORDER BY course_id, section_code LIMIT {limit}"
                        ),
                        (),
                    )
                    .await?
            }
        };
        let mut sections = Vec::new();
        while let Some(row) = rows.next().await? {
            sections.push(row_to_section(&row)?);
        }
        Ok(sections)
    }

    // -----------------------------------------------------------------------
    // Enrollments
    // -----------------------------------------------------------------------

    /// Enroll a student in a section.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` for a missing section or user,
    /// `CoreError::Validation` if the user is not a student or is already enrolled.
    pub async fn enroll(&self, section_id: &str, student_id: &str) -> Result<Enrollment, DatabaseError> {
        let conn = self.db().conn();
        load_section(conn, section_id).await?;
        let student = load_user(conn, student_id).await?;
        if student.role != Role::Student {
            return Err(CoreError::Validation(format!(
                "Only students can be enrolled; {} is {}.",
                student.username, student.role
            ))
            .into());
        }

        let now = self.now();
        let tx = self.db().begin_write().await?;
        let result = async {
            let enrollment = Enrollment {
                id: generate_id_on(&tx, PREFIX_ENROLLMENT).await?,
                section_id: section_id.to_string(),
                student_id: student_id.to_string(),
                created_at: now,
            };
            tx.execute(
                &format!("INSERT INTO enrollments ({ENROLLMENT_COLS}) VALUES (?1, ?2, ?3, ?4)"),
                libsql::params![
                    enrollment.id.as_str(),
                    section_id,
                    student_id,
                    to_sql_datetime(now)
                ],
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    CoreError::Validation(format!(
                        "{} is already enrolled in this section.",
                        student.username
                    ))
                    .into()
                } else {
                    DatabaseError::from(e)
                }
            })?;
            append_audit_on(
                &tx,
                None,
                EntityType::Enrollment,
                &enrollment.id,
                AuditAction::Enrolled,
                Some(&EnrolledDetail {
                    section_id: section_id.to_string(),
                    student_id: student_id.to_string(),
                }),
                now,
            )
            .await?;
            Ok(enrollment)
        }
        .await;
        finish(tx, result).await
    }

    /// Narrow read used by the guard.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn is_enrolled(&self, section_id: &str, student_id: &str) -> Result<bool, DatabaseError> {
        enrollment_exists(self.db().conn(), section_id, student_id).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_enrollments(&self, section_id: &str) -> Result<Vec<Enrollment>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {ENROLLMENT_COLS} FROM enrollments WHERE section_id = ?1 ORDER BY created_at"
                ),
                [section_id],
            )
            .await?;
        let mut enrollments = Vec::new();
        while let Some(row) = rows.next().await? {
            enrollments.push(row_to_enrollment(&row)?);
        }
        Ok(enrollments)
    }

    /// Enrolled students of a section, ordered by username.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_section_students(&self, section_id: &str) -> Result<Vec<User>, DatabaseError> {
        load_section_students(self.db().conn(), section_id).await
    }
}
