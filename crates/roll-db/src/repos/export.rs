//! CSV exports built on the report loaders.

use roll_core::export;
use roll_core::guard::Actor;

use crate::error::DatabaseError;
use crate::service::RollService;

impl RollService {
    /// CSV roster for one session.
    ///
    /// # Errors
    ///
    /// Same access rules as [`Self::session_roster`].
    pub async fn export_session_csv(&self, actor: &Actor, session_id: &str) -> Result<String, DatabaseError> {
        let roster = self.session_roster(actor, session_id).await?;
        Ok(export::session_csv(&roster)?)
    }

    /// CSV of every `(session, student)` pair in a section.
    ///
    /// # Errors
    ///
    /// Same access rules as [`Self::section_rosters`].
    pub async fn export_section_csv(&self, actor: &Actor, section_id: &str) -> Result<String, DatabaseError> {
        let rosters = self.section_rosters(actor, section_id).await?;
        Ok(export::section_csv(&rosters)?)
    }

    /// CSV of every session across a student's enrolled sections.
    ///
    /// # Errors
    ///
    /// Same access rules as [`Self::student_summary`].
    pub async fn export_student_csv(&self, actor: &Actor, student_id: &str) -> Result<String, DatabaseError> {
        let lines = self.student_sessions(actor, student_id).await?;
        Ok(export::student_csv(&lines)?)
    }
}
