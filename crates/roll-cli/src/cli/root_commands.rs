use clap::{Args, Subcommand};

use crate::cli::subcommands::{
    CourseCommands, ExportCommands, ReportCommands, SectionCommands, SessionCommands, UserCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Show the effective configuration.
    Config,
    /// Users.
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// Courses.
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },
    /// Sections.
    Section {
        #[command(subcommand)]
        action: SectionCommands,
    },
    /// Enroll a student in a section.
    Enroll(EnrollArgs),
    /// Class session lifecycle.
    Session {
        #[command(subcommand)]
        action: SessionCommands,
    },
    /// Redeem a session code as the acting student.
    Mark(MarkArgs),
    /// Attendance reports.
    Report {
        #[command(subcommand)]
        action: ReportCommands,
    },
    /// CSV exports.
    Export {
        #[command(subcommand)]
        action: ExportCommands,
    },
    /// Query the audit trail.
    Audit(AuditArgs),
}

#[derive(Clone, Debug, Args)]
pub struct EnrollArgs {
    /// Section ID.
    pub section: String,
    /// Student ID or username.
    pub student: String,
}

#[derive(Clone, Debug, Args)]
pub struct MarkArgs {
    /// Session ID.
    pub session: String,
    /// The 6-digit code shown by the instructor.
    pub code: String,
}

#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    #[arg(long)]
    pub entity_type: Option<String>,
    #[arg(long)]
    pub entity_id: Option<String>,
    #[arg(long)]
    pub action: Option<String>,
    /// Actor ID.
    #[arg(long)]
    pub actor_id: Option<String>,
}
