use clap::Subcommand;

/// Attendance report commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ReportCommands {
    /// Present/absent roster for one session.
    Roster { session: String },
    /// Per-session totals and recent activity for a section.
    Section {
        id: String,
        /// Cap on the recent activity feed.
        #[arg(long)]
        recent: Option<u32>,
    },
    /// Attendance for one student (defaults to the acting user).
    Student {
        student: Option<String>,
        #[arg(long)]
        recent: Option<u32>,
    },
}
