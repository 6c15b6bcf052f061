use clap::Subcommand;

/// Section commands.
#[derive(Clone, Debug, Subcommand)]
pub enum SectionCommands {
    /// Create a section of a course.
    Create {
        #[arg(long)]
        course: String,
        #[arg(long)]
        code: String,
        /// Lecturer ID or username.
        #[arg(long)]
        instructor: String,
        /// Teaching assistant ID or username.
        #[arg(long)]
        assistant: Option<String>,
    },
    /// Get a section by ID.
    Get { id: String },
    /// List sections.
    List {
        #[arg(long)]
        course: Option<String>,
    },
    /// List enrolled students.
    Students { id: String },
}
