use clap::Subcommand;

/// Course catalogue commands.
#[derive(Clone, Debug, Subcommand)]
pub enum CourseCommands {
    /// Create a course.
    Create { code: String, title: String },
    /// Get a course by ID.
    Get { id: String },
    /// List courses.
    List,
}
