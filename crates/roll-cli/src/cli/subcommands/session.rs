use clap::Subcommand;

/// Class session lifecycle commands.
#[derive(Clone, Debug, Subcommand)]
pub enum SessionCommands {
    /// Schedule a session.
    Create {
        #[arg(long)]
        section: String,
        /// RFC 3339 or `YYYY-MM-DDTHH:MM` (UTC).
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    /// Open a scheduled session and print its code.
    Open { id: String },
    /// Close an open session.
    Close { id: String },
    /// Get a session by ID.
    Get { id: String },
    /// List a section's sessions, newest first.
    List {
        #[arg(long)]
        section: String,
    },
    /// Open sessions the acting student can mark.
    Feed,
    /// Close open sessions past their deadline.
    Sweep {
        #[arg(long)]
        section: Option<String>,
    },
}
