use clap::Subcommand;

/// CSV export commands. Output goes to stdout unless `--out` is given.
#[derive(Clone, Debug, Subcommand)]
pub enum ExportCommands {
    /// One session's roster.
    Session {
        id: String,
        #[arg(long)]
        out: Option<String>,
    },
    /// Every session of a section.
    Section {
        id: String,
        #[arg(long)]
        out: Option<String>,
    },
    /// Every session across a student's sections.
    Student {
        student: Option<String>,
        #[arg(long)]
        out: Option<String>,
    },
}
