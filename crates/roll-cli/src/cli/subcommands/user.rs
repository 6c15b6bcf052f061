use clap::Subcommand;

/// User directory commands.
#[derive(Clone, Debug, Subcommand)]
pub enum UserCommands {
    /// Register a user.
    Create {
        username: String,
        email: String,
        /// admin, lecturer, ta, student
        #[arg(long)]
        role: String,
    },
    /// Get a user by ID or username.
    Get { user: String },
    /// List users.
    List {
        #[arg(long)]
        role: Option<String>,
    },
}
