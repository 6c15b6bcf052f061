use crate::cli::{GlobalFlags, OutputFormat};
use crate::context::AppContext;
use crate::output::output;

/// Open a session. The code is printed exactly once, here.
pub async fn run(id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let actor = ctx.actor(flags).await?;
    let opened = ctx.service.open_session(&actor, id).await?;
    output(&opened, flags.format)?;
    if flags.format == OutputFormat::Table && !flags.quiet {
        eprintln!(
            "Share code {} until {}. It cannot be shown again.",
            opened.code.as_str(),
            opened.deadline.format("%H:%M:%S UTC")
        );
    }
    Ok(())
}
