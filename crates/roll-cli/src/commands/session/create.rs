use crate::cli::GlobalFlags;
use crate::commands::shared::parse::parse_instant;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    section: &str,
    start: &str,
    end: &str,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let actor = ctx.actor(flags).await?;
    let start = parse_instant(start, "start")?;
    let end = parse_instant(end, "end")?;
    let session = ctx.service.create_session(&actor, section, start, end).await?;
    output(&session, flags.format)
}
