use crate::cli::GlobalFlags;
use crate::commands::shared::limit::list_limit;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(section: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let actor = ctx.actor(flags).await?;
    let limit = list_limit(flags.limit, &ctx.config.general);
    let sessions = ctx.service.list_sessions(&actor, section, limit).await?;
    output(&sessions, flags.format)
}
