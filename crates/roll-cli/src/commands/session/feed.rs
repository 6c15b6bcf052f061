use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let actor = ctx.actor(flags).await?;
    let open = ctx.service.student_open_sessions(&actor).await?;
    output(&open, flags.format)
}
