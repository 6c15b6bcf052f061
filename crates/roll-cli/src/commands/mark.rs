use anyhow::Context;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::MarkArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `roll mark`.
pub async fn handle(args: &MarkArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let actor = ctx.actor(flags).await?;
    let redemption = ctx
        .service
        .redeem(&actor, &args.session, &args.code)
        .await
        .with_context(|| format!("could not mark attendance for session {}", args.session))?;
    output(&redemption, flags.format)
}
