mod create;
mod feed;
mod list;
mod open;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::SessionCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `roll session`.
pub async fn handle(action: &SessionCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        SessionCommands::Create {
            section,
            start,
            end,
        } => create::run(section, start, end, ctx, flags).await,
        SessionCommands::Open { id } => open::run(id, ctx, flags).await,
        SessionCommands::Close { id } => {
            let actor = ctx.actor(flags).await?;
            output(&ctx.service.close_session(&actor, id).await?, flags.format)
        }
        SessionCommands::Get { id } => {
            let actor = ctx.actor(flags).await?;
            output(&ctx.service.get_session(&actor, id).await?, flags.format)
        }
        SessionCommands::List { section } => list::run(section, ctx, flags).await,
        SessionCommands::Feed => feed::run(ctx, flags).await,
        SessionCommands::Sweep { section } => {
            let closed = ctx.service.sweep_expired(section.as_deref()).await?;
            output(&closed, flags.format)
        }
    }
}
