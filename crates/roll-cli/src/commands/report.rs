use crate::cli::GlobalFlags;
use crate::cli::subcommands::ReportCommands;
use crate::commands::shared::limit::feed_limit;
use crate::context::AppContext;
use crate::output::output;

/// Handle `roll report`.
pub async fn handle(action: &ReportCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let actor = ctx.actor(flags).await?;
    match action {
        ReportCommands::Roster { session } => {
            output(&ctx.service.session_roster(&actor, session).await?, flags.format)
        }
        ReportCommands::Section { id, recent } => {
            let recent = feed_limit(*recent, flags.limit, &ctx.config.general);
            output(&ctx.service.section_summary(&actor, id, recent).await?, flags.format)
        }
        ReportCommands::Student { student, recent } => {
            let student_id = match student {
                Some(reference) => ctx.resolve_user(reference).await?.id,
                None => actor.id.clone(),
            };
            let recent = feed_limit(*recent, flags.limit, &ctx.config.general);
            let summary = ctx.service.student_summary(&actor, &student_id, recent).await?;
            output(&summary, flags.format)
        }
    }
}
