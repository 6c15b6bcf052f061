use crate::cli::GlobalFlags;
use crate::cli::subcommands::CourseCommands;
use crate::commands::shared::limit::list_limit;
use crate::context::AppContext;
use crate::output::output;

/// Handle `roll course`.
pub async fn handle(action: &CourseCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        CourseCommands::Create { code, title } => {
            output(&ctx.service.create_course(code, title).await?, flags.format)
        }
        CourseCommands::Get { id } => output(&ctx.service.get_course(id).await?, flags.format),
        CourseCommands::List => {
            let limit = list_limit(flags.limit, &ctx.config.general);
            output(&ctx.service.list_courses(limit).await?, flags.format)
        }
    }
}
