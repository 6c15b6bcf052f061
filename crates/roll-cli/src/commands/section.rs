use crate::cli::GlobalFlags;
use crate::cli::subcommands::SectionCommands;
use crate::commands::shared::limit::list_limit;
use crate::context::AppContext;
use crate::output::output;

/// Handle `roll section`.
pub async fn handle(action: &SectionCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        SectionCommands::Create {
            course,
            code,
            instructor,
            assistant,
        } => {
            let instructor = ctx.resolve_user(instructor).await?;
            let assistant = match assistant {
                Some(reference) => Some(ctx.resolve_user(reference).await?),
                None => None,
            };
            let section = ctx
                .service
                .create_section(
                    course,
                    code,
                    &instructor.id,
                    assistant.as_ref().map(|user| user.id.as_str()),
                )
                .await?;
            output(&section, flags.format)
        }
        SectionCommands::Get { id } => output(&ctx.service.get_section(id).await?, flags.format),
        SectionCommands::List { course } => {
            let limit = list_limit(flags.limit, &ctx.config.general);
            let sections = ctx.service.list_sections(course.as_deref(), limit).await?;
            output(&sections, flags.format)
        }
        SectionCommands::Students { id } => {
            output(&ctx.service.list_section_students(id).await?, flags.format)
        }
    }
}
