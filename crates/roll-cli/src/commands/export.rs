use crate::cli::GlobalFlags;
use crate::cli::subcommands::ExportCommands;
use crate::context::AppContext;
use crate::output::output_document;

/// Handle `roll export`. Always CSV, regardless of `--format`.
pub async fn handle(action: &ExportCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let actor = ctx.actor(flags).await?;
    let (document, out) = match action {
        ExportCommands::Session { id, out } => (ctx.service.export_session_csv(&actor, id).await?, out),
        ExportCommands::Section { id, out } => (ctx.service.export_section_csv(&actor, id).await?, out),
        ExportCommands::Student { student, out } => {
            let student_id = match student {
                Some(reference) => ctx.resolve_user(reference).await?.id,
                None => actor.id.clone(),
            };
            (ctx.service.export_student_csv(&actor, &student_id).await?, out)
        }
    };
    output_document(&document, out.as_deref())
}
