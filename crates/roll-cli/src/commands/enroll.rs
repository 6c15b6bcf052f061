use crate::cli::GlobalFlags;
use crate::cli::root_commands::EnrollArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `roll enroll`.
pub async fn handle(args: &EnrollArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let student = ctx.resolve_user(&args.student).await?;
    let enrollment = ctx.service.enroll(&args.section, &student.id).await?;
    output(&enrollment, flags.format)
}
