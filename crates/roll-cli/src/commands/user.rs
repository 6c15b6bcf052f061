use roll_core::enums::Role;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::UserCommands;
use crate::commands::shared::limit::list_limit;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `roll user`.
pub async fn handle(action: &UserCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        UserCommands::Create {
            username,
            email,
            role,
        } => {
            let role = parse_enum::<Role>(role, "role")?;
            let user = ctx.service.create_user(username, email, role).await?;
            output(&user, flags.format)
        }
        UserCommands::Get { user } => output(&ctx.resolve_user(user).await?, flags.format),
        UserCommands::List { role } => {
            let role = role
                .as_deref()
                .map(|value| parse_enum::<Role>(value, "role"))
                .transpose()?;
            let limit = list_limit(flags.limit, &ctx.config.general);
            output(&ctx.service.list_users(role, limit).await?, flags.format)
        }
    }
}
