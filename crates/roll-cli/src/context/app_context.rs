use anyhow::Context;
use roll_config::RollConfig;
use roll_core::entities::User;
use roll_core::guard::Actor;
use roll_core::ids::PREFIX_USER;
use roll_db::service::RollService;

use crate::cli::GlobalFlags;

/// Environment fallback for `--as`.
const ACTOR_ENV: &str = "ROLLCALL_AS";

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: RollService,
    pub config: RollConfig,
}

impl AppContext {
    /// Open the configured database.
    pub async fn init(config: RollConfig) -> anyhow::Result<Self> {
        let service = RollService::from_config(&config)
            .await
            .with_context(|| format!("failed to open database '{}'", config.database.path))?;
        Ok(Self { service, config })
    }

    /// Look a user up by `usr-` ID or username.
    pub async fn resolve_user(&self, reference: &str) -> anyhow::Result<User> {
        let user = if reference.starts_with(&format!("{PREFIX_USER}-")) {
            self.service.get_user(reference).await?
        } else {
            self.service.get_user_by_username(reference).await?
        };
        Ok(user)
    }

    /// The acting user from `--as` or `ROLLCALL_AS`.
    pub async fn actor(&self, flags: &GlobalFlags) -> anyhow::Result<Actor> {
        let reference = flags
            .actor
            .clone()
            .or_else(|| std::env::var(ACTOR_ENV).ok())
            .filter(|value| !value.trim().is_empty())
            .context("no acting user: pass --as <user> or set ROLLCALL_AS")?;
        let user = self
            .resolve_user(reference.trim())
            .await
            .with_context(|| format!("unknown acting user '{reference}'"))?;
        Ok(Actor::from(&user))
    }
}
