use std::path::Path;

use anyhow::Context;
use roll_config::RollConfig;

use crate::cli::GlobalFlags;

/// Load `.env`, the layered configuration, and apply `--db`.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<RollConfig> {
    let mut config = RollConfig::load_with_dotenv().context("failed to load configuration")?;
    if let Some(db) = &flags.db {
        config.database.path.clone_from(db);
        config.validate()?;
    }
    Ok(config)
}

/// Create the database's parent directory on first use.
pub fn ensure_database_dir(config: &RollConfig) -> anyhow::Result<()> {
    if config.database.is_in_memory() {
        return Ok(());
    }
    let Some(parent) = Path::new(&config.database.path).parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() || parent.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(parent)
        .with_context(|| format!("failed to create database directory '{}'", parent.display()))
}
