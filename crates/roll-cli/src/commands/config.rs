use roll_config::RollConfig;

use crate::cli::{GlobalFlags, OutputFormat};
use crate::output::output;

/// Handle `roll config`: print the merged configuration.
pub fn handle(config: &RollConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    if flags.format == OutputFormat::Json {
        return output(config, flags.format);
    }
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
